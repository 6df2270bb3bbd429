use super::{LayoutClass, Tile, WindowsLayout, assign};
use crate::common::config::LayoutSettings;
use crate::geometry::Rect;
use crate::layout_engine::action::{Action, ActionResponse};
use crate::layout_engine::parts::{LayoutPart, Stair, draw};

#[derive(Debug, Clone)]
pub struct StairLayout {
    stair: Stair,
}

impl StairLayout {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self { stair: Stair::new(settings.stair_step) }
    }
}

impl WindowsLayout for StairLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Stair }

    fn description(&self) -> String { format!("Stair [{}]", self.stair.step) }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let geometries = self.stair.apply(area, tiles);
        assign(tiles, geometries);
    }

    fn execute_action(&mut self, action: &Action) -> ActionResponse {
        match action {
            Action::IncreaseMasterCount => {
                self.stair.change_step(1);
            }
            Action::DecreaseMasterCount => {
                self.stair.change_step(-1);
            }
            _ => return ActionResponse::Unhandled,
        }
        ActionResponse::Handled
    }

    fn draw_tree(&self) -> String { draw(&self.stair) }
}
