use super::{LayoutClass, LayoutState, MasterBounds, Tile, WindowsLayout, assign};
use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, RectDelta};
use crate::layout_engine::action::{Action, ActionResponse};
use crate::layout_engine::parts::{LayoutPart, Rotate, Split, Stack, Stair, draw};
use crate::layout_engine::utils::clip;

/// Masters laid out as a stair; the rest share one stacked area, like tabs.
#[derive(Debug, Clone)]
pub struct TabbedMasterLayout {
    parts: Split<Stair, Rotate<Stack>>,
    bounds: MasterBounds,
}

impl TabbedMasterLayout {
    pub fn new(settings: &LayoutSettings) -> Self {
        let bounds = MasterBounds::from_settings(settings);
        let mut parts = Split::new(Stair::new(settings.stair_step), Rotate::new(Stack))
            .with_gap(settings.gaps.tile);
        parts.ratio = bounds.clip_ratio(0.5);
        Self { parts, bounds }
    }
}

impl WindowsLayout for TabbedMasterLayout {
    fn class(&self) -> LayoutClass { LayoutClass::TabbedMaster }

    fn description(&self) -> String { format!("Tabbed Master [{}]", self.parts.primary_size) }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let geometries = self.parts.apply(area, tiles);
        assign(tiles, geometries);
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: usize, delta: RectDelta) {
        self.parts.adjust(area, tiles, basis, delta);
        self.parts.ratio = self.bounds.clip_ratio(self.parts.ratio);
    }

    fn execute_action(&mut self, action: &Action) -> ActionResponse {
        match action {
            Action::IncreaseMasterSize => {
                self.parts.ratio = self.bounds.slide_ratio(self.parts.ratio, true)
            }
            Action::DecreaseMasterSize => {
                self.parts.ratio = self.bounds.slide_ratio(self.parts.ratio, false)
            }
            Action::IncreaseMasterCount => {
                self.parts.primary_size = (self.parts.primary_size + 1).min(self.bounds.max_count)
            }
            Action::DecreaseMasterCount => {
                self.parts.primary_size = self.parts.primary_size.saturating_sub(1)
            }
            Action::Rotate => self.parts.angle = self.parts.angle.rotated(90),
            Action::RotatePart => self.parts.secondary.rotate(90),
            _ => return ActionResponse::Unhandled,
        }
        ActionResponse::Handled
    }

    fn state(&self) -> LayoutState {
        LayoutState {
            rotation: self.parts.angle,
            part_rotation: self.parts.secondary.angle,
            num_master_tiles: self.parts.primary_size,
            master_ratio: self.parts.ratio,
            ..LayoutState::new(LayoutClass::TabbedMaster)
        }
    }

    fn restore(&mut self, state: &LayoutState) {
        self.parts.angle = state.rotation;
        self.parts.secondary.angle = state.part_rotation;
        self.parts.primary_size = clip(state.num_master_tiles, 0, self.bounds.max_count);
        self.parts.ratio = self.bounds.clip_ratio(state.master_ratio);
    }

    fn draw_tree(&self) -> String { draw(&self.parts) }
}
