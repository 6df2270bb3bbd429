use super::{LayoutClass, Tile, WindowsLayout, assign};
use crate::common::config::LayoutSettings;
use crate::geometry::Rect;
use crate::layout_engine::action::{Action, ActionResponse};
use crate::layout_engine::graph::Direction;
use crate::layout_engine::parts::{LayoutPart, Stack, draw};

/// Every tile covers the whole area; only the focused one is visible.
#[derive(Debug, Clone)]
pub struct MonocleLayout {
    stack: Stack,
    /// Tiles ignore gaps and cover the full working area.
    pub maximize: bool,
}

impl MonocleLayout {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            stack: Stack,
            maximize: settings.monocle_maximize,
        }
    }
}

impl WindowsLayout for MonocleLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Monocle }

    fn description(&self) -> String { "Monocle".to_string() }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let geometries = self.stack.apply(area, tiles);
        assign(tiles, geometries);
    }

    fn execute_action(&mut self, action: &Action) -> ActionResponse {
        // Directional focus has no meaning in a stack; walk the order instead.
        match action {
            Action::Focus(Direction::Up | Direction::Left) => {
                ActionResponse::Redirect(Action::FocusPrevious)
            }
            Action::Focus(Direction::Down | Direction::Right) => {
                ActionResponse::Redirect(Action::FocusNext)
            }
            _ => ActionResponse::Unhandled,
        }
    }

    fn draw_tree(&self) -> String { draw(&self.stack) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_engine::systems::Layout;
    use crate::layout_engine::systems::tests::run;

    #[test]
    fn every_tile_fills_the_area() {
        let mut layout = Layout::new(LayoutClass::Monocle, &LayoutSettings::default());
        let area = Rect::new(10, 10, 500, 400);
        assert_eq!(run(&mut layout, area, 3), vec![area; 3]);
    }

    #[test]
    fn directional_focus_walks_the_order() {
        let mut layout = Layout::new(LayoutClass::Monocle, &LayoutSettings::default());
        assert_eq!(
            layout.execute_action(&Action::Focus(Direction::Left)),
            ActionResponse::Redirect(Action::FocusPrevious)
        );
        assert_eq!(
            layout.execute_action(&Action::Focus(Direction::Down)),
            ActionResponse::Redirect(Action::FocusNext)
        );
        assert_eq!(layout.execute_action(&Action::IncreaseMasterCount), ActionResponse::Unhandled);
    }
}
