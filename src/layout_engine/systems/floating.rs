use super::{LayoutClass, Tile, WindowsLayout};
use crate::geometry::Rect;

/// Leaves every window where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatingLayout;

impl WindowsLayout for FloatingLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Floating }

    fn description(&self) -> String { "Floating".to_string() }

    fn apply(&mut self, _area: Rect, _tiles: &mut [Tile]) {}

    fn draw_tree(&self) -> String { "floating\n".to_string() }
}
