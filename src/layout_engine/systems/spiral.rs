use super::{LayoutClass, Tile, WindowsLayout, assign};
use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, RectDelta};
use crate::layout_engine::parts::{LayoutPart, SpiralPart, Stack, draw};

#[derive(Debug, Clone)]
pub struct SpiralLayout {
    gap: i32,
    parts: SpiralPart,
}

impl SpiralLayout {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            gap: settings.gaps.tile,
            parts: SpiralPart::Fill(Stack),
        }
    }
}

impl WindowsLayout for SpiralLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Spiral }

    fn description(&self) -> String { "Spiral".to_string() }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        self.parts.bore(tiles.len(), self.gap);
        let geometries = self.parts.apply(area, tiles);
        assign(tiles, geometries);
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: usize, delta: RectDelta) {
        self.parts.bore(tiles.len(), self.gap);
        self.parts.adjust(area, tiles, basis, delta);
    }

    fn draw_tree(&self) -> String { draw(&self.parts) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_engine::systems::Layout;
    use crate::layout_engine::systems::tests::{run, tiles};

    #[test]
    fn grows_with_window_count_and_keeps_ratios() {
        let mut layout = Layout::new(LayoutClass::Spiral, &LayoutSettings::default());
        let area = Rect::new(0, 0, 800, 800);
        let mut ts = tiles(2);
        layout.apply(area, &mut ts);
        layout.adjust(area, &mut ts, 0, RectDelta::new(0.0, 80.0, 0.0, 0.0));

        let out = run(&mut layout, area, 3);
        assert_eq!(out[0], Rect::new(0, 0, 480, 800));
        assert_eq!(out[1], Rect::new(480, 0, 320, 400));
        assert_eq!(out[2], Rect::new(480, 400, 320, 400));
    }
}
