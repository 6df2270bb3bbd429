use super::{LayoutClass, Tile, WindowsLayout, assign};
use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, RectDelta};
use crate::layout_engine::utils::clip;

const MAX_PROPORTION: f64 = 0.8;

/// Up to four quadrants:
///
/// ```text
/// +---+---+
/// | 0 | 1 |
/// +---+---+
/// | 3 | 2 |
/// +---+---+
/// ```
///
/// Windows beyond the fourth share quadrant 3.
#[derive(Debug, Clone)]
pub struct QuarterLayout {
    gap: i32,
    /// Horizontal split of the left half.
    lhsplit: f64,
    /// Horizontal split of the right half.
    rhsplit: f64,
    /// Split between the halves.
    vsplit: f64,
}

impl QuarterLayout {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            gap: settings.gaps.tile,
            lhsplit: 0.5,
            rhsplit: 0.5,
            vsplit: 0.5,
        }
    }

    fn clamp_splits(&mut self) {
        let min = 1.0 - MAX_PROPORTION;
        self.lhsplit = clip(self.lhsplit, min, MAX_PROPORTION);
        self.rhsplit = clip(self.rhsplit, min, MAX_PROPORTION);
        self.vsplit = clip(self.vsplit, min, MAX_PROPORTION);
    }
}

fn moved(split: f64, length: i32, delta: f64) -> f64 {
    if length <= 0 {
        return split;
    }
    ((f64::from(length) * split).floor() + delta) / f64::from(length)
}

impl WindowsLayout for QuarterLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Quarter }

    fn description(&self) -> String { "Quarter".to_string() }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let n = tiles.len();
        if n == 0 {
            return;
        }
        if n == 1 {
            assign(tiles, vec![area]);
            return;
        }

        let half_gap = self.gap / 2;
        let left_width = (f64::from(area.width) * self.vsplit).floor() as i32;
        let right_width = area.width - left_width;
        let right_x = area.x + left_width;
        if n == 2 {
            assign(tiles, vec![
                Rect::new(area.x, area.y, left_width, area.height).gap(0, half_gap, 0, 0),
                Rect::new(right_x, area.y, right_width, area.height).gap(half_gap, 0, 0, 0),
            ]);
            return;
        }

        let right_top = (f64::from(area.height) * self.rhsplit).floor() as i32;
        let right_bottom = area.height - right_top;
        let right_bottom_y = area.y + right_top;
        let top_right = Rect::new(right_x, area.y, right_width, right_top)
            .gap(half_gap, 0, 0, half_gap);
        let bottom_right = Rect::new(right_x, right_bottom_y, right_width, right_bottom)
            .gap(half_gap, 0, half_gap, 0);
        if n == 3 {
            assign(tiles, vec![
                Rect::new(area.x, area.y, left_width, area.height).gap(0, half_gap, 0, 0),
                top_right,
                bottom_right,
            ]);
            return;
        }

        let left_top = (f64::from(area.height) * self.lhsplit).floor() as i32;
        let left_bottom = area.height - left_top;
        let left_bottom_y = area.y + left_top;
        let top_left = Rect::new(area.x, area.y, left_width, left_top).gap(0, half_gap, 0, half_gap);
        let bottom_left = Rect::new(area.x, left_bottom_y, left_width, left_bottom)
            .gap(0, half_gap, half_gap, 0);

        let mut geometries = vec![top_left, top_right, bottom_right];
        geometries.resize(n, bottom_left);
        assign(tiles, geometries);
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: usize, delta: RectDelta) {
        let n = tiles.len();
        if n <= 1 || basis > 3 {
            return;
        }

        if matches!(basis, 0 | 3) && delta.right != 0.0 {
            self.vsplit = moved(self.vsplit, area.width, delta.right);
        } else if matches!(basis, 1 | 2) && delta.left != 0.0 {
            self.vsplit = moved(self.vsplit, area.width, -delta.left);
        }

        if n >= 4 {
            if basis == 0 && delta.bottom != 0.0 {
                self.lhsplit = moved(self.lhsplit, area.height, delta.bottom);
            }
            if basis == 3 && delta.top != 0.0 {
                self.lhsplit = moved(self.lhsplit, area.height, -delta.top);
            }
        }

        if n >= 3 {
            if basis == 1 && delta.bottom != 0.0 {
                self.rhsplit = moved(self.rhsplit, area.height, delta.bottom);
            }
            if basis == 2 && delta.top != 0.0 {
                self.rhsplit = moved(self.rhsplit, area.height, -delta.top);
            }
        }

        self.clamp_splits();
    }

    fn draw_tree(&self) -> String {
        let mut out = String::new();
        let tree = ascii_tree::Tree::Node(
            format!(
                "quarter v={:.2} left={:.2} right={:.2}",
                self.vsplit, self.lhsplit, self.rhsplit
            ),
            (0..4).map(|i| ascii_tree::Tree::Leaf(vec![format!("quadrant {i}")])).collect(),
        );
        let _ = ascii_tree::write_tree(&mut out, &tree);
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::Layout;
    use crate::layout_engine::systems::tests::{run, tiles};

    fn quarter() -> Layout { Layout::new(LayoutClass::Quarter, &LayoutSettings::default()) }

    #[test]
    fn four_windows_take_four_quadrants() {
        let mut layout = quarter();
        assert_eq!(run(&mut layout, Rect::new(0, 0, 800, 600), 4), vec![
            Rect::new(0, 0, 400, 300),
            Rect::new(400, 0, 400, 300),
            Rect::new(400, 300, 400, 300),
            Rect::new(0, 300, 400, 300),
        ]);
    }

    #[test]
    fn extra_windows_share_last_quadrant() {
        let mut layout = quarter();
        let out = run(&mut layout, Rect::new(0, 0, 800, 600), 6);
        assert_eq!(out[3], Rect::new(0, 300, 400, 300));
        assert_eq!(out[4], out[3]);
        assert_eq!(out[5], out[3]);
    }

    #[test]
    fn splits_are_bounded() {
        let mut layout = quarter();
        let area = Rect::new(0, 0, 800, 600);
        let mut ts = tiles(4);
        layout.adjust(area, &mut ts, 0, RectDelta::new(0.0, 2000.0, 0.0, 2000.0));
        assert_eq!(run(&mut layout, area, 4)[0], Rect::new(0, 0, 640, 480));

        layout.adjust(area, &mut ts, 2, RectDelta::new(0.0, 0.0, 60.0, 0.0));
        assert_eq!(run(&mut layout, area, 4)[2], Rect::new(640, 240, 160, 360));
    }
}
