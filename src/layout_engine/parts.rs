//! Composable geometry units that concrete layouts are assembled from.
//!
//! Every part maps an area and an ordered run of tiles to one rectangle per
//! tile. Combinators own their children, so a layout is a plain value tree
//! whose shape is fixed by its type; only ratios, counts and angles change.

use std::fmt;

use super::graph::Angle;
use super::systems::Tile;
use super::utils::{
    adjust_area_half_weights, adjust_area_weights, fit_step, split_area_half_weighted,
    split_area_weighted,
};
use crate::geometry::{Rect, RectDelta};

pub trait LayoutPart: fmt::Debug + Clone {
    fn apply(&self, area: Rect, tiles: &[Tile]) -> Vec<Rect>;

    /// Feeds a user resize of `tiles[basis]` into the part's parameters and
    /// returns the portion of `delta` this part could not absorb.
    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: usize, delta: RectDelta)
    -> RectDelta;

    fn describe(&self) -> ascii_tree::Tree;
}

/// Every tile covers the whole area.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stack;

impl LayoutPart for Stack {
    fn apply(&self, area: Rect, tiles: &[Tile]) -> Vec<Rect> { vec![area; tiles.len()] }

    fn adjust(&mut self, _: Rect, _: &mut [Tile], _: usize, delta: RectDelta) -> RectDelta { delta }

    fn describe(&self) -> ascii_tree::Tree { ascii_tree::Tree::Leaf(vec!["stack".into()]) }
}

/// Tiles share the area top to bottom in proportion to their weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct Column {
    pub gap: i32,
}

impl Column {
    pub fn new(gap: i32) -> Self { Self { gap } }
}

impl LayoutPart for Column {
    fn apply(&self, area: Rect, tiles: &[Tile]) -> Vec<Rect> {
        let weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
        split_area_weighted(area, &weights, self.gap, false)
    }

    fn adjust(
        &mut self,
        area: Rect,
        tiles: &mut [Tile],
        basis: usize,
        delta: RectDelta,
    ) -> RectDelta {
        let weights: Vec<f64> = tiles.iter().map(|t| t.weight).collect();
        let count = tiles.len() as f64;
        let adjusted = adjust_area_weights(area, &weights, self.gap, basis, delta, false);
        for (tile, weight) in tiles.iter_mut().zip(adjusted) {
            tile.weight = weight * count;
        }
        RectDelta::new(
            delta.left,
            delta.right,
            if basis == 0 { delta.top } else { 0.0 },
            if basis + 1 == tiles.len() { delta.bottom } else { 0.0 },
        )
    }

    fn describe(&self) -> ascii_tree::Tree {
        ascii_tree::Tree::Leaf(vec![format!("column gap={}", self.gap)])
    }
}

/// Diagonal cascade: tile `i` of `n` is inset by `step * (n - 1 - i)` from
/// the left and `step * i` from the top.
#[derive(Debug, Clone, Copy)]
pub struct Stair {
    pub step: i32,
}

impl Stair {
    pub const MIN_STEP: i32 = 16;
    pub const MAX_STEP: i32 = 160;
    pub const STEP_INCREMENT: i32 = 8;

    pub fn new(step: i32) -> Self {
        Self {
            step: step.clamp(Self::MIN_STEP, Self::MAX_STEP),
        }
    }

    /// Returns true when the step actually changed.
    pub fn change_step(&mut self, increments: i32) -> bool {
        let step = (self.step + increments * Self::STEP_INCREMENT)
            .clamp(Self::MIN_STEP, Self::MAX_STEP);
        let changed = step != self.step;
        self.step = step;
        changed
    }
}

impl Default for Stair {
    fn default() -> Self { Self::new(24) }
}

impl LayoutPart for Stair {
    fn apply(&self, area: Rect, tiles: &[Tile]) -> Vec<Rect> {
        let n = tiles.len() as i32;
        let step_x = fit_step(self.step, area.width, n);
        let step_y = fit_step(self.step, area.height, n);
        (0..n)
            .map(|i| {
                let dx = step_x * (n - 1 - i);
                let dy = step_y * i;
                Rect::new(area.x + dx, area.y + dy, area.width - dx, area.height - dy)
            })
            .collect()
    }

    fn adjust(&mut self, _: Rect, _: &mut [Tile], _: usize, delta: RectDelta) -> RectDelta { delta }

    fn describe(&self) -> ascii_tree::Tree {
        ascii_tree::Tree::Leaf(vec![format!("stair step={}", self.step)])
    }
}

/// Presents the inner part with a transposed or mirrored frame and maps its
/// output back. 90 transposes, 180 mirrors horizontally, 270 does both.
#[derive(Debug, Clone)]
pub struct Rotate<P> {
    pub angle: Angle,
    pub inner: P,
}

impl<P: LayoutPart> Rotate<P> {
    pub fn new(inner: P) -> Self { Self { angle: Angle::zero(), inner } }

    pub fn rotate(&mut self, amount: i32) { self.angle = self.angle.rotated(amount); }

    fn inner_area(&self, area: Rect) -> Rect {
        match self.angle.degrees() {
            90 | 270 => Rect::new(area.x, area.y, area.height, area.width),
            _ => area,
        }
    }
}

impl<P: LayoutPart> LayoutPart for Rotate<P> {
    fn apply(&self, area: Rect, tiles: &[Tile]) -> Vec<Rect> {
        let inner = self.inner.apply(self.inner_area(area), tiles);
        match self.angle.degrees() {
            90 => inner
                .into_iter()
                .map(|g| Rect::new(area.x + g.y - area.y, area.y + g.x - area.x, g.height, g.width))
                .collect(),
            180 => inner
                .into_iter()
                .map(|g| {
                    let rx = g.x - area.x;
                    Rect::new(area.x + area.width - (rx + g.width), g.y, g.width, g.height)
                })
                .collect(),
            270 => inner
                .into_iter()
                .map(|g| {
                    let rx = g.x - area.x;
                    Rect::new(
                        area.x + g.y - area.y,
                        area.y + area.height - (rx + g.width),
                        g.height,
                        g.width,
                    )
                })
                .collect(),
            _ => inner,
        }
    }

    fn adjust(
        &mut self,
        area: Rect,
        tiles: &mut [Tile],
        basis: usize,
        delta: RectDelta,
    ) -> RectDelta {
        let angle = self.angle.degrees();
        let inner_area = self.inner_area(area);
        let inner_delta = delta.into_rotated_frame(angle);
        self.inner
            .adjust(inner_area, tiles, basis, inner_delta)
            .out_of_rotated_frame(angle)
    }

    fn describe(&self) -> ascii_tree::Tree {
        ascii_tree::Tree::Node(format!("rotate {}°", self.angle.degrees()), vec![
            self.inner.describe(),
        ])
    }
}

/// Two-way split. The first `primary_size` tiles go to `primary`, the rest
/// to `secondary`. When every tile fits the primary part, or the primary part
/// takes no tiles at all, the area is not split.
#[derive(Debug, Clone)]
pub struct Split<P, S> {
    pub angle: Angle,
    pub gap: i32,
    pub primary_size: usize,
    pub ratio: f64,
    pub primary: P,
    pub secondary: S,
}

impl<P: LayoutPart, S: LayoutPart> Split<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            angle: Angle::zero(),
            gap: 0,
            primary_size: 1,
            ratio: 0.5,
            primary,
            secondary,
        }
    }

    pub fn with_gap(mut self, gap: i32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_angle(mut self, angle: Angle) -> Self {
        self.angle = angle;
        self
    }

    /// Ratio of the part that is drawn first along the split axis.
    fn leading_ratio(&self) -> f64 {
        if self.angle.is_reversed() { 1.0 - self.ratio } else { self.ratio }
    }
}

impl<P: LayoutPart, S: LayoutPart> LayoutPart for Split<P, S> {
    fn apply(&self, area: Rect, tiles: &[Tile]) -> Vec<Rect> {
        if tiles.len() <= self.primary_size {
            return self.primary.apply(area, tiles);
        }
        if self.primary_size == 0 {
            return self.secondary.apply(area, tiles);
        }
        let (leading, trailing) = split_area_half_weighted(
            area,
            self.leading_ratio(),
            self.gap,
            self.angle.is_horizontal(),
        );
        let (primary_area, secondary_area) =
            if self.angle.is_reversed() { (trailing, leading) } else { (leading, trailing) };
        let (head, tail) = tiles.split_at(self.primary_size);
        let mut out = self.primary.apply(primary_area, head);
        out.extend(self.secondary.apply(secondary_area, tail));
        out
    }

    fn adjust(
        &mut self,
        area: Rect,
        tiles: &mut [Tile],
        basis: usize,
        delta: RectDelta,
    ) -> RectDelta {
        if tiles.len() <= self.primary_size {
            return self.primary.adjust(area, tiles, basis, delta);
        }
        if self.primary_size == 0 {
            return self.secondary.adjust(area, tiles, basis, delta);
        }

        let in_primary = basis < self.primary_size;
        let horizontal = self.angle.is_horizontal();
        let reversed = self.angle.is_reversed();
        let (leading, trailing) =
            split_area_half_weighted(area, self.leading_ratio(), self.gap, horizontal);
        let (primary_area, secondary_area) =
            if reversed { (trailing, leading) } else { (leading, trailing) };

        let (head, tail) = tiles.split_at_mut(self.primary_size);
        let delta = if in_primary {
            self.primary.adjust(primary_area, head, basis, delta)
        } else {
            self.secondary.adjust(secondary_area, tail, basis - self.primary_size, delta)
        };

        let target = usize::from(in_primary == reversed);
        let leading_ratio =
            adjust_area_half_weights(area, self.leading_ratio(), self.gap, target, delta, horizontal);
        self.ratio = if reversed { 1.0 - leading_ratio } else { leading_ratio };

        // The edge shared with the sibling part has been absorbed here.
        match (self.angle.degrees(), in_primary) {
            (0, true) | (180, false) => RectDelta { right: 0.0, ..delta },
            (0, false) | (180, true) => RectDelta { left: 0.0, ..delta },
            (90, true) | (270, false) => RectDelta { bottom: 0.0, ..delta },
            _ => RectDelta { top: 0.0, ..delta },
        }
    }

    fn describe(&self) -> ascii_tree::Tree {
        ascii_tree::Tree::Node(
            format!(
                "split {}° primary={} ratio={:.2}",
                self.angle.degrees(),
                self.primary_size,
                self.ratio
            ),
            vec![self.primary.describe(), self.secondary.describe()],
        )
    }
}

/// Recursive half-split chain used by the spiral layout: each level hands one
/// tile to a full-area stack and the rest to the next level.
#[derive(Debug, Clone)]
pub enum SpiralPart {
    Fill(Stack),
    Split(Box<Split<Stack, SpiralPart>>),
}

impl SpiralPart {
    pub fn depth(&self) -> usize {
        match self {
            SpiralPart::Fill(_) => 1,
            SpiralPart::Split(split) => 1 + split.secondary.depth(),
        }
    }

    /// Grows the chain until it can hold `depth` tiles. Each new level turns
    /// a further 90 degrees. Existing levels keep their ratios.
    pub fn bore(&mut self, depth: usize, gap: i32) { self.bore_from(0, depth, gap) }

    fn bore_from(&mut self, level: usize, depth: usize, gap: i32) {
        if level + 1 >= depth {
            return;
        }
        match self {
            SpiralPart::Split(split) => split.secondary.bore_from(level + 1, depth, gap),
            SpiralPart::Fill(_) => {
                let split = Split::new(Stack, SpiralPart::Fill(Stack))
                    .with_gap(gap)
                    .with_angle(Angle::from_degrees((level % 4) as i32 * 90));
                *self = SpiralPart::Split(Box::new(split));
                if let SpiralPart::Split(split) = self {
                    split.secondary.bore_from(level + 1, depth, gap);
                }
            }
        }
    }
}

impl LayoutPart for SpiralPart {
    fn apply(&self, area: Rect, tiles: &[Tile]) -> Vec<Rect> {
        match self {
            SpiralPart::Fill(stack) => stack.apply(area, tiles),
            SpiralPart::Split(split) => split.apply(area, tiles),
        }
    }

    fn adjust(
        &mut self,
        area: Rect,
        tiles: &mut [Tile],
        basis: usize,
        delta: RectDelta,
    ) -> RectDelta {
        match self {
            SpiralPart::Fill(stack) => stack.adjust(area, tiles, basis, delta),
            SpiralPart::Split(split) => split.adjust(area, tiles, basis, delta),
        }
    }

    fn describe(&self) -> ascii_tree::Tree {
        match self {
            SpiralPart::Fill(stack) => stack.describe(),
            SpiralPart::Split(split) => split.describe(),
        }
    }
}

pub fn draw(part: &impl LayoutPart) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = ascii_tree::write_tree(&mut out, &part.describe());
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::tests::tiles;

    #[test]
    fn stair_matches_reference_cascade() {
        let out = Stair::new(24).apply(Rect::new(0, 0, 900, 600), &tiles(3));
        assert_eq!(out, vec![
            Rect::new(48, 0, 852, 600),
            Rect::new(24, 24, 876, 576),
            Rect::new(0, 48, 900, 552),
        ]);
    }

    #[test]
    fn crowded_stair_narrows_its_step() {
        let area = Rect::new(0, 0, 900, 600);
        let out = Stair::new(24).apply(area, &tiles(40));
        assert_eq!(out[0], Rect::new(897, 0, 3, 600));
        assert_eq!(out[39], Rect::new(0, 585, 900, 15));
        for rect in &out {
            assert!(rect.width > 0 && rect.height > 0, "{rect:?}");
            assert!(area.includes(rect), "{rect:?}");
        }
    }

    #[test]
    fn stair_step_is_bounded() {
        let mut stair = Stair::new(150);
        assert!(stair.change_step(1));
        assert_eq!(stair.step, 158);
        assert!(stair.change_step(1));
        assert_eq!(stair.step, 160);
        assert!(!stair.change_step(1));
        assert_eq!(Stair::new(1).step, Stair::MIN_STEP);
    }

    #[test]
    fn split_sends_head_to_primary() {
        let split = Split::new(Stack, Column::new(0));
        let out = split.apply(Rect::new(0, 0, 1000, 600), &tiles(3));
        assert_eq!(out, vec![
            Rect::new(0, 0, 500, 600),
            Rect::new(500, 0, 500, 300),
            Rect::new(500, 300, 500, 300),
        ]);
    }

    #[test]
    fn reversed_split_puts_primary_on_trailing_side() {
        let split = Split::new(Stack, Stack).with_angle(Angle::from_degrees(180));
        let out = split.apply(Rect::new(0, 0, 1000, 600), &tiles(2));
        assert_eq!(out, vec![Rect::new(500, 0, 500, 600), Rect::new(0, 0, 500, 600)]);

        let split = Split::new(Stack, Stack).with_angle(Angle::from_degrees(90));
        let out = split.apply(Rect::new(0, 0, 1000, 600), &tiles(2));
        assert_eq!(out, vec![Rect::new(0, 0, 1000, 300), Rect::new(0, 300, 1000, 300)]);
    }

    #[test]
    fn split_without_primary_uses_secondary_only() {
        let mut split = Split::new(Stack, Column::new(0));
        split.primary_size = 0;
        let out = split.apply(Rect::new(0, 0, 100, 100), &tiles(2));
        assert_eq!(out, vec![Rect::new(0, 0, 100, 50), Rect::new(0, 50, 100, 50)]);
    }

    #[test]
    fn rotate_walks_primary_around_the_area() {
        let area = Rect::new(10, 20, 400, 200);
        let mut rotate = Rotate::new(Split::new(Stack, Stack));
        assert_eq!(rotate.apply(area, &tiles(2)), vec![
            Rect::new(10, 20, 200, 200),
            Rect::new(210, 20, 200, 200),
        ]);

        rotate.rotate(90);
        assert_eq!(rotate.apply(area, &tiles(2)), vec![
            Rect::new(10, 20, 400, 100),
            Rect::new(10, 120, 400, 100),
        ]);

        rotate.rotate(90);
        assert_eq!(rotate.apply(area, &tiles(2)), vec![
            Rect::new(210, 20, 200, 200),
            Rect::new(10, 20, 200, 200),
        ]);

        rotate.rotate(90);
        assert_eq!(rotate.apply(area, &tiles(2)), vec![
            Rect::new(10, 120, 400, 100),
            Rect::new(10, 20, 400, 100),
        ]);

        rotate.rotate(90);
        assert_eq!(rotate.angle.degrees(), 0);
    }

    #[test]
    fn rotated_adjust_maps_delta_through_the_frame() {
        let area = Rect::new(0, 0, 400, 400);
        let mut rotate = Rotate::new(Split::new(Stack, Stack));
        rotate.rotate(90);
        // Primary is on top; dragging its bottom edge down grows it.
        let rest =
            rotate.adjust(area, &mut tiles(2), 0, RectDelta::new(0.0, 0.0, 0.0, 40.0));
        assert!(rest.is_zero());
        assert!((rotate.inner.ratio - 0.6).abs() < 1e-9);
    }

    #[test]
    fn split_adjust_moves_ratio_and_absorbs_shared_edge() {
        let area = Rect::new(0, 0, 1000, 600);
        let mut split = Split::new(Stack, Stack);
        let mut ts = tiles(2);
        let rest = split.adjust(area, &mut ts, 0, RectDelta::new(0.0, 100.0, 0.0, 0.0));
        assert!(rest.is_zero());
        assert!((split.ratio - 0.6).abs() < 1e-9);

        let rest = split.adjust(area, &mut ts, 1, RectDelta::new(50.0, 0.0, 5.0, 0.0));
        assert_eq!(rest, RectDelta::new(0.0, 0.0, 5.0, 0.0));
        assert!((split.ratio - 0.55).abs() < 1e-9);
    }

    #[test]
    fn column_adjust_rewrites_weights() {
        let area = Rect::new(0, 0, 100, 400);
        let mut column = Column::new(0);
        let mut ts = tiles(2);
        let rest = column.adjust(area, &mut ts, 0, RectDelta::new(0.0, 0.0, 0.0, 100.0));
        assert!(rest.is_zero());
        assert!((ts[0].weight - 1.5).abs() < 1e-9);
        assert!((ts[1].weight - 0.5).abs() < 1e-9);
        assert_eq!(column.apply(area, &ts), vec![
            Rect::new(0, 0, 100, 300),
            Rect::new(0, 300, 100, 100),
        ]);
    }

    #[test]
    fn spiral_bores_with_turning_angles() {
        let mut spiral = SpiralPart::Fill(Stack);
        spiral.bore(4, 0);
        assert_eq!(spiral.depth(), 4);
        let out = spiral.apply(Rect::new(0, 0, 800, 800), &tiles(4));
        assert_eq!(out, vec![
            Rect::new(0, 0, 400, 800),
            Rect::new(400, 0, 400, 400),
            Rect::new(600, 400, 200, 400),
            Rect::new(400, 400, 200, 400),
        ]);
        spiral.bore(2, 0);
        assert_eq!(spiral.depth(), 4);
    }

    #[test]
    fn draw_renders_every_level() {
        let part = Rotate::new(Split::new(Rotate::new(Column::new(0)), Column::new(0)));
        let text = draw(&part);
        assert!(text.contains("rotate 0°"));
        assert!(text.contains("split 0° primary=1"));
        assert_eq!(text.matches("column").count(), 2);
    }
}
