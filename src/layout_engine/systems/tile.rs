use super::{MasterBounds, Tile, WindowsLayout, assign};
use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, RectDelta};
use crate::layout_engine::action::{Action, ActionResponse};
use crate::layout_engine::parts::{Column, LayoutPart, Rotate, Split, draw};
use crate::layout_engine::systems::{LayoutClass, LayoutState};
use crate::layout_engine::utils::clip;

type TileParts = Rotate<Split<Rotate<Column>, Column>>;

/// Master column beside a stack column. The outer rotation moves the master
/// area around the screen; the inner one turns the master column into a row.
#[derive(Debug, Clone)]
pub struct TileLayout {
    parts: TileParts,
    bounds: MasterBounds,
}

impl TileLayout {
    pub fn new(settings: &LayoutSettings) -> Self {
        let gap = settings.gaps.tile;
        let split = Split::new(Rotate::new(Column::new(gap)), Column::new(gap)).with_gap(gap);
        let bounds = MasterBounds::from_settings(settings);
        let mut layout = Self { parts: Rotate::new(split), bounds };
        layout.parts.inner.ratio = bounds.clip_ratio(0.5);
        layout
    }

    pub fn master_ratio(&self) -> f64 { self.parts.inner.ratio }

    pub fn num_master(&self) -> usize { self.parts.inner.primary_size }

    fn split_mut(&mut self) -> &mut Split<Rotate<Column>, Column> { &mut self.parts.inner }
}

impl WindowsLayout for TileLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Tile }

    fn description(&self) -> String { format!("Tile [{}]", self.num_master()) }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let geometries = self.parts.apply(area, tiles);
        assign(tiles, geometries);
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: usize, delta: RectDelta) {
        self.parts.adjust(area, tiles, basis, delta);
        let ratio = self.bounds.clip_ratio(self.master_ratio());
        self.split_mut().ratio = ratio;
    }

    fn execute_action(&mut self, action: &Action) -> ActionResponse {
        let bounds = self.bounds;
        match action {
            Action::IncreaseMasterSize | Action::DecreaseMasterSize => {
                let grow = matches!(action, Action::IncreaseMasterSize);
                let split = self.split_mut();
                split.ratio = bounds.slide_ratio(split.ratio, grow);
            }
            Action::IncreaseMasterCount => {
                let split = self.split_mut();
                split.primary_size = (split.primary_size + 1).min(bounds.max_count);
            }
            Action::DecreaseMasterCount => {
                let split = self.split_mut();
                split.primary_size = split.primary_size.saturating_sub(1);
            }
            Action::Rotate => self.parts.rotate(90),
            Action::RotatePart => self.split_mut().primary.rotate(90),
            _ => return ActionResponse::Unhandled,
        }
        ActionResponse::Handled
    }

    fn state(&self) -> LayoutState {
        LayoutState {
            rotation: self.parts.angle,
            part_rotation: self.parts.inner.primary.angle,
            num_master_tiles: self.num_master(),
            master_ratio: self.master_ratio(),
            ..LayoutState::new(LayoutClass::Tile)
        }
    }

    fn restore(&mut self, state: &LayoutState) {
        let bounds = self.bounds;
        self.parts.angle = state.rotation;
        let split = self.split_mut();
        split.primary.angle = state.part_rotation;
        split.primary_size = clip(state.num_master_tiles, 0, bounds.max_count);
        split.ratio = bounds.clip_ratio(state.master_ratio);
    }

    fn draw_tree(&self) -> String { draw(&self.parts) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::graph::Angle;
    use crate::layout_engine::systems::Layout;
    use crate::layout_engine::systems::tests::{run, tiles};

    fn tile() -> Layout { Layout::new(LayoutClass::Tile, &LayoutSettings::default()) }

    #[test]
    fn master_beside_stack() {
        let mut layout = tile();
        assert_eq!(run(&mut layout, Rect::new(0, 0, 1000, 600), 3), vec![
            Rect::new(0, 0, 500, 600),
            Rect::new(500, 0, 500, 300),
            Rect::new(500, 300, 500, 300),
        ]);
        assert_eq!(run(&mut layout, Rect::new(0, 0, 1000, 600), 1), vec![Rect::new(
            0, 0, 1000, 600
        )]);
    }

    #[test]
    fn master_count_is_bounded() {
        let mut layout = tile();
        for _ in 0..15 {
            assert_eq!(layout.execute_action(&Action::IncreaseMasterCount), ActionResponse::Handled);
        }
        assert_eq!(layout.state().num_master_tiles, 10);
        for _ in 0..15 {
            layout.execute_action(&Action::DecreaseMasterCount);
        }
        assert_eq!(layout.state().num_master_tiles, 0);
        // Without masters the stack takes the whole area.
        assert_eq!(run(&mut layout, Rect::new(0, 0, 100, 100), 2), vec![
            Rect::new(0, 0, 100, 50),
            Rect::new(0, 50, 100, 50),
        ]);
    }

    #[test]
    fn master_ratio_slides_and_clamps() {
        let mut layout = tile();
        layout.execute_action(&Action::IncreaseMasterSize);
        assert!((layout.state().master_ratio - 0.55).abs() < 1e-9);
        for _ in 0..20 {
            layout.execute_action(&Action::IncreaseMasterSize);
        }
        assert!((layout.state().master_ratio - 0.8).abs() < 1e-9);
        for _ in 0..20 {
            layout.execute_action(&Action::DecreaseMasterSize);
        }
        assert!((layout.state().master_ratio - 0.2).abs() < 1e-9);
    }

    #[test]
    fn rotate_puts_master_on_top() {
        let mut layout = tile();
        layout.execute_action(&Action::Rotate);
        assert_eq!(run(&mut layout, Rect::new(0, 0, 1000, 600), 3), vec![
            Rect::new(0, 0, 1000, 300),
            Rect::new(0, 300, 500, 300),
            Rect::new(500, 300, 500, 300),
        ]);
    }

    #[test]
    fn rotate_part_lays_masters_side_by_side() {
        let mut layout = tile();
        layout.execute_action(&Action::IncreaseMasterCount);
        layout.execute_action(&Action::RotatePart);
        assert_eq!(run(&mut layout, Rect::new(0, 0, 1000, 600), 3), vec![
            Rect::new(0, 0, 250, 600),
            Rect::new(250, 0, 250, 600),
            Rect::new(500, 0, 500, 600),
        ]);
    }

    #[test]
    fn adjust_moves_master_boundary_within_bounds() {
        let mut layout = tile();
        let area = Rect::new(0, 0, 1000, 600);
        let mut ts = tiles(2);
        layout.apply(area, &mut ts);
        layout.adjust(area, &mut ts, 0, RectDelta::new(0.0, 100.0, 0.0, 0.0));
        assert!((layout.state().master_ratio - 0.6).abs() < 1e-9);
        layout.adjust(area, &mut ts, 0, RectDelta::new(0.0, 900.0, 0.0, 0.0));
        assert!((layout.state().master_ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn state_round_trips() {
        let mut layout = tile();
        layout.execute_action(&Action::Rotate);
        layout.execute_action(&Action::RotatePart);
        layout.execute_action(&Action::IncreaseMasterCount);
        let state = layout.state();
        assert_eq!(state.rotation, Angle::from_degrees(90));
        assert_eq!(state.part_rotation, Angle::from_degrees(90));

        let mut fresh = tile();
        fresh.restore(&state);
        assert_eq!(fresh.state(), state);
    }
}
