use super::{LayoutClass, LayoutState, MasterBounds, Tile, WindowsLayout, assign};
use crate::common::config::LayoutSettings;
use crate::geometry::{Rect, RectDelta};
use crate::layout_engine::action::{Action, ActionResponse};
use crate::layout_engine::parts::{Column, LayoutPart};
use crate::layout_engine::utils::{
    adjust_area_half_weights, adjust_area_weights, clip, split_area_half_weighted,
    split_area_weighted,
};

const MAX_MASTER_RATIO: f64 = 0.75;

/// Master column centred between two stacks. Overflow fills the right stack
/// first.
#[derive(Debug, Clone)]
pub struct ThreeColumnLayout {
    gap: i32,
    master_ratio: f64,
    master_size: usize,
    bounds: MasterBounds,
}

/// Which column a tile belongs to when all three are in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Left,
    Master,
    Right,
}

impl ThreeColumnLayout {
    pub fn new(settings: &LayoutSettings) -> Self {
        let mut bounds = MasterBounds::from_settings(settings);
        bounds.max_ratio = bounds.max_ratio.min(MAX_MASTER_RATIO);
        Self {
            gap: settings.gaps.tile,
            master_ratio: bounds.clip_ratio(0.6),
            master_size: 1,
            bounds,
        }
    }

    /// Tiles in the right stack when all three columns are in use.
    fn right_count(&self, n: usize) -> usize { (n - self.master_size).div_ceil(2) }

    fn group_of(&self, index: usize, n: usize) -> Group {
        if index < self.master_size {
            Group::Master
        } else if index < self.master_size + self.right_count(n) {
            Group::Right
        } else {
            Group::Left
        }
    }

    fn column_weights(&self) -> [f64; 3] {
        let stack = 1.0 - self.master_ratio;
        [stack, self.master_ratio, stack]
    }
}

impl WindowsLayout for ThreeColumnLayout {
    fn class(&self) -> LayoutClass { LayoutClass::ThreeColumn }

    fn description(&self) -> String { format!("Three Column [{}]", self.master_size) }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let n = tiles.len();
        let ms = self.master_size;
        let column = Column::new(self.gap);

        let geometries = if n <= ms {
            column.apply(area, tiles)
        } else if n == ms + 1 {
            let (master_area, stack_area) =
                split_area_half_weighted(area, self.master_ratio, self.gap, true);
            let mut out = column.apply(master_area, &tiles[..ms]);
            out.push(stack_area);
            out
        } else {
            let areas = split_area_weighted(area, &self.column_weights(), self.gap, true);
            let right = ms + self.right_count(n);
            let mut out = column.apply(areas[1], &tiles[..ms]);
            out.extend(column.apply(areas[2], &tiles[ms..right]));
            out.extend(column.apply(areas[0], &tiles[right..]));
            out
        };
        assign(tiles, geometries);
    }

    fn adjust(&mut self, area: Rect, tiles: &mut [Tile], basis: usize, delta: RectDelta) {
        let n = tiles.len();
        let ms = self.master_size;
        let mut column = Column::new(self.gap);

        if n <= ms {
            column.adjust(area, tiles, basis, delta);
        } else if n == ms + 1 {
            let in_master = basis < ms;
            let (master_area, _) = split_area_half_weighted(area, self.master_ratio, self.gap, true);
            self.master_ratio = adjust_area_half_weights(
                area,
                self.master_ratio,
                self.gap,
                usize::from(!in_master),
                delta,
                true,
            );
            if in_master {
                column.adjust(master_area, &mut tiles[..ms], basis, delta);
            }
        } else {
            let group = self.group_of(basis, n);
            let areas = split_area_weighted(area, &self.column_weights(), self.gap, true);
            let target = match group {
                Group::Left => 0,
                Group::Master => 1,
                Group::Right => 2,
            };
            let adjusted =
                adjust_area_weights(area, &self.column_weights(), self.gap, target, delta, true);
            let stack = if group == Group::Left { adjusted[0] } else { adjusted[2] };
            self.master_ratio = adjusted[1] / (adjusted[1] + stack);

            let right = ms + self.right_count(n);
            match group {
                Group::Master => {
                    column.adjust(areas[1], &mut tiles[..ms], basis, delta);
                }
                Group::Right => {
                    column.adjust(areas[2], &mut tiles[ms..right], basis - ms, delta);
                }
                Group::Left => {
                    column.adjust(areas[0], &mut tiles[right..], basis - right, delta);
                }
            }
        }
        self.master_ratio = self.bounds.clip_ratio(self.master_ratio);
    }

    fn execute_action(&mut self, action: &Action) -> ActionResponse {
        match action {
            Action::IncreaseMasterSize => {
                self.master_ratio = self.bounds.slide_ratio(self.master_ratio, true)
            }
            Action::DecreaseMasterSize => {
                self.master_ratio = self.bounds.slide_ratio(self.master_ratio, false)
            }
            Action::IncreaseMasterCount => {
                self.master_size = (self.master_size + 1).min(self.bounds.max_count)
            }
            Action::DecreaseMasterCount => self.master_size = (self.master_size - 1).max(1),
            _ => return ActionResponse::Unhandled,
        }
        ActionResponse::Handled
    }

    fn state(&self) -> LayoutState {
        LayoutState {
            num_master_tiles: self.master_size,
            master_ratio: self.master_ratio,
            ..LayoutState::new(LayoutClass::ThreeColumn)
        }
    }

    fn restore(&mut self, state: &LayoutState) {
        self.master_size = clip(state.num_master_tiles, 1, self.bounds.max_count);
        self.master_ratio = self.bounds.clip_ratio(state.master_ratio);
    }

    fn draw_tree(&self) -> String {
        let mut out = String::new();
        let tree = ascii_tree::Tree::Node(
            format!("three column master={} ratio={:.2}", self.master_size, self.master_ratio),
            vec![
                ascii_tree::Tree::Leaf(vec!["left column".into()]),
                ascii_tree::Tree::Leaf(vec!["master column".into()]),
                ascii_tree::Tree::Leaf(vec!["right column".into()]),
            ],
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

    fn three_column() -> Layout {
        Layout::new(LayoutClass::ThreeColumn, &LayoutSettings::default())
    }

    #[test]
    fn two_windows_split_master_and_stack() {
        let mut layout = three_column();
        assert_eq!(run(&mut layout, Rect::new(0, 0, 1000, 600), 2), vec![
            Rect::new(0, 0, 600, 600),
            Rect::new(600, 0, 400, 600),
        ]);
    }

    #[test]
    fn overflow_fills_right_stack_first() {
        let mut layout = three_column();
        layout.restore(&LayoutState {
            master_ratio: 0.5,
            ..LayoutState::new(LayoutClass::ThreeColumn)
        });
        let out = run(&mut layout, Rect::new(0, 0, 1500, 600), 4);
        assert_eq!(out, vec![
            Rect::new(500, 0, 500, 600),
            Rect::new(1000, 0, 500, 300),
            Rect::new(1000, 300, 500, 300),
            Rect::new(0, 0, 500, 600),
        ]);
    }

    #[test]
    fn master_count_never_drops_below_one() {
        let mut layout = three_column();
        layout.execute_action(&Action::DecreaseMasterCount);
        assert_eq!(layout.state().num_master_tiles, 1);
        layout.execute_action(&Action::IncreaseMasterCount);
        assert_eq!(layout.state().num_master_tiles, 2);
    }

    #[test]
    fn ratio_is_capped_below_three_quarters() {
        let mut layout = three_column();
        for _ in 0..10 {
            layout.execute_action(&Action::IncreaseMasterSize);
        }
        assert!((layout.state().master_ratio - 0.75).abs() < 1e-9);
    }

    #[test]
    fn adjusting_master_edge_changes_ratio() {
        let mut layout = three_column();
        let area = Rect::new(0, 0, 1000, 600);
        let mut ts = tiles(2);
        layout.apply(area, &mut ts);
        layout.adjust(area, &mut ts, 0, RectDelta::new(0.0, -100.0, 0.0, 0.0));
        assert!((layout.state().master_ratio - 0.5).abs() < 1e-9);
    }
}
