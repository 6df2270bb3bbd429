use super::{LayoutClass, Tile, WindowsLayout, assign};
use crate::geometry::Rect;
use crate::layout_engine::action::{Action, ActionResponse};
use crate::layout_engine::utils::{fit_step, wrap_index};

const STEP: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum CascadeDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CascadeDirection {
    /// Per-window offset sign as `(vertical, horizontal)`.
    fn decompose(self) -> (i32, i32) {
        match self {
            CascadeDirection::North => (-1, 0),
            CascadeDirection::NorthEast => (-1, 1),
            CascadeDirection::East => (0, 1),
            CascadeDirection::SouthEast => (1, 1),
            CascadeDirection::South => (1, 0),
            CascadeDirection::SouthWest => (1, -1),
            CascadeDirection::West => (0, -1),
            CascadeDirection::NorthWest => (-1, -1),
        }
    }

    fn turned(self, steps: isize) -> Self {
        use strum::IntoEnumIterator;
        let all: Vec<_> = CascadeDirection::iter().collect();
        let index = all.iter().position(|d| *d == self).unwrap_or_default();
        all[wrap_index(index as isize + steps, all.len())]
    }
}

#[derive(Debug, Clone)]
pub struct CascadeLayout {
    direction: CascadeDirection,
}

impl CascadeLayout {
    pub fn new() -> Self {
        Self {
            direction: CascadeDirection::SouthEast,
        }
    }

    pub fn direction(&self) -> CascadeDirection { self.direction }
}

impl Default for CascadeLayout {
    fn default() -> Self { Self::new() }
}

impl WindowsLayout for CascadeLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Cascade }

    fn description(&self) -> String { format!("Cascade [{}]", self.direction) }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let n = tiles.len() as i32;
        if n == 0 {
            return;
        }
        let (vertical, horizontal) = self.direction.decompose();
        let step_x = fit_step(STEP, area.width, n);
        let step_y = fit_step(STEP, area.height, n);
        let width = if horizontal != 0 { area.width - step_x * (n - 1) } else { area.width };
        let height = if vertical != 0 { area.height - step_y * (n - 1) } else { area.height };
        let base_x = if horizontal >= 0 { area.x } else { area.max_x() - width };
        let base_y = if vertical >= 0 { area.y } else { area.max_y() - height };

        let geometries = (0..n)
            .map(|i| {
                Rect::new(
                    base_x + horizontal * step_x * i,
                    base_y + vertical * step_y * i,
                    width,
                    height,
                )
            })
            .collect();
        assign(tiles, geometries);
    }

    fn execute_action(&mut self, action: &Action) -> ActionResponse {
        match action {
            Action::IncreaseMasterCount => self.direction = self.direction.turned(1),
            Action::DecreaseMasterCount => self.direction = self.direction.turned(-1),
            _ => return ActionResponse::Unhandled,
        }
        ActionResponse::Handled
    }

    fn draw_tree(&self) -> String {
        let mut out = String::new();
        let tree = ascii_tree::Tree::Leaf(vec![format!("cascade {} step={STEP}", self.direction)]);
        let _ = ascii_tree::write_tree(&mut out, &tree);
        out
    }
}
