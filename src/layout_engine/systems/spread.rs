use super::{LayoutClass, Tile, WindowsLayout, assign};
use crate::geometry::Rect;
use crate::layout_engine::action::{Action, ActionResponse};
use crate::layout_engine::utils::clip;

const MIN_SPACE: f64 = 0.04;
const MAX_SPACE: f64 = 0.3;
const SPACE_STEP: f64 = 0.01;
/// Narrowest card, as a fraction of the area width.
const MIN_CARD: f64 = 0.4;

/// Full-height cards fanned out horizontally, the first one on the right.
#[derive(Debug, Clone)]
pub struct SpreadLayout {
    space: f64,
}

impl SpreadLayout {
    pub fn new() -> Self { Self { space: 0.07 } }
}

impl Default for SpreadLayout {
    fn default() -> Self { Self::new() }
}

impl WindowsLayout for SpreadLayout {
    fn class(&self) -> LayoutClass { LayoutClass::Spread }

    fn description(&self) -> String { "Spread".to_string() }

    fn apply(&mut self, area: Rect, tiles: &mut [Tile]) {
        let n = tiles.len();
        if n == 0 {
            return;
        }
        let space = (f64::from(area.width) * self.space).floor() as i32;
        let min_card = f64::from(area.width) * MIN_CARD;
        let mut fanned = n as i32;
        let mut card = area.width - space * (fanned - 1);
        // Cards past the point where they would get too narrow pile up at
        // the left edge.
        while f64::from(card) < min_card && fanned > 1 {
            card += space;
            fanned -= 1;
        }

        let geometries = (0..n as i32)
            .map(|i| {
                let offset = if i < fanned { space * (fanned - i - 1) } else { 0 };
                Rect::new(area.x + offset, area.y, card, area.height)
            })
            .collect();
        assign(tiles, geometries);
    }

    fn execute_action(&mut self, action: &Action) -> ActionResponse {
        let step = match action {
            Action::IncreaseMasterCount => SPACE_STEP,
            Action::DecreaseMasterCount => -SPACE_STEP,
            _ => return ActionResponse::Unhandled,
        };
        self.space = clip(self.space + step, MIN_SPACE, MAX_SPACE);
        ActionResponse::Handled
    }

    fn draw_tree(&self) -> String {
        let mut out = String::new();
        let tree = ascii_tree::Tree::Leaf(vec![format!("spread space={:.2}", self.space)]);
        let _ = ascii_tree::write_tree(&mut out, &tree);
        out
    }
}
