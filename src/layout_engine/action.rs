use serde::{Deserialize, Serialize};

use super::graph::Direction;
use super::systems::LayoutClass;

/// User-facing commands. Layouts match on the kinds they own; anything they
/// leave alone runs the engine's layout-independent default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    FocusNext,
    FocusPrevious,
    Focus(Direction),
    MoveNext,
    MovePrevious,
    Move(Direction),
    IncreaseWidth,
    DecreaseWidth,
    IncreaseHeight,
    DecreaseHeight,
    IncreaseMasterCount,
    DecreaseMasterCount,
    IncreaseMasterSize,
    DecreaseMasterSize,
    ToggleFloating,
    PushToMaster,
    NextLayout,
    PreviousLayout,
    ToggleLayout(LayoutClass),
    Rotate,
    RotatePart,
    /// Re-bind the current surface's `(desktop, screen)` to another group.
    SetSurfaceGroup(u32),
    /// Move the active window into another group.
    MoveToGroup(u32),
}

/// How a layout answered an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResponse {
    /// The layout changed its own parameters; the surface needs a re-arrange.
    Handled,
    /// The layout wants a different action run in place of this one.
    Redirect(Action),
    /// Not a layout concern; run the action's default effect.
    Unhandled,
}

impl Action {
    /// Stable identifier used when registering shortcuts.
    pub fn name(&self) -> String {
        fn dir(d: Direction) -> &'static str {
            match d {
                Direction::Left => "left",
                Direction::Right => "right",
                Direction::Up => "up",
                Direction::Down => "down",
            }
        }
        match self {
            Action::FocusNext => "focus_next".into(),
            Action::FocusPrevious => "focus_previous".into(),
            Action::Focus(d) => format!("focus_{}", dir(*d)),
            Action::MoveNext => "move_next".into(),
            Action::MovePrevious => "move_previous".into(),
            Action::Move(d) => format!("move_{}", dir(*d)),
            Action::IncreaseWidth => "increase_width".into(),
            Action::DecreaseWidth => "decrease_width".into(),
            Action::IncreaseHeight => "increase_height".into(),
            Action::DecreaseHeight => "decrease_height".into(),
            Action::IncreaseMasterCount => "increase_master_count".into(),
            Action::DecreaseMasterCount => "decrease_master_count".into(),
            Action::IncreaseMasterSize => "increase_master_size".into(),
            Action::DecreaseMasterSize => "decrease_master_size".into(),
            Action::ToggleFloating => "toggle_floating".into(),
            Action::PushToMaster => "push_to_master".into(),
            Action::NextLayout => "next_layout".into(),
            Action::PreviousLayout => "previous_layout".into(),
            Action::ToggleLayout(class) => format!("toggle_{}_layout", <&str>::from(*class)),
            Action::Rotate => "rotate".into(),
            Action::RotatePart => "rotate_part".into(),
            Action::SetSurfaceGroup(group) => format!("set_surface_group_{group}"),
            Action::MoveToGroup(group) => format!("move_to_group_{group}"),
        }
    }

    /// Every action a host should offer as a shortcut. Group actions are
    /// generated for `1..=group_count`.
    pub fn bindable(group_count: u32) -> Vec<Action> {
        use strum::IntoEnumIterator;

        let directions = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];
        let mut actions = vec![
            Action::FocusNext,
            Action::FocusPrevious,
            Action::MoveNext,
            Action::MovePrevious,
            Action::IncreaseWidth,
            Action::DecreaseWidth,
            Action::IncreaseHeight,
            Action::DecreaseHeight,
            Action::IncreaseMasterCount,
            Action::DecreaseMasterCount,
            Action::IncreaseMasterSize,
            Action::DecreaseMasterSize,
            Action::ToggleFloating,
            Action::PushToMaster,
            Action::NextLayout,
            Action::PreviousLayout,
            Action::Rotate,
            Action::RotatePart,
        ];
        actions.extend(directions.iter().map(|&d| Action::Focus(d)));
        actions.extend(directions.iter().map(|&d| Action::Move(d)));
        actions.extend(LayoutClass::iter().map(Action::ToggleLayout));
        for group in 1..=group_count {
            actions.push(Action::SetSurfaceGroup(group));
            actions.push(Action::MoveToGroup(group));
        }
        actions
    }
}
