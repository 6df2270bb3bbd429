pub mod action;
pub mod graph;
pub mod parts;
pub mod systems;
pub mod utils;
mod workspaces;

pub use action::{Action, ActionResponse};
pub use graph::{Angle, Direction, Orientation};
pub use systems::{Layout, LayoutClass, LayoutState, Tile, WindowsLayout};
pub use workspaces::{LayoutId, LayoutStore};
