//! Handlers the controller dispatches host notifications and actions to.

mod action;
mod interaction;
mod window;

pub use action::ActionEventHandler;
pub use interaction::InteractionEventHandler;
pub use window::WindowEventHandler;
