use crate::host::HostWindow;
use crate::layout_engine::Action;
use crate::model::{Surface, WindowId};

/// Everything the host tells the controller, plus user actions.
#[derive(Debug)]
pub enum Event {
    WindowAdded(Box<dyn HostWindow>),
    WindowRemoved(WindowId),
    WindowMaximizeChanged(WindowId, bool),
    WindowMoveStart(WindowId),
    WindowMove(WindowId),
    WindowMoveOver(WindowId),
    WindowResizeStart(WindowId),
    WindowResize(WindowId),
    WindowResizeOver(WindowId),
    WindowFocusChanged(Option<WindowId>),
    WindowScreenChanged(WindowId),
    WindowGeometryChanged(WindowId),
    WindowShadeChanged(WindowId),
    /// Catch-all for minimize, desktop and manageability changes.
    WindowChanged(WindowId),
    CurrentActivityChanged,
    CurrentDesktopChanged,
    NumberDesktopsChanged,
    Arrange(Surface),
    ArrangeAll,
    Action(Action),
}
