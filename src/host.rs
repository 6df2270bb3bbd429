//! Interfaces the engine consumes from the window system it runs inside.
//!
//! Every method takes `&self`: a binding is free to call back into the
//! controller synchronously (for example from `commit`), and those calls must
//! reach the re-entrancy guard rather than a borrow conflict.

use std::fmt;

use crate::geometry::{Rect, Size};
use crate::layout_engine::Action;
use crate::model::WindowId;

pub trait Host {
    fn screen_count(&self) -> usize;

    /// Usable area of `screen` (panels excluded). `None` if out of range.
    fn working_area(&self, screen: usize) -> Option<Rect>;

    /// Desktops are numbered from 1.
    fn current_desktop(&self) -> u32;

    fn desktop_count(&self) -> u32;

    fn current_activity(&self) -> String;

    fn current_screen(&self) -> usize;

    fn active_window(&self) -> Option<WindowId>;

    fn set_active_window(&self, window: WindowId);

    fn move_window(&self, window: WindowId, desktop: u32, screen: usize);

    fn show_notification(&self, text: &str);
}

pub trait HostWindow: fmt::Debug {
    fn id(&self) -> WindowId;

    fn geometry(&self) -> Rect;

    fn desktop(&self) -> u32;

    fn on_all_desktops(&self) -> bool;

    fn screen(&self) -> usize;

    /// Activities the window belongs to; empty means all of them.
    fn activities(&self) -> Vec<String>;

    fn minimized(&self) -> bool;

    fn maximized(&self) -> bool;

    fn shaded(&self) -> bool;

    fn fullscreen(&self) -> bool;

    /// False for windows the host will not let anyone manage (docks,
    /// desktops, transient popups).
    fn manageable(&self) -> bool;

    fn resource_class(&self) -> String;

    fn title(&self) -> String;

    fn role(&self) -> String;

    /// Dialogs, utility windows, splash screens and similar.
    fn special(&self) -> bool;

    fn resizable(&self) -> bool;

    /// Zero in either dimension means unconstrained.
    fn min_size(&self) -> Size;

    /// Zero in either dimension means unconstrained.
    fn max_size(&self) -> Size;

    fn commit(&self, geometry: Rect, keep_above: Option<bool>);
}

pub trait ShortcutRegistry {
    fn register(&mut self, name: &str, action: Action);
}
