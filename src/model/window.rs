use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::surface::{Surface, SurfaceKey};
use crate::common::collections::HashMap;
use crate::geometry::Rect;
use crate::host::HostWindow;

/// Host-assigned window identity. Stable for the lifetime of the window.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(id: u64) -> Self { WindowId(id) }

    pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    /// Terminal: the engine never touches the window again.
    Unmanaged,
    #[default]
    Undecided,
    Tiled,
    Floating,
    Maximized,
    Minimized,
}

impl WindowState {
    /// States the engine returns to once a host maximize or minimize ends.
    fn is_resting(self) -> bool { matches!(self, WindowState::Tiled | WindowState::Floating) }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct WindowFlags: u8 {
        const SHOULD_IGNORE = 1 << 0;
        const SHOULD_FLOAT  = 1 << 1;
        /// Interactive move in progress; commits are suppressed.
        const MOVING        = 1 << 2;
        /// Interactive resize in progress; commits are suppressed.
        const RESIZING      = 1 << 3;
        const ALL_DESKTOPS  = 1 << 4;
    }
}

/// Engine-side record of a managed host window.
#[derive(Debug)]
pub struct Window {
    pub id: WindowId,
    pub host: Box<dyn HostWindow>,
    state: WindowState,
    /// Tiled or floating state to return to after a host maximize/minimize.
    resting_state: WindowState,
    /// Geometry the engine wants the host to apply on the next commit.
    pub geometry: Rect,
    /// Last geometry observed from the host.
    pub actual_geometry: Rect,
    /// Geometry restored when the window goes back to floating.
    pub float_geometry: Rect,
    pub group: Option<u32>,
    /// `(desktop, screen)` the group was derived from.
    pub group_origin: Option<(u32, usize)>,
    pub flags: WindowFlags,
    weights: HashMap<SurfaceKey, f64>,
    /// Logical time of the last focus; larger is more recent.
    pub focus_stamp: u64,
}

impl Window {
    pub fn new(host: Box<dyn HostWindow>) -> Self {
        let geometry = host.geometry();
        Self {
            id: host.id(),
            state: WindowState::Undecided,
            resting_state: WindowState::Tiled,
            geometry,
            actual_geometry: geometry,
            float_geometry: geometry,
            group: None,
            group_origin: None,
            flags: WindowFlags::empty(),
            weights: HashMap::default(),
            focus_stamp: 0,
            host,
        }
    }

    pub fn state(&self) -> WindowState { self.state }

    pub fn is_tileable(&self) -> bool { self.state == WindowState::Tiled }

    pub fn is_floating(&self) -> bool { self.state == WindowState::Floating }

    pub fn is_managed(&self) -> bool { self.state != WindowState::Unmanaged }

    pub fn should_ignore(&self) -> bool { self.flags.contains(WindowFlags::SHOULD_IGNORE) }

    pub fn should_float(&self) -> bool { self.flags.contains(WindowFlags::SHOULD_FLOAT) }

    pub fn in_interaction(&self) -> bool {
        self.flags.intersects(WindowFlags::MOVING | WindowFlags::RESIZING)
    }

    /// Moves the window through the state machine. `Unmanaged` is terminal.
    /// Entering `Floating` brings back the remembered floating geometry;
    /// leaving it records the current one.
    pub fn set_state(&mut self, next: WindowState) {
        let prev = self.state;
        if prev == next || prev == WindowState::Unmanaged {
            return;
        }
        match next {
            WindowState::Floating => self.geometry = self.float_geometry,
            _ if prev == WindowState::Floating => self.float_geometry = self.actual_geometry,
            _ => {}
        }
        if matches!(next, WindowState::Minimized | WindowState::Maximized) && prev.is_resting() {
            self.resting_state = prev;
        }
        trace!(window = %self.id, ?prev, ?next, "window state");
        self.state = next;
    }

    /// Leaves a host maximize/minimize for the state held before it.
    pub fn restore_resting_state(&mut self) {
        if matches!(self.state, WindowState::Minimized | WindowState::Maximized) {
            self.set_state(self.resting_state);
        }
    }

    /// State the window would return to after a host maximize/minimize.
    pub fn resting_state(&self) -> WindowState { self.resting_state }

    pub fn weight(&self, key: &SurfaceKey) -> f64 { self.weights.get(key).copied().unwrap_or(1.0) }

    pub fn set_weight(&mut self, key: &SurfaceKey, weight: f64) {
        if weight == 1.0 {
            self.weights.remove(key);
        } else {
            self.weights.insert(key.clone(), weight);
        }
    }

    pub fn on_all_desktops(&self) -> bool { self.flags.contains(WindowFlags::ALL_DESKTOPS) }

    /// Whether the window shows on `surface`: not minimized, on the same
    /// screen and activity, and in the surface's group. `screen` is the
    /// window's screen after resolving indices the host no longer has.
    pub fn is_visible_on(&self, surface: &Surface, screen: usize) -> bool {
        if self.state == WindowState::Minimized || self.host.minimized() {
            return false;
        }
        if screen != surface.screen {
            return false;
        }
        let activities = self.host.activities();
        if !activities.is_empty() && !activities.iter().any(|a| *a == surface.activity) {
            return false;
        }
        self.on_all_desktops() || self.group == Some(surface.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimWindow;

    fn window() -> Window {
        Window::new(Box::new(SimWindow::new(7, Rect::new(10, 10, 300, 200))))
    }

    #[test]
    fn maximize_returns_to_prior_state() {
        let mut w = window();
        w.set_state(WindowState::Floating);
        w.set_state(WindowState::Maximized);
        w.restore_resting_state();
        assert_eq!(w.state(), WindowState::Floating);

        w.set_state(WindowState::Tiled);
        w.set_state(WindowState::Minimized);
        w.set_state(WindowState::Maximized);
        w.restore_resting_state();
        assert_eq!(w.state(), WindowState::Tiled);
    }

    #[test]
    fn unmanaged_is_terminal() {
        let mut w = window();
        w.set_state(WindowState::Unmanaged);
        w.set_state(WindowState::Tiled);
        assert_eq!(w.state(), WindowState::Unmanaged);
        assert!(!w.is_managed());
    }

    #[test]
    fn floating_geometry_is_remembered() {
        let mut w = window();
        w.set_state(WindowState::Floating);
        w.actual_geometry = Rect::new(50, 60, 300, 200);
        w.set_state(WindowState::Tiled);
        w.geometry = Rect::new(0, 0, 500, 500);
        w.set_state(WindowState::Floating);
        assert_eq!(w.geometry, Rect::new(50, 60, 300, 200));
    }

    #[test]
    fn weights_default_to_one() {
        let mut w = window();
        let key = SurfaceKey::new(0, None, Some(1));
        assert_eq!(w.weight(&key), 1.0);
        w.set_weight(&key, 1.5);
        assert_eq!(w.weight(&key), 1.5);
        assert_eq!(w.weight(&SurfaceKey::new(1, None, Some(1))), 1.0);
    }
}
