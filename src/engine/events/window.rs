use tracing::{debug, trace};

use crate::engine::{Engine, EngineError};
use crate::host::HostWindow;
use crate::model::{WindowFlags, WindowId, WindowState};

pub struct WindowEventHandler;

impl WindowEventHandler {
    pub fn handle_window_added(
        engine: &mut Engine,
        window: Box<dyn HostWindow>,
    ) -> Result<(), EngineError> {
        if let Some(surface) = engine.manage(window)? {
            engine.arrange(&surface);
        }
        Ok(())
    }

    pub fn handle_window_removed(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        if let Some(surface) = engine.unmanage(id)? {
            engine.arrange(&surface);
        }
        Ok(())
    }

    pub fn handle_maximize_changed(
        engine: &mut Engine,
        id: WindowId,
        maximized: bool,
    ) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        let window = &mut engine.windows[idx];
        if maximized {
            window.set_state(WindowState::Maximized);
        } else {
            window.restore_resting_state();
        }
        engine.arrange_window(idx);
        Ok(())
    }

    pub fn handle_focus_changed(
        engine: &mut Engine,
        id: Option<WindowId>,
    ) -> Result<(), EngineError> {
        let Some(idx) = id.and_then(|id| engine.index(id).ok()) else {
            return Ok(());
        };
        engine.focus_clock += 1;
        engine.windows[idx].focus_stamp = engine.focus_clock;
        Ok(())
    }

    pub fn handle_screen_changed(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        engine.refresh_group(idx);
        engine.persist_window(idx)?;
        engine.arrange_all();
        Ok(())
    }

    /// Floating windows adopt whatever the host reports; tiles are put back
    /// into their slot.
    pub fn handle_geometry_changed(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        let window = &mut engine.windows[idx];
        window.actual_geometry = window.host.geometry();
        if window.in_interaction() {
            return Ok(());
        }
        match window.state() {
            WindowState::Floating => window.geometry = window.actual_geometry,
            WindowState::Tiled if window.actual_geometry != window.geometry => {
                trace!(window = %id, "restoring tile geometry");
                engine.commit_window(idx)?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn handle_shade_changed(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        engine.arrange_window(idx);
        Ok(())
    }

    /// Resynchronizes minimized, desktop and manageability state.
    pub fn handle_window_changed(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        if !engine.windows[idx].host.manageable() {
            debug!(window = %id, "window became unmanageable");
            return Self::handle_window_removed(engine, id);
        }

        let window = &mut engine.windows[idx];
        window.flags.set(WindowFlags::ALL_DESKTOPS, window.host.on_all_desktops());
        let minimized = window.host.minimized();
        if minimized && window.state() != WindowState::Minimized {
            window.set_state(WindowState::Minimized);
        } else if !minimized && window.state() == WindowState::Minimized {
            window.restore_resting_state();
        }
        engine.refresh_group(idx);
        engine.persist_window(idx)?;
        engine.arrange_all();
        Ok(())
    }
}
