//! Interactive moves and resizes driven by the user's pointer.
//!
//! Commits to a window are suppressed between the start and `*_over`
//! notifications so the host is not fighting the pointer.

use tracing::{debug, trace};

use crate::engine::{Engine, EngineError};
use crate::model::{WindowFlags, WindowId, WindowState};

pub struct InteractionEventHandler;

impl InteractionEventHandler {
    pub fn handle_move_start(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        engine.windows[idx].flags.insert(WindowFlags::MOVING);
        Ok(())
    }

    pub fn handle_move(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        let window = &mut engine.windows[idx];
        window.actual_geometry = window.host.geometry();
        trace!(window = %id, geometry = ?window.actual_geometry, "moving");
        Ok(())
    }

    /// Dropping a tile swaps it with the tile under its centre, or floats it
    /// if it was dragged far enough from its slot. Otherwise it snaps back.
    pub fn handle_move_over(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        let window = &mut engine.windows[idx];
        window.flags.remove(WindowFlags::MOVING);
        window.actual_geometry = window.host.geometry();
        match window.state() {
            WindowState::Tiled => Self::drop_tile(engine, idx),
            WindowState::Floating => {
                window.geometry = window.actual_geometry;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn drop_tile(engine: &mut Engine, idx: usize) -> Result<(), EngineError> {
        let surface = engine
            .window_surface(idx)
            .ok_or(EngineError::NoSurface(engine.windows[idx].id))?;
        let dropped = engine.windows[idx].actual_geometry;
        let slot = engine.windows[idx].geometry;
        let center = dropped.center();
        let target = engine
            .tileable_on(&surface)
            .into_iter()
            .find(|&i| i != idx && engine.windows[i].geometry.includes_point(center));
        if let Some(target) = target {
            debug!(window = %engine.windows[idx].id, with = %engine.windows[target].id, "drag swap");
            engine.windows.swap(idx, target);
            engine.persist_order()?;
        } else {
            let distance = f64::from(dropped.x - slot.x).hypot(f64::from(dropped.y - slot.y));
            if distance > f64::from(engine.config.settings.float_on_drag_distance) {
                let window = &mut engine.windows[idx];
                debug!(window = %window.id, distance, "drag float");
                window.float_geometry = dropped;
                window.set_state(WindowState::Floating);
                engine.host.show_notification("Window floating");
            }
        }
        engine.arrange(&surface);
        Ok(())
    }

    pub fn handle_resize_start(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        engine.windows[idx].flags.insert(WindowFlags::RESIZING);
        Ok(())
    }

    /// A resize step. With live adjustment the other tiles follow the
    /// pointer while the resized window itself is left alone.
    pub fn handle_resize(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        let window = &mut engine.windows[idx];
        window.actual_geometry = window.host.geometry();
        let settings = &engine.config.settings;
        if window.is_tileable() && settings.adjust_layout && settings.adjust_layout_live {
            engine.adjust_layout(idx)?;
        }
        Ok(())
    }

    pub fn handle_resize_over(engine: &mut Engine, id: WindowId) -> Result<(), EngineError> {
        let idx = engine.index(id)?;
        let window = &mut engine.windows[idx];
        window.flags.remove(WindowFlags::RESIZING);
        window.actual_geometry = window.host.geometry();
        match window.state() {
            WindowState::Tiled => {
                if engine.config.settings.adjust_layout {
                    engine.adjust_layout(idx)?;
                }
                engine.arrange_window(idx);
            }
            WindowState::Floating => window.geometry = window.actual_geometry,
            _ => {}
        }
        Ok(())
    }
}
