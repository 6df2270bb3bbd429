use tracing::{debug, instrument, trace, warn};

use crate::engine::{Engine, EngineError};
use crate::geometry::{Rect, RectDelta};
use crate::layout_engine::utils::wrap_index;
use crate::layout_engine::{Action, ActionResponse, Direction, LayoutClass, WindowsLayout};
use crate::model::{Surface, WindowState};

/// Share of the working area a floating window is nudged by.
const MOVE_STEP: f64 = 0.05;
/// Share of the working area a window grows or shrinks by.
const RESIZE_STEP: f64 = 0.03;

pub struct ActionEventHandler;

impl ActionEventHandler {
    /// Offers the action to the current layout first. A layout that handles
    /// it gets its state saved and the surface re-arranged once.
    #[instrument(name = "engine::action", skip_all, fields(action = %action.name()))]
    pub fn handle_action(engine: &mut Engine, action: Action) -> Result<(), EngineError> {
        let Some(surface) = engine.current_surface() else {
            warn!("no current surface");
            return Ok(());
        };
        match engine.current_layout(&surface).execute_action(&action) {
            ActionResponse::Handled => {
                debug!("handled by layout");
                engine.save_layout(&surface)?;
                engine.arrange(&surface);
                Ok(())
            }
            ActionResponse::Redirect(next) => {
                trace!(redirect = %next.name(), "layout redirected action");
                Self::default_effect(engine, &surface, next)
            }
            ActionResponse::Unhandled => Self::default_effect(engine, &surface, action),
        }
    }

    fn default_effect(
        engine: &mut Engine,
        surface: &Surface,
        action: Action,
    ) -> Result<(), EngineError> {
        match action {
            Action::FocusNext => Self::focus_order(engine, surface, 1),
            Action::FocusPrevious => Self::focus_order(engine, surface, -1),
            Action::Focus(direction) => Self::focus_direction(engine, surface, direction),
            Action::MoveNext => Self::swap_order(engine, surface, 1)?,
            Action::MovePrevious => Self::swap_order(engine, surface, -1)?,
            Action::Move(direction) => Self::swap_direction(engine, surface, direction)?,
            Action::IncreaseWidth
            | Action::DecreaseWidth
            | Action::IncreaseHeight
            | Action::DecreaseHeight => Self::resize_active(engine, surface, &action)?,
            Action::ToggleFloating => Self::toggle_floating(engine, surface),
            Action::PushToMaster => Self::push_to_master(engine, surface)?,
            Action::NextLayout => Self::cycle_layout(engine, surface, 1),
            Action::PreviousLayout => Self::cycle_layout(engine, surface, -1),
            Action::ToggleLayout(class) => Self::toggle_layout(engine, surface, class),
            Action::SetSurfaceGroup(group) => Self::set_surface_group(engine, surface, group)?,
            Action::MoveToGroup(group) => Self::move_to_group(engine, group)?,
            Action::IncreaseMasterCount
            | Action::DecreaseMasterCount
            | Action::IncreaseMasterSize
            | Action::DecreaseMasterSize
            | Action::Rotate
            | Action::RotatePart => trace!("action has no effect on this layout"),
        }
        Ok(())
    }

    fn focus_order(engine: &mut Engine, surface: &Surface, step: isize) {
        let visible = engine.visible_on(surface);
        if visible.is_empty() {
            return;
        }
        let active = engine.active_index();
        let next = match visible.iter().position(|&i| Some(i) == active) {
            Some(pos) => visible[wrap_index(pos as isize + step, visible.len())],
            None => visible[0],
        };
        engine.activate(next);
    }

    fn focus_direction(engine: &mut Engine, surface: &Surface, direction: Direction) {
        let tiles = engine.tileable_on(surface);
        let Some(&first) = tiles.first() else {
            return;
        };
        match engine.active_index().filter(|i| tiles.contains(i)) {
            Some(active) => {
                if let Some(next) = engine.neighbor(active, direction, &tiles) {
                    engine.activate(next);
                }
            }
            None => engine.activate(first),
        }
    }

    fn swap_order(engine: &mut Engine, surface: &Surface, step: isize) -> Result<(), EngineError> {
        let tiles = engine.tileable_on(surface);
        let Some(active) = engine.active_index() else {
            return Ok(());
        };
        let Some(pos) = tiles.iter().position(|&i| i == active) else {
            return Ok(());
        };
        let other = tiles[wrap_index(pos as isize + step, tiles.len())];
        if other == active {
            return Ok(());
        }
        engine.windows.swap(active, other);
        engine.persist_order()?;
        engine.arrange(surface);
        Ok(())
    }

    fn swap_direction(
        engine: &mut Engine,
        surface: &Surface,
        direction: Direction,
    ) -> Result<(), EngineError> {
        let Some(active) = engine.active_index() else {
            return Ok(());
        };
        match engine.windows[active].state() {
            WindowState::Floating => {
                Self::move_floating(engine, surface, active, direction);
                Ok(())
            }
            WindowState::Tiled => {
                let tiles = engine.tileable_on(surface);
                let Some(other) = engine.neighbor(active, direction, &tiles) else {
                    return Ok(());
                };
                engine.windows.swap(active, other);
                engine.persist_order()?;
                engine.arrange(surface);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn move_floating(engine: &mut Engine, surface: &Surface, idx: usize, direction: Direction) {
        let area = surface.working_area;
        let dx = (f64::from(area.width) * MOVE_STEP).round() as i32;
        let dy = (f64::from(area.height) * MOVE_STEP).round() as i32;
        let (dx, dy) = match direction {
            Direction::Left => (-dx, 0),
            Direction::Right => (dx, 0),
            Direction::Up => (0, -dy),
            Direction::Down => (0, dy),
        };
        let window = &mut engine.windows[idx];
        window.geometry = window.actual_geometry.translate(dx, dy);
        engine.commit(idx, area);
    }

    /// Tiles resize through the layout, growing toward a neighbour when
    /// there is one and away from the screen edge otherwise. Floating
    /// windows change size directly.
    fn resize_active(
        engine: &mut Engine,
        surface: &Surface,
        action: &Action,
    ) -> Result<(), EngineError> {
        let Some(idx) = engine.active_index() else {
            return Ok(());
        };
        let area = surface.working_area;
        let dx = (f64::from(area.width) * RESIZE_STEP).round();
        let dy = (f64::from(area.height) * RESIZE_STEP).round();
        match engine.windows[idx].state() {
            WindowState::Tiled => {
                let tiles = engine.tileable_on(surface);
                let east = engine.neighbor(idx, Direction::Right, &tiles).is_some();
                let south = engine.neighbor(idx, Direction::Down, &tiles).is_some();
                let delta = match action {
                    Action::IncreaseWidth if east => RectDelta::new(0.0, dx, 0.0, 0.0),
                    Action::IncreaseWidth => RectDelta::new(dx, 0.0, 0.0, 0.0),
                    Action::DecreaseWidth if east => RectDelta::new(0.0, -dx, 0.0, 0.0),
                    Action::DecreaseWidth => RectDelta::new(-dx, 0.0, 0.0, 0.0),
                    Action::IncreaseHeight if south => RectDelta::new(0.0, 0.0, 0.0, dy),
                    Action::IncreaseHeight => RectDelta::new(0.0, 0.0, dy, 0.0),
                    Action::DecreaseHeight if south => RectDelta::new(0.0, 0.0, 0.0, -dy),
                    Action::DecreaseHeight => RectDelta::new(0.0, 0.0, -dy, 0.0),
                    _ => return Ok(()),
                };
                engine.adjust_layout_by(idx, delta)
            }
            WindowState::Floating => {
                let (dx, dy) = (dx as i32, dy as i32);
                let window = &mut engine.windows[idx];
                let g = window.actual_geometry;
                window.geometry = match action {
                    Action::IncreaseWidth => Rect::new(g.x, g.y, g.width + dx, g.height),
                    Action::DecreaseWidth => Rect::new(g.x, g.y, (g.width - dx).max(1), g.height),
                    Action::IncreaseHeight => Rect::new(g.x, g.y, g.width, g.height + dy),
                    Action::DecreaseHeight => Rect::new(g.x, g.y, g.width, (g.height - dy).max(1)),
                    _ => g,
                };
                engine.commit(idx, area);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn toggle_floating(engine: &mut Engine, surface: &Surface) {
        let Some(idx) = engine.active_index() else {
            return;
        };
        let window = &mut engine.windows[idx];
        match window.state() {
            WindowState::Tiled => window.set_state(WindowState::Floating),
            WindowState::Floating => window.set_state(WindowState::Tiled),
            _ => return,
        }
        debug!(window = %window.id, state = ?window.state(), "toggled floating");
        engine.arrange(surface);
    }

    fn push_to_master(engine: &mut Engine, surface: &Surface) -> Result<(), EngineError> {
        let Some(idx) = engine.active_index() else {
            return Ok(());
        };
        if idx == 0 || !engine.windows[idx].is_tileable() {
            return Ok(());
        }
        let window = engine.windows.remove(idx);
        engine.windows.insert(0, window);
        engine.persist_order()?;
        engine.arrange(surface);
        Ok(())
    }

    fn cycle_layout(engine: &mut Engine, surface: &Surface, step: isize) {
        let key = engine.surface_key(surface);
        let description = engine.layouts.cycle(engine.store.as_mut(), &key, step).description();
        engine.host.show_notification(&description);
        engine.arrange(surface);
    }

    fn toggle_layout(engine: &mut Engine, surface: &Surface, class: LayoutClass) {
        let key = engine.surface_key(surface);
        let description = engine.layouts.toggle(engine.store.as_mut(), &key, class).description();
        engine.host.show_notification(&description);
        engine.arrange(surface);
    }

    /// Rebinds the surface to `group`; the windows on it follow.
    fn set_surface_group(
        engine: &mut Engine,
        surface: &Surface,
        group: u32,
    ) -> Result<(), EngineError> {
        let visible = engine.visible_on(surface);
        engine.groups.set(engine.store.as_mut(), surface.desktop, surface.screen, group)?;
        for idx in visible {
            let window = &mut engine.windows[idx];
            if window.on_all_desktops() {
                continue;
            }
            window.group = Some(group);
            window.group_origin = Some((surface.desktop, surface.screen));
            engine.persist_window(idx)?;
        }
        debug!(desktop = surface.desktop, screen = surface.screen, group, "surface group set");
        engine.host.show_notification(&format!("Group {group}"));
        engine.arrange_all();
        Ok(())
    }

    /// Sends the active window to the surface currently showing `group`.
    fn move_to_group(engine: &mut Engine, group: u32) -> Result<(), EngineError> {
        let Some(idx) = engine.active_index() else {
            return Ok(());
        };
        let desktops = engine.host.desktop_count();
        let screens = engine.host.screen_count();
        let Some((desktop, screen)) =
            engine.groups.locate(engine.store.as_mut(), group, desktops, screens)
        else {
            debug!(group, "group is not shown on any surface");
            engine.host.show_notification(&format!("Group {group} is not on any desktop"));
            return Ok(());
        };
        let window = &mut engine.windows[idx];
        window.group = Some(group);
        window.group_origin = Some((desktop, screen));
        let id = window.id;
        engine.host.move_window(id, desktop, screen);
        engine.persist_window(idx)?;
        engine.arrange_all();
        Ok(())
    }
}
