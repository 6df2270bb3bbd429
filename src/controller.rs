//! Entry point for host notifications.
//!
//! Hosts deliver notifications synchronously and may do so from inside a
//! call the engine is making (a commit triggering a geometry change, focus
//! triggering a focus notification). Those nested notifications are dropped,
//! not queued: only one handler runs at a time and the engine state is
//! always settled when the next one starts.

mod events;

use std::cell::{Cell, RefCell};

pub use events::Event;
use tracing::{debug, error, instrument, trace, warn};

use crate::common::collections::HashMap;
use crate::engine::events::{ActionEventHandler, InteractionEventHandler, WindowEventHandler};
use crate::engine::{Engine, EngineError};
use crate::host::{HostWindow, ShortcutRegistry};
use crate::layout_engine::Action;
use crate::model::{Surface, WindowId};

pub struct Controller {
    handling: Cell<bool>,
    dropped: Cell<u64>,
    shut_down: Cell<bool>,
    engine: RefCell<Engine>,
    shortcuts: RefCell<HashMap<String, Action>>,
}

/// Clears the handling flag however the handler exits.
struct HandlingGuard<'a>(&'a Cell<bool>);

impl<'a> HandlingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        HandlingGuard(flag)
    }
}

impl Drop for HandlingGuard<'_> {
    fn drop(&mut self) { self.0.set(false); }
}

impl Controller {
    pub fn new(engine: Engine) -> Self {
        Self {
            handling: Cell::new(false),
            dropped: Cell::new(0),
            shut_down: Cell::new(false),
            engine: RefCell::new(engine),
            shortcuts: RefCell::new(HashMap::default()),
        }
    }

    pub fn handle_event(&self, event: Event) {
        if self.shut_down.get() {
            trace!(?event, "controller shut down, ignoring event");
            return;
        }
        if self.handling.get() {
            self.dropped.set(self.dropped.get() + 1);
            trace!(?event, "dropping re-entrant event");
            return;
        }
        let _guard = HandlingGuard::enter(&self.handling);
        let mut engine = self.engine.borrow_mut();
        match Self::dispatch(&mut engine, event) {
            Ok(()) => {}
            Err(EngineError::UnknownWindow(id)) => debug!(window = %id, "event for unmanaged window"),
            Err(err) => error!(%err, "event handler failed"),
        }
    }

    #[instrument(name = "controller::handle_event", skip(engine), fields(event = ?event))]
    fn dispatch(engine: &mut Engine, event: Event) -> Result<(), EngineError> {
        match event {
            Event::WindowAdded(window) => WindowEventHandler::handle_window_added(engine, window),
            Event::WindowRemoved(id) => WindowEventHandler::handle_window_removed(engine, id),
            Event::WindowMaximizeChanged(id, maximized) => {
                WindowEventHandler::handle_maximize_changed(engine, id, maximized)
            }
            Event::WindowMoveStart(id) => InteractionEventHandler::handle_move_start(engine, id),
            Event::WindowMove(id) => InteractionEventHandler::handle_move(engine, id),
            Event::WindowMoveOver(id) => InteractionEventHandler::handle_move_over(engine, id),
            Event::WindowResizeStart(id) => InteractionEventHandler::handle_resize_start(engine, id),
            Event::WindowResize(id) => InteractionEventHandler::handle_resize(engine, id),
            Event::WindowResizeOver(id) => InteractionEventHandler::handle_resize_over(engine, id),
            Event::WindowFocusChanged(id) => WindowEventHandler::handle_focus_changed(engine, id),
            Event::WindowScreenChanged(id) => WindowEventHandler::handle_screen_changed(engine, id),
            Event::WindowGeometryChanged(id) => {
                WindowEventHandler::handle_geometry_changed(engine, id)
            }
            Event::WindowShadeChanged(id) => WindowEventHandler::handle_shade_changed(engine, id),
            Event::WindowChanged(id) => WindowEventHandler::handle_window_changed(engine, id),
            Event::CurrentActivityChanged
            | Event::CurrentDesktopChanged
            | Event::NumberDesktopsChanged
            | Event::ArrangeAll => {
                engine.arrange_all();
                Ok(())
            }
            Event::Arrange(surface) => {
                engine.arrange(&surface);
                Ok(())
            }
            Event::Action(action) => ActionEventHandler::handle_action(engine, action),
        }
    }

    /// Notifications dropped because another handler was running.
    pub fn dropped_events(&self) -> u64 { self.dropped.get() }

    pub fn is_shut_down(&self) -> bool { self.shut_down.get() }

    /// Read access to the engine between notifications. `None` while a
    /// handler is running.
    pub fn with_engine<R>(&self, f: impl FnOnce(&Engine) -> R) -> Option<R> {
        if self.handling.get() {
            return None;
        }
        self.engine.try_borrow().ok().map(|engine| f(&engine))
    }

    /// ASCII drawing of the current surface's layout.
    pub fn draw_tree(&self) -> Option<String> {
        if self.handling.get() {
            return None;
        }
        self.engine.try_borrow_mut().ok()?.draw_tree()
    }

    /// Registers every bindable action under its name.
    pub fn register_shortcuts(&self, registry: &mut dyn ShortcutRegistry) {
        let groups = self
            .with_engine(|engine| engine.config().settings.group_shortcuts)
            .unwrap_or_default();
        let mut shortcuts = self.shortcuts.borrow_mut();
        for action in Action::bindable(groups) {
            let name = action.name();
            registry.register(&name, action.clone());
            shortcuts.insert(name, action);
        }
        debug!(count = shortcuts.len(), "registered shortcuts");
    }

    pub fn on_shortcut(&self, name: &str) {
        let action = self.shortcuts.borrow().get(name).cloned();
        match action {
            Some(action) => self.on_action(action),
            None => warn!(name, "unknown shortcut"),
        }
    }

    /// Drops every managed window and stops handling notifications.
    /// Repeated calls are harmless.
    pub fn shutdown(&self) {
        if self.shut_down.replace(true) {
            trace!("already shut down");
            return;
        }
        self.shortcuts.borrow_mut().clear();
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.shutdown(),
            Err(_) => warn!("shutdown requested from inside a handler"),
        }
        debug!("controller shut down");
    }

    pub fn on_window_added(&self, window: Box<dyn HostWindow>) {
        self.handle_event(Event::WindowAdded(window));
    }

    pub fn on_window_removed(&self, id: WindowId) { self.handle_event(Event::WindowRemoved(id)); }

    pub fn on_window_maximize_changed(&self, id: WindowId, maximized: bool) {
        self.handle_event(Event::WindowMaximizeChanged(id, maximized));
    }

    pub fn on_window_move_start(&self, id: WindowId) {
        self.handle_event(Event::WindowMoveStart(id));
    }

    pub fn on_window_move(&self, id: WindowId) { self.handle_event(Event::WindowMove(id)); }

    pub fn on_window_move_over(&self, id: WindowId) {
        self.handle_event(Event::WindowMoveOver(id));
    }

    pub fn on_window_resize_start(&self, id: WindowId) {
        self.handle_event(Event::WindowResizeStart(id));
    }

    pub fn on_window_resize(&self, id: WindowId) { self.handle_event(Event::WindowResize(id)); }

    pub fn on_window_resize_over(&self, id: WindowId) {
        self.handle_event(Event::WindowResizeOver(id));
    }

    pub fn on_window_focus_changed(&self, id: Option<WindowId>) {
        self.handle_event(Event::WindowFocusChanged(id));
    }

    pub fn on_window_screen_changed(&self, id: WindowId) {
        self.handle_event(Event::WindowScreenChanged(id));
    }

    pub fn on_window_geometry_changed(&self, id: WindowId) {
        self.handle_event(Event::WindowGeometryChanged(id));
    }

    pub fn on_window_shade_changed(&self, id: WindowId) {
        self.handle_event(Event::WindowShadeChanged(id));
    }

    pub fn on_window_changed(&self, id: WindowId) { self.handle_event(Event::WindowChanged(id)); }

    pub fn on_current_activity_changed(&self) { self.handle_event(Event::CurrentActivityChanged); }

    pub fn on_current_desktop_changed(&self) { self.handle_event(Event::CurrentDesktopChanged); }

    pub fn on_number_desktops_changed(&self) { self.handle_event(Event::NumberDesktopsChanged); }

    pub fn on_action(&self, action: Action) { self.handle_event(Event::Action(action)); }

    pub fn arrange(&self, surface: Surface) { self.handle_event(Event::Arrange(surface)); }

    pub fn arrange_all(&self) { self.handle_event(Event::ArrangeAll); }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::common::config::Config;
    use crate::geometry::Rect;
    use crate::layout_engine::LayoutState;
    use crate::model::Store;
    use crate::sim::{Sim, SimWindow};

    fn id(id: u64) -> WindowId { WindowId::new(id) }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ShortcutRegistry for Recorder {
        fn register(&mut self, name: &str, _action: Action) { self.0.push(name.to_string()); }
    }

    #[test]
    fn reentrant_notifications_are_dropped() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        // The commit made while arranging echoed a geometry change back.
        assert!(sim.controller.dropped_events() >= 1);
        assert_eq!(a.commits(), vec![Rect::new(0, 0, 1920, 1080)]);

        let before = sim.controller.dropped_events();
        sim.controller.on_action(Action::FocusNext);
        // Activation echoed a focus change back.
        assert_eq!(sim.controller.dropped_events(), before + 1);
        assert_eq!(sim.host.active(), Some(id(1)));
    }

    #[test]
    fn master_count_change_rearranges_once() {
        let sim = Sim::new(Config::default());
        let windows: Vec<_> =
            (1..=3).map(|i| sim.add(SimWindow::new(i, Rect::new(0, 0, 100, 100)))).collect();
        let before: Vec<usize> = windows.iter().map(|w| w.commits().len()).collect();

        sim.controller.on_action(Action::IncreaseMasterCount);

        for (window, before) in windows.iter().zip(before) {
            assert_eq!(window.commits().len(), before + 1);
        }
        assert_eq!(windows[0].geometry(), Rect::new(0, 0, 960, 540));
        assert_eq!(windows[1].geometry(), Rect::new(0, 540, 960, 540));
        assert_eq!(windows[2].geometry(), Rect::new(960, 0, 960, 1080));
        assert_eq!(
            sim.store.get("layout/0@default#0/tile").as_deref(),
            Some(r#"{"classID":"tile","rotation":0,"partRotation":0,"numMasterTiles":2,"masterRatio":0.5}"#)
        );
    }

    #[test]
    fn master_count_is_bounded() {
        let sim = Sim::new(Config::default());
        sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        for _ in 0..12 {
            sim.controller.on_action(Action::IncreaseMasterCount);
        }
        let raw = sim.store.get("layout/0@default#0/tile").unwrap();
        let state: LayoutState = serde_json::from_str(&raw).unwrap();
        assert_eq!(state.num_master_tiles, 10);
    }

    #[test]
    fn ignored_windows_are_never_arranged() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        let runner = sim.add(SimWindow::new(2, Rect::new(5, 5, 50, 50)).with_class("krunner"));
        sim.controller.arrange_all();
        assert_eq!(runner.commits(), vec![]);
        assert_eq!(a.geometry(), Rect::new(0, 0, 1920, 1080));
        assert_eq!(sim.order(), vec![id(1)]);
        assert_eq!(sim.store.get("window/2"), None);
    }

    #[test]
    fn arrange_is_idempotent() {
        let sim = Sim::new(Config::default());
        let windows: Vec<_> =
            (1..=4).map(|i| sim.add(SimWindow::new(i, Rect::new(0, 0, 100, 100)))).collect();
        sim.controller.arrange_all();
        let first: Vec<Rect> = windows.iter().map(SimWindow::geometry).collect();
        sim.controller.arrange_all();
        let second: Vec<Rect> = windows.iter().map(SimWindow::geometry).collect();
        assert_eq!(first, second);
        for window in &windows {
            let commits = window.commits();
            let n = commits.len();
            assert_eq!(commits[n - 1], commits[n - 2]);
        }
    }

    #[test]
    fn failing_handlers_release_the_guard() {
        let sim = Sim::new(Config::default());
        sim.controller.on_window_geometry_changed(id(99));
        sim.controller.on_window_move_over(id(99));
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        assert_eq!(a.geometry(), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn desktop_switch_arranges_the_new_desktop() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        let b = sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)).on_desktop(2));
        assert_eq!(a.geometry(), Rect::new(0, 0, 1920, 1080));
        let before = b.commits().len();
        sim.host.set_current_desktop(2);
        sim.controller.on_current_desktop_changed();
        assert_eq!(b.commits().len(), before + 1);
        assert_eq!(b.geometry(), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn shortcuts_dispatch_actions() {
        let sim = Sim::new(Config::default());
        let mut recorder = Recorder::default();
        sim.controller.register_shortcuts(&mut recorder);
        assert!(recorder.0.contains(&"toggle_monocle_layout".to_string()));
        assert!(recorder.0.contains(&"move_to_group_10".to_string()));

        sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        sim.controller.on_shortcut("focus_next");
        assert_eq!(sim.host.active(), Some(id(1)));
        sim.controller.on_shortcut("no_such_shortcut");
    }

    #[test]
    fn shutdown_is_repeatable() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        sim.controller.shutdown();
        sim.controller.shutdown();
        assert!(sim.controller.is_shut_down());
        assert_eq!(sim.controller.with_engine(|e| e.windows().count()), Some(0));

        let commits = a.commits().len();
        sim.controller.arrange_all();
        sim.controller.on_window_removed(id(1));
        assert_eq!(a.commits().len(), commits);
    }
}
