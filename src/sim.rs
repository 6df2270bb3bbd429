//! In-process host used by the tests and the `replay` command.
//!
//! [`SimWindow`] and [`SimHost`] are cheap handles over shared state. Like a
//! real binding they call back into the controller synchronously: every
//! commit reports a geometry change and every activation reports a focus
//! change, so re-entrancy is exercised on every arrange.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::common::config::Config;
use crate::controller::Controller;
use crate::engine::Engine;
use crate::geometry::{Rect, Size};
use crate::host::{Host, HostWindow};
use crate::layout_engine::Action;
use crate::model::{MemoryStore, WindowId, WindowState};

#[derive(Debug)]
struct WindowData {
    id: WindowId,
    geometry: Rect,
    desktop: u32,
    all_desktops: bool,
    screen: usize,
    activities: Vec<String>,
    minimized: bool,
    maximized: bool,
    shaded: bool,
    fullscreen: bool,
    manageable: bool,
    class: String,
    title: String,
    role: String,
    special: bool,
    resizable: bool,
    min_size: Size,
    max_size: Size,
    commits: Vec<Rect>,
    keep_above: Option<bool>,
    controller: Weak<Controller>,
}

#[derive(Debug, Clone)]
pub struct SimWindow(Rc<RefCell<WindowData>>);

impl SimWindow {
    pub fn new(id: u64, geometry: Rect) -> Self {
        SimWindow(Rc::new(RefCell::new(WindowData {
            id: WindowId::new(id),
            geometry,
            desktop: 1,
            all_desktops: false,
            screen: 0,
            activities: Vec::new(),
            minimized: false,
            maximized: false,
            shaded: false,
            fullscreen: false,
            manageable: true,
            class: String::new(),
            title: String::new(),
            role: String::new(),
            special: false,
            resizable: true,
            min_size: Size::default(),
            max_size: Size::default(),
            commits: Vec::new(),
            keep_above: None,
            controller: Weak::new(),
        })))
    }

    fn edit(self, f: impl FnOnce(&mut WindowData)) -> Self {
        f(&mut self.0.borrow_mut());
        self
    }

    pub fn with_class(self, class: &str) -> Self { self.edit(|w| w.class = class.to_string()) }

    pub fn with_title(self, title: &str) -> Self { self.edit(|w| w.title = title.to_string()) }

    pub fn with_role(self, role: &str) -> Self { self.edit(|w| w.role = role.to_string()) }

    pub fn with_size_limits(self, min: Size, max: Size) -> Self {
        self.edit(|w| {
            w.min_size = min;
            w.max_size = max;
        })
    }

    pub fn as_special(self) -> Self { self.edit(|w| w.special = true) }

    pub fn non_resizable(self) -> Self { self.edit(|w| w.resizable = false) }

    pub fn on_desktop(self, desktop: u32) -> Self { self.edit(|w| w.desktop = desktop) }

    pub fn on_screen(self, screen: usize) -> Self { self.edit(|w| w.screen = screen) }

    pub fn on_every_desktop(self) -> Self { self.edit(|w| w.all_desktops = true) }

    pub fn in_activities(self, activities: &[&str]) -> Self {
        self.edit(|w| w.activities = activities.iter().map(|a| a.to_string()).collect())
    }

    /// Reports commits back to `controller` from now on.
    pub fn attach(&self, controller: &Rc<Controller>) {
        self.0.borrow_mut().controller = Rc::downgrade(controller);
    }

    pub fn set_geometry(&self, geometry: Rect) { self.0.borrow_mut().geometry = geometry; }

    pub fn set_minimized(&self, minimized: bool) { self.0.borrow_mut().minimized = minimized; }

    pub fn set_maximized(&self, maximized: bool) { self.0.borrow_mut().maximized = maximized; }

    pub fn set_shaded(&self, shaded: bool) { self.0.borrow_mut().shaded = shaded; }

    pub fn set_desktop(&self, desktop: u32) { self.0.borrow_mut().desktop = desktop; }

    pub fn set_screen(&self, screen: usize) { self.0.borrow_mut().screen = screen; }

    pub fn set_manageable(&self, manageable: bool) { self.0.borrow_mut().manageable = manageable; }

    /// Every geometry committed so far, oldest first.
    pub fn commits(&self) -> Vec<Rect> { self.0.borrow().commits.clone() }

    pub fn keep_above(&self) -> Option<bool> { self.0.borrow().keep_above }
}

impl HostWindow for SimWindow {
    fn id(&self) -> WindowId { self.0.borrow().id }

    fn geometry(&self) -> Rect { self.0.borrow().geometry }

    fn desktop(&self) -> u32 { self.0.borrow().desktop }

    fn on_all_desktops(&self) -> bool { self.0.borrow().all_desktops }

    fn screen(&self) -> usize { self.0.borrow().screen }

    fn activities(&self) -> Vec<String> { self.0.borrow().activities.clone() }

    fn minimized(&self) -> bool { self.0.borrow().minimized }

    fn maximized(&self) -> bool { self.0.borrow().maximized }

    fn shaded(&self) -> bool { self.0.borrow().shaded }

    fn fullscreen(&self) -> bool { self.0.borrow().fullscreen }

    fn manageable(&self) -> bool { self.0.borrow().manageable }

    fn resource_class(&self) -> String { self.0.borrow().class.clone() }

    fn title(&self) -> String { self.0.borrow().title.clone() }

    fn role(&self) -> String { self.0.borrow().role.clone() }

    fn special(&self) -> bool { self.0.borrow().special }

    fn resizable(&self) -> bool { self.0.borrow().resizable }

    fn min_size(&self) -> Size { self.0.borrow().min_size }

    fn max_size(&self) -> Size { self.0.borrow().max_size }

    fn commit(&self, geometry: Rect, keep_above: Option<bool>) {
        let (id, controller) = {
            let mut data = self.0.borrow_mut();
            data.geometry = geometry;
            data.commits.push(geometry);
            if keep_above.is_some() {
                data.keep_above = keep_above;
            }
            (data.id, data.controller.upgrade())
        };
        if let Some(controller) = controller {
            controller.on_window_geometry_changed(id);
        }
    }
}

#[derive(Debug)]
struct HostData {
    screens: Vec<Rect>,
    current_screen: usize,
    current_desktop: u32,
    desktop_count: u32,
    current_activity: String,
    active: Option<WindowId>,
    notifications: Vec<String>,
    windows: BTreeMap<WindowId, SimWindow>,
    controller: Weak<Controller>,
}

#[derive(Debug, Clone)]
pub struct SimHost(Rc<RefCell<HostData>>);

impl SimHost {
    pub fn new(screens: Vec<Rect>) -> Self {
        SimHost(Rc::new(RefCell::new(HostData {
            screens,
            current_screen: 0,
            current_desktop: 1,
            desktop_count: 4,
            current_activity: "default".to_string(),
            active: None,
            notifications: Vec::new(),
            windows: BTreeMap::new(),
            controller: Weak::new(),
        })))
    }

    pub fn attach(&self, controller: &Rc<Controller>) {
        self.0.borrow_mut().controller = Rc::downgrade(controller);
    }

    /// Makes `window` known to `move_window`.
    pub fn track(&self, window: &SimWindow) {
        self.0.borrow_mut().windows.insert(window.id(), window.clone());
    }

    pub fn window(&self, id: WindowId) -> Option<SimWindow> { self.0.borrow().windows.get(&id).cloned() }

    pub fn set_current_desktop(&self, desktop: u32) { self.0.borrow_mut().current_desktop = desktop; }

    pub fn set_current_activity(&self, activity: &str) {
        self.0.borrow_mut().current_activity = activity.to_string();
    }

    pub fn set_current_screen(&self, screen: usize) { self.0.borrow_mut().current_screen = screen; }

    pub fn active(&self) -> Option<WindowId> { self.0.borrow().active }

    pub fn notifications(&self) -> Vec<String> { self.0.borrow().notifications.clone() }
}

impl Host for SimHost {
    fn screen_count(&self) -> usize { self.0.borrow().screens.len() }

    fn working_area(&self, screen: usize) -> Option<Rect> { self.0.borrow().screens.get(screen).copied() }

    fn current_desktop(&self) -> u32 { self.0.borrow().current_desktop }

    fn desktop_count(&self) -> u32 { self.0.borrow().desktop_count }

    fn current_activity(&self) -> String { self.0.borrow().current_activity.clone() }

    fn current_screen(&self) -> usize { self.0.borrow().current_screen }

    fn active_window(&self) -> Option<WindowId> { self.0.borrow().active }

    fn set_active_window(&self, window: WindowId) {
        let controller = {
            let mut data = self.0.borrow_mut();
            data.active = Some(window);
            data.controller.upgrade()
        };
        if let Some(controller) = controller {
            controller.on_window_focus_changed(Some(window));
        }
    }

    fn move_window(&self, window: WindowId, desktop: u32, screen: usize) {
        match self.window(window) {
            Some(sim) => {
                sim.set_desktop(desktop);
                sim.set_screen(screen);
            }
            None => warn!(%window, "move requested for unknown window"),
        }
    }

    fn show_notification(&self, text: &str) {
        debug!(text, "notification");
        self.0.borrow_mut().notifications.push(text.to_string());
    }
}

/// A controller wired to a simulated host and an in-memory store.
pub struct Sim {
    pub host: SimHost,
    pub store: MemoryStore,
    pub controller: Rc<Controller>,
}

pub const DEFAULT_SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

impl Sim {
    pub fn new(config: Config) -> Self { Self::with_store(config, MemoryStore::new()) }

    /// A fresh controller over existing persisted state, as after a restart.
    pub fn with_store(config: Config, store: MemoryStore) -> Self {
        Self::with_screens(config, store, vec![DEFAULT_SCREEN])
    }

    pub fn with_screens(config: Config, store: MemoryStore, screens: Vec<Rect>) -> Self {
        let host = SimHost::new(screens);
        let engine = Engine::new(config, Box::new(host.clone()), Box::new(store.clone()));
        let controller = Rc::new(Controller::new(engine));
        host.attach(&controller);
        Self { host, store, controller }
    }

    /// Hands a window to the controller and returns the handle back.
    pub fn add(&self, window: SimWindow) -> SimWindow {
        self.host.track(&window);
        window.attach(&self.controller);
        self.controller.on_window_added(Box::new(window.clone()));
        window
    }

    /// Activates a window the way a user click would.
    pub fn focus(&self, id: u64) { self.host.set_active_window(WindowId::new(id)); }

    /// Managed windows in tiling order.
    pub fn order(&self) -> Vec<WindowId> {
        self.controller
            .with_engine(|engine| engine.windows().map(|w| w.id).collect())
            .unwrap_or_default()
    }

    /// Engine-side state of a window; `Unmanaged` for unknown windows.
    pub fn state(&self, id: u64) -> WindowState {
        self.controller
            .with_engine(|engine| engine.window(WindowId::new(id)).map(|w| w.state()).ok())
            .flatten()
            .unwrap_or(WindowState::Unmanaged)
    }

    /// Geometry the engine wants the window to have.
    pub fn geometry(&self, id: u64) -> Option<Rect> {
        self.controller
            .with_engine(|engine| engine.window(WindowId::new(id)).map(|w| w.geometry).ok())
            .flatten()
    }

    pub fn engine_group(&self, id: u64) -> Option<u32> {
        self.controller
            .with_engine(|engine| engine.window(WindowId::new(id)).ok().and_then(|w| w.group))
            .flatten()
    }

    pub fn run(&self, step: &Step) {
        match step {
            Step::Add(spec) => {
                let mut window = SimWindow::new(spec.id, spec.geometry)
                    .with_class(&spec.class)
                    .with_title(&spec.title)
                    .on_desktop(spec.desktop)
                    .on_screen(spec.screen);
                if spec.special {
                    window = window.as_special();
                }
                self.add(window);
            }
            Step::Remove(id) => self.controller.on_window_removed(WindowId::new(*id)),
            Step::Focus(id) => self.focus(*id),
            Step::Action(action) => self.controller.on_action(action.clone()),
            Step::Shortcut(name) => self.controller.on_shortcut(name),
            Step::Drag { id, to } => self.with_window(*id, |window, id| {
                self.controller.on_window_move_start(id);
                window.set_geometry(*to);
                self.controller.on_window_move(id);
                self.controller.on_window_move_over(id);
            }),
            Step::Resize { id, to } => self.with_window(*id, |window, id| {
                self.controller.on_window_resize_start(id);
                window.set_geometry(*to);
                self.controller.on_window_resize(id);
                self.controller.on_window_resize_over(id);
            }),
            Step::Minimize(id, minimized) => self.with_window(*id, |window, id| {
                window.set_minimized(*minimized);
                self.controller.on_window_changed(id);
            }),
            Step::Maximize(id, maximized) => self.with_window(*id, |window, id| {
                window.set_maximized(*maximized);
                self.controller.on_window_maximize_changed(id, *maximized);
            }),
            Step::SwitchDesktop(desktop) => {
                self.host.set_current_desktop(*desktop);
                self.controller.on_current_desktop_changed();
            }
            Step::SwitchActivity(activity) => {
                self.host.set_current_activity(activity);
                self.controller.on_current_activity_changed();
            }
            Step::Print => {}
        }
    }

    fn with_window(&self, id: u64, f: impl FnOnce(&SimWindow, WindowId)) {
        let id = WindowId::new(id);
        match self.host.window(id) {
            Some(window) => f(&window, id),
            None => warn!(%id, "script refers to unknown window"),
        }
    }
}

/// A scripted session for the `replay` command, written in RON.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default = "default_screens")]
    pub screens: Vec<Rect>,
    pub steps: Vec<Step>,
}

fn default_screens() -> Vec<Rect> { vec![DEFAULT_SCREEN] }

#[derive(Deserialize, Debug)]
pub enum Step {
    Add(WindowSpec),
    Remove(u64),
    Focus(u64),
    Action(Action),
    Shortcut(String),
    /// Interactive move ending at `to`.
    Drag { id: u64, to: Rect },
    /// Interactive resize ending at `to`.
    Resize { id: u64, to: Rect },
    Minimize(u64, bool),
    Maximize(u64, bool),
    SwitchDesktop(u32),
    SwitchActivity(String),
    /// Print the current arrangement.
    Print,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct WindowSpec {
    pub id: u64,
    pub geometry: Rect,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "first_desktop")]
    pub desktop: u32,
    #[serde(default)]
    pub screen: usize,
    #[serde(default)]
    pub special: bool,
}

fn first_desktop() -> u32 { 1 }

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn scripts_parse_and_run() {
        let script: Script = ron::from_str(
            r#"(
                steps: [
                    Add((id: 1, geometry: (x: 0, y: 0, width: 10, height: 10))),
                    Add((id: 2, geometry: (x: 0, y: 0, width: 10, height: 10), class: "konsole")),
                    Focus(2),
                    Action(push_to_master),
                    Shortcut("next_layout"),
                    Drag(id: 1, to: (x: 1000, y: 300, width: 300, height: 300)),
                    Print,
                ],
            )"#,
        )
        .unwrap();
        assert_eq!(script.screens, vec![DEFAULT_SCREEN]);

        let sim = Sim::new(Config::default());
        for step in &script.steps {
            sim.run(step);
        }
        assert_eq!(sim.order(), vec![WindowId::new(2), WindowId::new(1)]);
        // Shortcuts only resolve once registered, so the layout is unchanged.
        assert_eq!(sim.host.notifications(), vec!["Window floating".to_string()]);
        assert_eq!(sim.state(1), WindowState::Floating);
        assert_eq!(sim.geometry(1), Some(Rect::new(1000, 300, 300, 300)));
    }

    #[test]
    fn moves_update_the_window() {
        let host = SimHost::new(vec![DEFAULT_SCREEN]);
        let window = SimWindow::new(3, Rect::new(0, 0, 10, 10));
        host.track(&window);
        host.move_window(WindowId::new(3), 2, 1);
        assert_eq!((window.desktop(), window.screen()), (2, 1));
    }
}
