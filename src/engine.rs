//! Window bookkeeping and arrangement.
//!
//! The engine owns every managed [`Window`], the per-surface layouts and the
//! group registry. It never re-enters itself: host calls made from here may
//! call back into the controller, which drops them.

mod error;
pub mod events;

pub use error::EngineError;
use tracing::{debug, instrument, trace, warn};

use crate::common::config::Config;
use crate::geometry::{Rect, RectDelta};
use crate::host::{Host, HostWindow};
use crate::layout_engine::{Direction, Layout, LayoutStore, Tile, WindowsLayout};
use crate::model::persist::{self, PersistedWindow, Store, WINDOW_LIST_KEY, window_key};
use crate::model::{GroupRegistry, Surface, SurfaceKey, Window, WindowFlags, WindowId, WindowState};
use crate::rules::WindowRules;

pub struct Engine {
    config: Config,
    rules: WindowRules,
    host: Box<dyn Host>,
    store: Box<dyn Store>,
    /// Managed windows in tiling order.
    windows: Vec<Window>,
    layouts: LayoutStore,
    groups: GroupRegistry,
    focus_clock: u64,
    /// Last persisted window order, including windows not yet re-added.
    saved_order: Vec<WindowId>,
}

impl Engine {
    pub fn new(config: Config, host: Box<dyn Host>, store: Box<dyn Store>) -> Self {
        let saved_order = persist::load(store.as_ref(), WINDOW_LIST_KEY).unwrap_or_default();
        Self {
            rules: WindowRules::new(&config.rules),
            layouts: LayoutStore::new(config.layout.clone()),
            groups: GroupRegistry::new(config.settings.screen_order.clone()),
            config,
            host,
            store,
            windows: Vec::new(),
            focus_clock: 0,
            saved_order,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn host(&self) -> &dyn Host { self.host.as_ref() }

    pub fn windows(&self) -> impl Iterator<Item = &Window> { self.windows.iter() }

    pub fn window(&self, id: WindowId) -> Result<&Window, EngineError> {
        self.index(id).map(|idx| &self.windows[idx])
    }

    fn index(&self, id: WindowId) -> Result<usize, EngineError> {
        self.windows
            .iter()
            .position(|w| w.id == id)
            .ok_or(EngineError::UnknownWindow(id))
    }

    fn active_index(&self) -> Option<usize> {
        let active = self.host.active_window()?;
        self.windows.iter().position(|w| w.id == active)
    }

    // Surfaces

    /// Resolves a surface, falling back to the current screen when `screen`
    /// no longer exists.
    fn surface(&mut self, screen: usize, desktop: u32, activity: &str) -> Option<Surface> {
        let (screen, working_area) = match self.host.working_area(screen) {
            Some(area) => (screen, area),
            None => {
                let fallback = self.host.current_screen();
                warn!(screen, fallback, "screen out of range");
                (fallback, self.host.working_area(fallback)?)
            }
        };
        let group = self.groups.get(self.store.as_mut(), desktop, screen);
        Some(Surface {
            screen,
            desktop,
            activity: activity.to_string(),
            group,
            working_area,
            ignore: self.rules.ignores_surface(screen, activity),
        })
    }

    pub fn current_surface(&mut self) -> Option<Surface> {
        let screen = self.host.current_screen();
        let desktop = self.host.current_desktop();
        let activity = self.host.current_activity();
        self.surface(screen, desktop, &activity)
    }

    /// Every screen showing the current desktop and activity.
    pub fn visible_surfaces(&mut self) -> Vec<Surface> {
        let desktop = self.host.current_desktop();
        let activity = self.host.current_activity();
        (0..self.host.screen_count())
            .filter_map(|screen| self.surface(screen, desktop, &activity))
            .collect()
    }

    fn window_surface(&mut self, idx: usize) -> Option<Surface> {
        let current_desktop = self.host.current_desktop();
        let current_activity = self.host.current_activity();
        let window = &self.windows[idx];
        let screen = window.host.screen();
        let desktop = if window.on_all_desktops() {
            current_desktop
        } else {
            window.host.desktop()
        };
        let activities = window.host.activities();
        let activity = if activities.is_empty() || activities.contains(&current_activity) {
            current_activity
        } else {
            activities[0].clone()
        };
        self.surface(screen, desktop, &activity)
    }

    fn surface_key(&self, surface: &Surface) -> SurfaceKey {
        let settings = &self.config.settings;
        surface.key(settings.layout_per_activity, settings.layout_per_desktop)
    }

    fn layout_area(&self, surface: &Surface) -> Rect {
        let gaps = &self.config.layout.gaps.outer;
        surface.working_area.gap(gaps.left, gaps.right, gaps.top, gaps.bottom)
    }

    fn current_layout(&mut self, surface: &Surface) -> &mut Layout {
        let key = self.surface_key(surface);
        self.layouts.current(self.store.as_ref(), &key, surface.ignore)
    }

    /// The host's screen index, or the current screen if that index does
    /// not exist.
    fn resolve_screen(&self, screen: usize) -> usize {
        if screen < self.host.screen_count() {
            screen
        } else {
            self.host.current_screen()
        }
    }

    /// Windows shown on `surface`, in tiling order.
    fn visible_on(&self, surface: &Surface) -> Vec<usize> {
        (0..self.windows.len())
            .filter(|&i| {
                let window = &self.windows[i];
                let screen = self.resolve_screen(window.host.screen());
                window.is_managed() && window.is_visible_on(surface, screen)
            })
            .collect()
    }

    /// Windows the layout places on `surface`, in tiling order.
    fn tileable_on(&self, surface: &Surface) -> Vec<usize> {
        self.visible_on(surface)
            .into_iter()
            .filter(|&i| self.windows[i].is_tileable() && !self.windows[i].host.shaded())
            .collect()
    }

    fn tiles(&self, indices: &[usize], key: &SurfaceKey) -> Vec<Tile> {
        indices
            .iter()
            .map(|&i| {
                let window = &self.windows[i];
                Tile {
                    id: window.id,
                    geometry: window.actual_geometry,
                    weight: window.weight(key),
                    state: window.state(),
                }
            })
            .collect()
    }

    // Lifecycle

    /// Starts managing a host window. Returns the surface that needs a
    /// re-arrange, or `None` if the window was rejected.
    #[instrument(level = "debug", skip_all, fields(window = %host.id()))]
    pub fn manage(&mut self, host: Box<dyn HostWindow>) -> Result<Option<Surface>, EngineError> {
        let id = host.id();
        if self.index(id).is_ok() {
            debug!("window already managed");
            return Ok(None);
        }
        if !host.manageable() {
            debug!("window is not manageable");
            return Ok(None);
        }
        if self.rules.should_ignore(host.as_ref()) {
            debug!(class = host.resource_class(), "window ignored by rules");
            return Ok(None);
        }

        // Persisted flags hold until the host reports a change.
        let persisted: PersistedWindow =
            persist::load(self.store.as_ref(), &window_key(id)).unwrap_or_default();
        let mut window = Window::new(host);
        if self.rules.should_float(window.host.as_ref()) {
            window.flags |= WindowFlags::SHOULD_FLOAT;
        }
        if window.host.on_all_desktops() || persisted.all_desktops {
            window.flags |= WindowFlags::ALL_DESKTOPS;
        }
        let desktop = if window.on_all_desktops() {
            self.host.current_desktop()
        } else {
            window.host.desktop()
        };
        let screen = self.resolve_screen(window.host.screen());
        let group = match persisted.group {
            Some(group) => group,
            None => self.groups.get(self.store.as_mut(), desktop, screen),
        };
        window.group = Some(group);
        window.group_origin = Some((desktop, screen));

        window.set_state(if window.should_float() {
            WindowState::Floating
        } else {
            WindowState::Tiled
        });
        if window.host.minimized() || persisted.minimized {
            window.set_state(WindowState::Minimized);
        } else if window.host.maximized() || window.host.fullscreen() {
            window.set_state(WindowState::Maximized);
        }
        debug!(state = ?window.state(), group, "managing window");

        let position = self.insert_position(id);
        self.windows.insert(position, window);
        self.persist_window(position)?;
        self.persist_order()?;
        Ok(self.window_surface(position))
    }

    /// Stops managing a window. Returns the surface it was on.
    pub fn unmanage(&mut self, id: WindowId) -> Result<Option<Surface>, EngineError> {
        let idx = self.index(id)?;
        let surface = self.window_surface(idx);
        let mut window = self.windows.remove(idx);
        window.set_state(WindowState::Unmanaged);
        self.saved_order.retain(|w| *w != id);
        self.persist_order()?;
        debug!(window = %id, "window unmanaged");
        Ok(surface)
    }

    /// Drops every managed window without touching the store.
    pub fn shutdown(&mut self) {
        debug!(windows = self.windows.len(), "dropping managed windows");
        self.windows.clear();
    }

    fn insert_position(&self, id: WindowId) -> usize {
        if self.config.settings.new_window_as_master {
            return 0;
        }
        let rank = |id: WindowId| self.saved_order.iter().position(|w| *w == id);
        let Some(own) = rank(id) else {
            return self.windows.len();
        };
        self.windows
            .iter()
            .position(|w| rank(w.id).is_some_and(|r| r > own))
            .unwrap_or(self.windows.len())
    }

    fn persist_order(&mut self) -> Result<(), EngineError> {
        let current: Vec<WindowId> = self.windows.iter().map(|w| w.id).collect();
        self.saved_order = merge_order(&current, &self.saved_order);
        persist::save(self.store.as_mut(), WINDOW_LIST_KEY, &self.saved_order)?;
        Ok(())
    }

    fn persist_window(&mut self, idx: usize) -> Result<(), EngineError> {
        let window = &self.windows[idx];
        let state = PersistedWindow {
            group: window.group,
            minimized: window.state() == WindowState::Minimized,
            all_desktops: window.on_all_desktops(),
        };
        persist::save(self.store.as_mut(), &window_key(window.id), &state)?;
        Ok(())
    }

    /// Re-derives the window's group after it changed desktop or screen.
    fn refresh_group(&mut self, idx: usize) {
        let current_desktop = self.host.current_desktop();
        let window = &self.windows[idx];
        let desktop = if window.on_all_desktops() {
            current_desktop
        } else {
            window.host.desktop()
        };
        let origin = (desktop, self.resolve_screen(window.host.screen()));
        if window.group_origin == Some(origin) {
            return;
        }
        let group = self.groups.get(self.store.as_mut(), origin.0, origin.1);
        let window = &mut self.windows[idx];
        trace!(window = %window.id, group, "window changed group");
        window.group = Some(group);
        window.group_origin = Some(origin);
    }

    // Arrangement

    /// Lays out and commits every window on `surface`. Running it twice
    /// without intervening changes commits the same geometry.
    #[instrument(level = "debug", skip_all, fields(surface = %self.surface_key(surface)))]
    pub fn arrange(&mut self, surface: &Surface) {
        let key = self.surface_key(surface);
        let visible = self.visible_on(surface);
        let tileable = self.tileable_on(surface);
        let mut tiles = self.tiles(&tileable, &key);
        let gapped = self.layout_area(surface);
        let maximize_sole_tile = self.config.layout.maximize_sole_tile;

        let layout = self.current_layout(surface);
        let class = layout.class();
        if tiles.len() == 1 && maximize_sole_tile && !layout.is_floating() {
            tiles[0].geometry = surface.working_area;
            tiles[0].state = WindowState::Tiled;
        } else {
            let area = match layout {
                Layout::Monocle(monocle) if monocle.maximize => surface.working_area,
                _ => gapped,
            };
            layout.apply(area, &mut tiles);
        }
        debug!(%class, tiles = tiles.len(), "arranged");

        for (&idx, tile) in tileable.iter().zip(tiles) {
            let window = &mut self.windows[idx];
            window.geometry = tile.geometry;
            if tile.state != window.state() {
                window.set_state(tile.state);
            }
        }
        for idx in visible {
            self.commit(idx, surface.working_area);
        }
    }

    pub fn arrange_all(&mut self) {
        for surface in self.visible_surfaces() {
            self.arrange(&surface);
        }
    }

    /// Arranges the surface the window is on, if it has one.
    fn arrange_window(&mut self, idx: usize) {
        if let Some(surface) = self.window_surface(idx) {
            self.arrange(&surface);
        }
    }

    /// Writes a window's desired geometry to the host.
    fn commit(&mut self, idx: usize, bounds: Rect) {
        let prevent_protrusion = self.config.settings.prevent_protrusion;
        let keep_float_above = self.config.settings.keep_float_above;
        let window = &mut self.windows[idx];
        if window.in_interaction() {
            trace!(window = %window.id, "commit deferred until interaction ends");
            return;
        }
        let (geometry, keep_above) = match window.state() {
            WindowState::Tiled => {
                let geometry = constrain(window);
                let geometry = if prevent_protrusion {
                    geometry.contain_within(&bounds)
                } else {
                    geometry
                };
                (geometry, Some(false))
            }
            WindowState::Floating => (window.geometry, Some(keep_float_above)),
            _ => return,
        };
        trace!(window = %window.id, ?geometry, "commit");
        window.host.commit(geometry, keep_above);
        window.actual_geometry = window.host.geometry();
    }

    /// Commits a single window against its own surface.
    fn commit_window(&mut self, idx: usize) -> Result<(), EngineError> {
        let surface = self
            .window_surface(idx)
            .ok_or(EngineError::NoSurface(self.windows[idx].id))?;
        self.commit(idx, surface.working_area);
        Ok(())
    }

    /// Persists the current layout's parameters for `surface`.
    fn save_layout(&mut self, surface: &Surface) -> Result<(), EngineError> {
        let key = self.surface_key(surface);
        self.layouts.save(self.store.as_mut(), &key)?;
        Ok(())
    }

    /// Feeds the difference between a window's desired and observed geometry
    /// into the surface's layout.
    fn adjust_layout(&mut self, idx: usize) -> Result<(), EngineError> {
        let window = &self.windows[idx];
        let delta = RectDelta::from_rects(&window.geometry, &window.actual_geometry);
        if delta.is_zero() {
            return Ok(());
        }
        self.adjust_layout_by(idx, delta)
    }

    /// Resizes tile `idx` by `delta` through the layout and re-arranges.
    fn adjust_layout_by(&mut self, idx: usize, delta: RectDelta) -> Result<(), EngineError> {
        let surface = self
            .window_surface(idx)
            .ok_or(EngineError::NoSurface(self.windows[idx].id))?;
        let key = self.surface_key(&surface);
        let tileable = self.tileable_on(&surface);
        let Some(basis) = tileable.iter().position(|&i| i == idx) else {
            return Ok(());
        };
        let mut tiles = self.tiles(&tileable, &key);
        let area = self.layout_area(&surface);
        self.current_layout(&surface).adjust(area, &mut tiles, basis, delta);
        for (&i, tile) in tileable.iter().zip(&tiles) {
            self.windows[i].set_weight(&key, tile.weight);
        }
        self.save_layout(&surface)?;
        self.arrange(&surface);
        Ok(())
    }

    // Focus and neighbours

    fn activate(&mut self, idx: usize) {
        self.focus_clock += 1;
        let window = &mut self.windows[idx];
        window.focus_stamp = self.focus_clock;
        trace!(window = %window.id, "activating");
        self.host.set_active_window(window.id);
    }

    /// Closest tile from `basis` in `direction` among `candidates`: tiles
    /// overlapping on the perpendicular axis, nearest edge first, then most
    /// recently focused, then earliest in order.
    fn neighbor(&self, basis: usize, direction: Direction, candidates: &[usize]) -> Option<usize> {
        let from = self.windows[basis].geometry;
        let beyond: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| i != basis)
            .filter(|&i| {
                let g = self.windows[i].geometry;
                match direction {
                    Direction::Up => g.max_y() <= from.y && overlaps(g.x, g.max_x(), from.x, from.max_x()),
                    Direction::Down => {
                        from.max_y() <= g.y && overlaps(g.x, g.max_x(), from.x, from.max_x())
                    }
                    Direction::Left => {
                        g.max_x() <= from.x && overlaps(g.y, g.max_y(), from.y, from.max_y())
                    }
                    Direction::Right => {
                        from.max_x() <= g.x && overlaps(g.y, g.max_y(), from.y, from.max_y())
                    }
                }
            })
            .collect();
        let distance = |i: usize| {
            let g = self.windows[i].geometry;
            match direction {
                Direction::Up => from.y - g.max_y(),
                Direction::Down => g.y - from.max_y(),
                Direction::Left => from.x - g.max_x(),
                Direction::Right => g.x - from.max_x(),
            }
        };
        let closest = beyond.iter().map(|&i| distance(i)).min()?;
        beyond
            .into_iter()
            .filter(|&i| distance(i) == closest)
            .max_by_key(|&i| (self.windows[i].focus_stamp, std::cmp::Reverse(i)))
    }

    pub fn draw_tree(&mut self) -> Option<String> {
        let surface = self.current_surface()?;
        let key = self.surface_key(&surface);
        self.layouts.draw_tree(&key)
    }
}

fn overlaps(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Applies the host's size limits. Windows that cannot be resized keep the
/// size they have.
fn constrain(window: &Window) -> Rect {
    let min = window.host.min_size();
    let max = window.host.max_size();
    let mut geometry = window.geometry.clip_size(min.width, max.width, min.height, max.height);
    if !window.host.resizable() {
        geometry.width = window.actual_geometry.width;
        geometry.height = window.actual_geometry.height;
    }
    geometry
}

/// `current` in its own order, with every id only known from `saved` kept
/// right after the id that preceded it there.
fn merge_order(current: &[WindowId], saved: &[WindowId]) -> Vec<WindowId> {
    let mut merged = current.to_vec();
    for (pos, id) in saved.iter().enumerate() {
        if merged.contains(id) {
            continue;
        }
        let at = match pos.checked_sub(1).map(|p| saved[p]) {
            Some(prev) => merged.iter().position(|w| *w == prev).map_or(0, |p| p + 1),
            None => 0,
        };
        merged.insert(at, *id);
    }
    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::layout_engine::Action;
    use crate::sim::{Sim, SimWindow};

    fn ids(ids: &[u64]) -> Vec<WindowId> { ids.iter().map(|&i| WindowId::new(i)).collect() }

    #[test]
    fn merge_keeps_unseen_windows_in_place() {
        assert_eq!(merge_order(&ids(&[2]), &ids(&[3, 1, 2])), ids(&[3, 1, 2]));
        assert_eq!(merge_order(&ids(&[3, 2]), &ids(&[3, 1, 2])), ids(&[3, 1, 2]));
        assert_eq!(merge_order(&ids(&[2, 3]), &ids(&[3, 1])), ids(&[2, 3, 1]));
        assert_eq!(merge_order(&ids(&[]), &ids(&[4])), ids(&[4]));
    }

    #[test]
    fn windows_restore_their_saved_order() {
        let sim = Sim::new(Config::default());
        for id in [1, 2, 3] {
            sim.add(SimWindow::new(id, Rect::new(0, 0, 100, 100)));
        }
        sim.focus(1);
        sim.controller.on_action(Action::MoveNext);
        assert_eq!(sim.order(), ids(&[2, 1, 3]));

        let restarted = Sim::with_store(Config::default(), sim.store.clone());
        for id in [3, 1, 2] {
            restarted.add(SimWindow::new(id, Rect::new(0, 0, 100, 100)));
        }
        assert_eq!(restarted.order(), sim.order());
    }

    #[test]
    fn new_windows_can_start_as_master() {
        let mut config = Config::default();
        config.settings.new_window_as_master = true;
        let sim = Sim::new(config);
        sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)));
        assert_eq!(sim.order(), ids(&[2, 1]));
    }

    #[test]
    fn tiles_fill_the_gapped_area() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        let b = sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)));
        assert_eq!(a.geometry(), Rect::new(0, 0, 960, 1080));
        assert_eq!(b.geometry(), Rect::new(960, 0, 960, 1080));
    }

    #[test]
    fn sole_tile_can_fill_the_screen() {
        let mut config = Config::default();
        config.layout.maximize_sole_tile = true;
        config.layout.gaps.outer.top = 20;
        let sim = Sim::new(config);
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        assert_eq!(a.geometry(), Rect::new(0, 0, 1920, 1080));
        let b = sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)));
        assert_eq!(b.geometry(), Rect::new(960, 20, 960, 1060));
    }

    #[test]
    fn monocle_can_ignore_the_outer_gaps() {
        for (maximize, expected) in [
            (true, Rect::new(0, 0, 1920, 1080)),
            (false, Rect::new(10, 10, 1900, 1060)),
        ] {
            let mut config = Config::default();
            config.layout.order = vec![crate::layout_engine::LayoutClass::Monocle];
            config.layout.monocle_maximize = maximize;
            config.layout.gaps.outer = crate::common::config::OuterGaps {
                top: 10,
                left: 10,
                bottom: 10,
                right: 10,
            };
            let sim = Sim::new(config);
            let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
            let b = sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)));
            assert_eq!(a.geometry(), expected);
            assert_eq!(b.geometry(), expected);
        }
    }

    #[test]
    fn size_limits_and_protrusion_are_enforced() {
        let sim = Sim::new(Config::default());
        let a = sim.add(
            SimWindow::new(1, Rect::new(0, 0, 100, 100))
                .with_size_limits(crate::geometry::Size::new(0, 0), crate::geometry::Size::new(500, 0)),
        );
        assert_eq!(a.geometry(), Rect::new(0, 0, 500, 1080));

        let big = sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)).with_size_limits(
            crate::geometry::Size::new(1200, 0),
            crate::geometry::Size::new(0, 0),
        ));
        assert!(sim.host.working_area(0).unwrap().includes(&big.geometry()));
    }

    #[test]
    fn unresizable_windows_float_and_keep_their_size() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(10, 10, 300, 200)).non_resizable());
        assert_eq!(sim.state(1), WindowState::Floating);
        assert_eq!(a.geometry(), Rect::new(10, 10, 300, 200));
        assert_eq!(a.keep_above(), Some(true));
    }

    #[test]
    fn minimized_windows_are_left_out() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)));
        let b = sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)));
        b.set_minimized(true);
        sim.controller.on_window_changed(WindowId::new(2));
        assert_eq!(sim.state(2), WindowState::Minimized);
        assert_eq!(a.geometry(), Rect::new(0, 0, 1920, 1080));

        b.set_minimized(false);
        sim.controller.on_window_changed(WindowId::new(2));
        assert_eq!(sim.state(2), WindowState::Tiled);
        assert_eq!(a.geometry(), Rect::new(0, 0, 960, 1080));
    }

    #[test]
    fn sticky_windows_show_on_every_desktop() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)).on_every_desktop());
        assert_eq!(a.geometry(), Rect::new(0, 0, 1920, 1080));
        sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)).on_desktop(2));
        sim.host.set_current_desktop(2);
        sim.controller.on_current_desktop_changed();
        assert_eq!(a.geometry(), Rect::new(0, 0, 960, 1080));
    }

    #[test]
    fn windows_stay_in_their_activity() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)).in_activities(&["default"]));
        let b = sim.add(SimWindow::new(2, Rect::new(0, 0, 100, 100)).in_activities(&["work"]));
        assert_eq!(a.geometry(), Rect::new(0, 0, 1920, 1080));
        assert_eq!(b.geometry(), Rect::new(0, 0, 1920, 1080));

        let commits = a.commits().len();
        sim.host.set_current_activity("work");
        sim.controller.on_current_activity_changed();
        assert_eq!(a.commits().len(), commits);
        assert_eq!(b.commits().len(), 2);
    }

    #[test]
    fn out_of_range_screens_fall_back_to_the_current_one() {
        let sim = Sim::new(Config::default());
        let a = sim.add(SimWindow::new(1, Rect::new(0, 0, 100, 100)).on_screen(3));
        assert_eq!(a.commits().len(), 1);
    }

    #[test]
    fn window_state_is_persisted() {
        let sim = Sim::new(Config::default());
        sim.add(SimWindow::new(4, Rect::new(0, 0, 100, 100)));
        assert_eq!(
            sim.store.get("window/4").as_deref(),
            Some(r#"{"group":0,"minimized":false,"allDesktops":false}"#)
        );
        assert_eq!(sim.store.get("windows").as_deref(), Some("[4]"));
    }

    #[test]
    fn persisted_window_state_is_restored() {
        let mut store = crate::model::MemoryStore::new();
        store.put("window/7", r#"{"group":3,"minimized":true,"allDesktops":true}"#.into());
        let sim = Sim::with_store(Config::default(), store);
        let a = sim.add(SimWindow::new(7, Rect::new(0, 0, 100, 100)));
        assert_eq!(sim.state(7), WindowState::Minimized);
        assert_eq!(sim.engine_group(7), Some(3));
        let sticky = || {
            sim.controller.with_engine(|engine| {
                engine.window(WindowId::new(7)).map(|w| w.on_all_desktops()).unwrap_or(false)
            })
        };
        assert_eq!(sticky(), Some(true));
        assert!(a.commits().is_empty());

        // The host's next report wins.
        sim.controller.on_window_changed(WindowId::new(7));
        assert_eq!(sim.state(7), WindowState::Tiled);
        assert_eq!(sticky(), Some(false));
        // Group 3 is not on the current desktop.
        assert!(a.commits().is_empty());
    }
}
