use slotmap::SlotMap;
use tracing::{debug, warn};

use super::systems::{Layout, LayoutClass, LayoutState, WindowsLayout};
use crate::common::collections::HashMap;
use crate::common::collections::hash_map::Entry;
use crate::common::config::LayoutSettings;
use crate::layout_engine::utils::wrap_index;
use crate::model::SurfaceKey;
use crate::model::persist::{self, PersistError, Store, layout_key};

slotmap::new_key_type! { pub struct LayoutId; }

/// Per-surface layout registry.
///
/// Each surface lazily gets one instance per layout class it visits, so
/// switching away and back keeps a layout's ratios and counts. Instances
/// restore their persisted state the first time they are created.
#[derive(Debug)]
pub struct LayoutStore {
    layouts: SlotMap<LayoutId, Layout>,
    surfaces: HashMap<SurfaceKey, SurfaceLayouts>,
    floating: LayoutId,
    settings: LayoutSettings,
}

#[derive(Debug)]
struct SurfaceLayouts {
    instances: HashMap<LayoutClass, LayoutId>,
    current: LayoutClass,
    previous: LayoutClass,
}

fn current_key(surface: &SurfaceKey) -> String { format!("layout/{surface}") }

impl LayoutStore {
    pub fn new(settings: LayoutSettings) -> Self {
        let mut layouts = SlotMap::with_key();
        let floating = layouts.insert(Layout::new(LayoutClass::Floating, &settings));
        Self {
            layouts,
            surfaces: HashMap::default(),
            floating,
            settings,
        }
    }

    fn entry(&mut self, store: &dyn Store, key: &SurfaceKey) -> &mut SurfaceLayouts {
        match self.surfaces.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let current = persist::load::<String>(store, &current_key(key))
                    .map(|id| LayoutClass::from_id(&id))
                    .or_else(|| self.settings.order.first().copied())
                    .unwrap_or(LayoutClass::Floating);
                debug!(surface = %key, %current, "new surface layouts");
                entry.insert(SurfaceLayouts {
                    instances: HashMap::default(),
                    current,
                    previous: current,
                })
            }
        }
    }

    fn instance(&mut self, store: &dyn Store, key: &SurfaceKey, class: LayoutClass) -> LayoutId {
        if let Some(id) = self.entry(store, key).instances.get(&class) {
            return *id;
        }
        let mut layout = Layout::new(class, &self.settings);
        if let Some(state) = persist::load::<LayoutState>(store, &layout_key(key, class)) {
            if state.class_id == class.to_string() {
                layout.restore(&state);
            }
        }
        let id = self.layouts.insert(layout);
        self.entry(store, key).instances.insert(class, id);
        id
    }

    pub fn current_class(&mut self, store: &dyn Store, key: &SurfaceKey) -> LayoutClass {
        self.entry(store, key).current
    }

    /// Current layout of the surface. Surfaces excluded from tiling share a
    /// single floating layout.
    pub fn current(&mut self, store: &dyn Store, key: &SurfaceKey, ignore: bool) -> &mut Layout {
        let id = if ignore {
            self.floating
        } else {
            let class = self.current_class(store, key);
            self.instance(store, key, class)
        };
        &mut self.layouts[id]
    }

    /// Steps through the configured order, wrapping at both ends. A current
    /// class outside the order counts as sitting just before its start.
    pub fn cycle(&mut self, store: &mut dyn Store, key: &SurfaceKey, step: isize) -> &mut Layout {
        let order = self.settings.order.clone();
        let entry = self.entry(&*store, key);
        let next = match order.iter().position(|c| *c == entry.current) {
            Some(index) => order[wrap_index(index as isize + step, order.len())],
            None if step > 0 => order.first().copied().unwrap_or(entry.current),
            None => order.last().copied().unwrap_or(entry.current),
        };
        entry.previous = entry.current;
        entry.current = next;
        self.switched(store, key, next)
    }

    /// Switches to `class`, or back to the previous layout when `class` is
    /// already current.
    pub fn toggle(
        &mut self,
        store: &mut dyn Store,
        key: &SurfaceKey,
        class: LayoutClass,
    ) -> &mut Layout {
        let entry = self.entry(&*store, key);
        if entry.current == class {
            entry.current = entry.previous;
            entry.previous = class;
        } else {
            entry.previous = entry.current;
            entry.current = class;
        }
        let current = entry.current;
        self.switched(store, key, current)
    }

    fn switched(&mut self, store: &mut dyn Store, key: &SurfaceKey, class: LayoutClass) -> &mut Layout {
        debug!(surface = %key, %class, "layout switched");
        if let Err(err) = persist::save(store, &current_key(key), &class.to_string()) {
            warn!(%err, "could not persist current layout");
        }
        let id = self.instance(&*store, key, class);
        &mut self.layouts[id]
    }

    /// Writes the current layout's parameters to the store.
    pub fn save(&mut self, store: &mut dyn Store, key: &SurfaceKey) -> Result<(), PersistError> {
        let class = self.current_class(&*store, key);
        let id = self.instance(&*store, key, class);
        persist::save(store, &layout_key(key, class), &self.layouts[id].state())
    }

    pub fn draw_tree(&self, key: &SurfaceKey) -> Option<String> {
        let entry = self.surfaces.get(key)?;
        let id = entry.instances.get(&entry.current)?;
        Some(self.layouts[*id].draw_tree())
    }
}
