use tracing::{debug, warn};

use super::persist::{self, PersistError, Store, group_key};
use crate::common::collections::HashMap;

/// Desktops per screen-row in derived group numbers.
const GROUPS_PER_DESKTOP: u32 = 5;

/// Maps `(desktop, screen)` to a surface group.
///
/// Lookups consult the cache, then the store, and finally derive the group
/// from the desktop and the position the configured order assigns to the
/// screen. A derived group is written back to both.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    cache: HashMap<(u32, usize), u32>,
    screen_order: Vec<usize>,
}

impl GroupRegistry {
    pub fn new(screen_order: Vec<usize>) -> Self {
        Self {
            cache: HashMap::default(),
            screen_order,
        }
    }

    pub fn get(&mut self, store: &mut dyn Store, desktop: u32, screen: usize) -> u32 {
        if let Some(group) = self.cache.get(&(desktop, screen)) {
            return *group;
        }
        let key = group_key(desktop, screen);
        let group = match persist::load::<u32>(&*store, &key) {
            Some(group) => group,
            None => {
                let group = self.derive(desktop, screen);
                if let Err(err) = persist::save(store, &key, &group) {
                    warn!(%err, "could not persist group");
                }
                group
            }
        };
        debug!(desktop, screen, group, "resolved surface group");
        self.cache.insert((desktop, screen), group);
        group
    }

    pub fn set(
        &mut self,
        store: &mut dyn Store,
        desktop: u32,
        screen: usize,
        group: u32,
    ) -> Result<(), PersistError> {
        persist::save(store, &group_key(desktop, screen), &group)?;
        self.cache.insert((desktop, screen), group);
        Ok(())
    }

    /// First known `(desktop, screen)` bound to `group`, searching desktops
    /// `1..=desktops` on `screens` screens.
    pub fn locate(
        &mut self,
        store: &mut dyn Store,
        group: u32,
        desktops: u32,
        screens: usize,
    ) -> Option<(u32, usize)> {
        (1..=desktops)
            .flat_map(|desktop| (0..screens).map(move |screen| (desktop, screen)))
            .find(|&(desktop, screen)| self.get(&mut *store, desktop, screen) == group)
    }

    fn derive(&self, desktop: u32, screen: usize) -> u32 {
        let position = if self.screen_order.is_empty() {
            screen
        } else {
            match self.screen_order.get(screen) {
                Some(position) => *position,
                None => {
                    warn!(screen, order = ?self.screen_order, "screen missing from screen order");
                    screen
                }
            }
        };
        desktop.saturating_sub(1) * GROUPS_PER_DESKTOP + position as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::persist::MemoryStore;

    #[test]
    fn derives_and_persists_on_first_lookup() {
        let mut store = MemoryStore::new();
        let mut groups = GroupRegistry::new(vec![]);
        assert_eq!(groups.get(&mut store, 1, 0), 0);
        assert_eq!(groups.get(&mut store, 3, 1), 11);
        assert_eq!(store.get("group/3/1").as_deref(), Some("11"));
    }

    #[test]
    fn persisted_value_wins_over_derivation() {
        let mut store = MemoryStore::new();
        store.put("group/2/0", "42".into());
        let mut groups = GroupRegistry::new(vec![]);
        assert_eq!(groups.get(&mut store, 2, 0), 42);
    }

    #[test]
    fn screen_order_maps_screens_to_positions() {
        let mut store = MemoryStore::new();
        let mut groups = GroupRegistry::new(vec![2, 0, 1]);
        assert_eq!(groups.get(&mut store, 1, 0), 2);
        assert_eq!(groups.get(&mut store, 1, 1), 0);
        assert_eq!(groups.get(&mut store, 2, 2), 6);
        // Screens past the end of the order keep their own index.
        assert_eq!(groups.get(&mut store, 1, 4), 4);
    }

    #[test]
    fn set_updates_cache_and_store() {
        let mut store = MemoryStore::new();
        let mut groups = GroupRegistry::new(vec![]);
        assert_eq!(groups.get(&mut store, 1, 0), 0);
        groups.set(&mut store, 1, 0, 7).unwrap();
        assert_eq!(groups.get(&mut store, 1, 0), 7);
        assert_eq!(store.get("group/1/0").as_deref(), Some("7"));
        assert_eq!(groups.locate(&mut store, 7, 2, 1), Some((1, 0)));
        assert_eq!(groups.locate(&mut store, 99, 2, 1), None);
    }
}
