//! String-keyed persistence of engine state.
//!
//! Every blob is JSON. Reads never fail: a missing or corrupt value is
//! reported at `warn` and the caller falls back to its defaults.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::surface::SurfaceKey;
use super::window::WindowId;
use crate::layout_engine::LayoutClass;

/// Host-provided key-value storage.
pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String);
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn keys(&self) -> Vec<String> { self.data.borrow().keys().cloned().collect() }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> { self.data.borrow().get(key).cloned() }

    fn put(&mut self, key: &str, value: String) {
        self.data.borrow_mut().insert(key.to_string(), value);
    }
}

/// Per-window state carried across sessions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedWindow {
    #[serde(default)]
    pub group: Option<u32>,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub all_desktops: bool,
}

pub fn window_key(id: WindowId) -> String { format!("window/{id}") }

pub fn layout_key(surface: &SurfaceKey, class: LayoutClass) -> String {
    format!("layout/{surface}/{class}")
}

pub fn group_key(desktop: u32, screen: usize) -> String { format!("group/{desktop}/{screen}") }

pub const WINDOW_LIST_KEY: &str = "windows";

pub fn load<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "ignoring corrupt persisted value");
            None
        }
    }
}

pub fn save<T: Serialize>(store: &mut dyn Store, key: &str, value: &T) -> Result<(), PersistError> {
    let raw = serde_json::to_string(value).map_err(|source| PersistError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.put(key, raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_values_read_as_missing() {
        let mut store = MemoryStore::new();
        store.put("window/1", "{not json".into());
        assert_eq!(load::<PersistedWindow>(&store, "window/1"), None);
        assert_eq!(load::<PersistedWindow>(&store, "window/2"), None);
    }

    #[test]
    fn window_state_uses_camel_case() {
        let mut store = MemoryStore::new();
        let state = PersistedWindow {
            group: Some(3),
            minimized: true,
            all_desktops: true,
        };
        save(&mut store, &window_key(WindowId::new(9)), &state).unwrap();
        assert_eq!(
            store.get("window/9").unwrap(),
            r#"{"group":3,"minimized":true,"allDesktops":true}"#
        );
        assert_eq!(load(&store, "window/9"), Some(state));
    }

    #[test]
    fn clones_share_contents() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        handle.put("group/1/0", "0".into());
        assert_eq!(store.keys(), vec!["group/1/0".to_string()]);
    }

    #[test]
    fn layout_keys_name_surface_and_class() {
        let key = SurfaceKey::new(0, Some("a".into()), Some(2));
        assert_eq!(layout_key(&key, LayoutClass::ThreeColumn), "layout/0@a#2/three_column");
    }
}
