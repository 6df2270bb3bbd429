pub mod config;
pub mod log;

pub mod collections {
    pub use std::collections::hash_map;

    pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
    pub type HashSet<T> = rustc_hash::FxHashSet<T>;
}
