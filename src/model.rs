pub mod group;
pub mod persist;
pub mod surface;
pub mod window;

pub use group::GroupRegistry;
pub use persist::{MemoryStore, PersistError, PersistedWindow, Store};
pub use surface::{Surface, SurfaceKey};
pub use window::{Window, WindowFlags, WindowId, WindowState};
