use thiserror::Error;

use crate::model::{PersistError, WindowId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("window {0} is not managed")]
    UnknownWindow(WindowId),
    #[error("window {0} has no surface")]
    NoSurface(WindowId),
    #[error("failed to persist engine state: {0}")]
    Persist(#[from] PersistError),
}
