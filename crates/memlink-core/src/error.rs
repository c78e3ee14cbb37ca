use thiserror::Error;

use crate::process::ProcessStatus;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No backend available: {0}")]
    BackendUnavailable(String),

    #[error("OS layer initialization failed: {0}")]
    OsInitFailed(String),

    #[error("OS layer clone failed: {0}")]
    OsCloneFailed(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Failed to open virtual memory accessor: {0}")]
    MemoryAccessorFailed(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Failed to write process memory at address {address:#x}: {message}")]
    MemoryWriteFailed { address: u64, message: String },

    #[error("Process handle is not ready")]
    NotReady,

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Coarse status an open attempt ends in when it fails with this error.
    ///
    /// A missing process is the expected, retriable outcome; every other
    /// failure means the target was reachable in principle but could not be
    /// accessed.
    pub fn status(&self) -> ProcessStatus {
        match self {
            Error::ProcessNotFound(_) => ProcessStatus::NotFound,
            _ => ProcessStatus::FoundNoAccess,
        }
    }
}
