pub mod backend;
pub mod config;
pub mod error;
pub mod process;

pub use backend::{Backend, ModuleInfo, OpenedProcess, OsLayer, VirtualMemory};
pub use config::ConnectorConfig;
pub use error::{Error, Result};
pub use process::{ProcessMemory, ProcessStatus, ReadMemory, WriteMemory};

// Re-export mock for convenient access in tests
#[doc(hidden)]
pub use backend::mock::{MockBackend, MockProcess};
