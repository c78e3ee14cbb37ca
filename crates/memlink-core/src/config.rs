//! Connector configuration and polling constants.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Configuration for attaching to a memory source and its target process.
///
/// Loaded from a JSON file; every field has a default so a missing or
/// partial file still yields a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Connector plugin name, e.g. `qemu_procfs` or `kvm`.
    pub connector: String,

    /// Extra arguments passed to the connector, e.g. a VM name.
    pub connector_args: Option<String>,

    /// OS layer plugin name.
    pub os: String,

    /// Extra arguments passed to the OS layer.
    pub os_args: Option<String>,

    /// Executable name of the primary target process.
    pub process: String,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            connector: "qemu_procfs".to_string(),
            connector_args: None,
            os: "win32".to_string(),
            os_args: None,
            process: "game.exe".to_string(),
        }
    }
}

impl ConnectorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Polling cadence for callers that wait on the target process.
///
/// Nothing inside the handle retries; re-opening on a timer is the caller's
/// job, and these are the intervals the CLI uses for it.
pub mod polling {
    use std::time::Duration;

    /// Delay between open attempts while the process is not running.
    pub const PROCESS_WAIT_INTERVAL: Duration = Duration::from_secs(5);

    /// Delay between liveness checks while attached.
    pub const LIVENESS_INTERVAL: Duration = Duration::from_secs(1);
}
