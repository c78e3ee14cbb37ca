//! Mock backend for testing.
//!
//! Provides a configurable in-memory implementation of the backend seam:
//! a process table with per-process module lists and byte images, plus
//! failure injection for every attach step. Process images are shared
//! behind a mutex so tests can mutate them after a handle has attached,
//! simulating process exit and address-space reuse.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::backend::{Backend, ModuleInfo, OpenedProcess, OsLayer, VirtualMemory};
use crate::config::ConnectorConfig;
use crate::error::{Error, Result};

/// A fake target process: its loaded modules and a byte image.
#[derive(Debug, Clone, Default)]
pub struct MockProcess {
    modules: Vec<ModuleInfo>,
    image: Arc<Mutex<Vec<u8>>>,
    image_base: u64,
    fail_virtual_memory: bool,
}

impl MockProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a loaded module.
    pub fn module(mut self, name: &str, base: u64, size: u64) -> Self {
        self.modules.push(ModuleInfo {
            name: name.to_string(),
            base,
            size,
        });
        self
    }

    /// Set the byte image backing reads and writes, mapped at `base`.
    pub fn image(mut self, base: u64, data: Vec<u8>) -> Self {
        self.image = Arc::new(Mutex::new(data));
        self.image_base = base;
        self
    }

    /// Set an image of `size` zero bytes carrying the executable header
    /// signature ("MZ") at its start.
    pub fn image_with_signature(self, base: u64, size: usize) -> Self {
        let mut data = vec![0u8; size];
        data[0] = 0x4D;
        data[1] = 0x5A;
        self.image(base, data)
    }

    /// Make the virtual-memory accessor fail to open.
    pub fn fail_virtual_memory(mut self) -> Self {
        self.fail_virtual_memory = true;
        self
    }

    /// Shared handle to the image, for mutating it after an open.
    pub fn image_handle(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.image)
    }
}

#[derive(Debug, Default)]
struct MockState {
    processes: HashMap<String, MockProcess>,
    fail_connector: bool,
    fail_os: bool,
    fail_clone: bool,
    connector_creates: usize,
    os_builds: usize,
}

/// Mock backend. Clones share state, so a test can keep one clone to
/// add or remove processes while a handle owns another.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a process to the table (fluent form for initial setup).
    pub fn process(self, name: &str, process: MockProcess) -> Self {
        self.add_process(name, process);
        self
    }

    pub fn add_process(&self, name: &str, process: MockProcess) {
        self.state
            .lock()
            .unwrap()
            .processes
            .insert(name.to_string(), process);
    }

    /// Remove a process, as if it had exited.
    pub fn remove_process(&self, name: &str) {
        self.state.lock().unwrap().processes.remove(name);
    }

    pub fn fail_connector(self) -> Self {
        self.state.lock().unwrap().fail_connector = true;
        self
    }

    pub fn fail_os(self) -> Self {
        self.state.lock().unwrap().fail_os = true;
        self
    }

    pub fn set_fail_clone(&self, fail: bool) {
        self.state.lock().unwrap().fail_clone = fail;
    }

    /// How many times a connector has been created.
    pub fn connector_creates(&self) -> usize {
        self.state.lock().unwrap().connector_creates
    }

    /// How many times the OS layer has been built.
    pub fn os_builds(&self) -> usize {
        self.state.lock().unwrap().os_builds
    }
}

pub struct MockConnector;

impl Backend for MockBackend {
    type Connector = MockConnector;
    type Os = MockOs;

    fn create_connector(&self, config: &ConnectorConfig) -> Result<Self::Connector> {
        let mut state = self.state.lock().unwrap();
        if state.fail_connector {
            return Err(Error::BackendUnavailable(format!(
                "no plugin provides connector '{}'",
                config.connector
            )));
        }
        state.connector_creates += 1;
        Ok(MockConnector)
    }

    fn build_os(&self, _connector: MockConnector, config: &ConnectorConfig) -> Result<Self::Os> {
        let mut state = self.state.lock().unwrap();
        if state.fail_os {
            return Err(Error::OsInitFailed(format!(
                "cannot build os layer '{}'",
                config.os
            )));
        }
        state.os_builds += 1;
        Ok(MockOs {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MockOs {
    state: Arc<Mutex<MockState>>,
}

impl OsLayer for MockOs {
    type Process = MockOpenedProcess;

    fn try_clone(&self) -> Result<Self> {
        if self.state.lock().unwrap().fail_clone {
            return Err(Error::OsCloneFailed("clone rejected by mock".to_string()));
        }
        Ok(MockOs {
            state: Arc::clone(&self.state),
        })
    }

    fn into_process_by_name(self, name: &str) -> Result<Self::Process> {
        let state = self.state.lock().unwrap();
        state
            .processes
            .get(name)
            .cloned()
            .map(|process| MockOpenedProcess { process })
            .ok_or_else(|| Error::ProcessNotFound(format!("process '{}' is not running", name)))
    }
}

pub struct MockOpenedProcess {
    process: MockProcess,
}

impl OpenedProcess for MockOpenedProcess {
    type Memory = MockMemory;

    fn module_by_name(&mut self, name: &str) -> Result<ModuleInfo> {
        self.process
            .modules
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| Error::ModuleNotFound(format!("module '{}' is not loaded", name)))
    }

    fn into_virtual_memory(self) -> Result<Self::Memory> {
        if self.process.fail_virtual_memory {
            return Err(Error::MemoryAccessorFailed(
                "accessor rejected by mock".to_string(),
            ));
        }
        Ok(MockMemory {
            image: self.process.image,
            base: self.process.image_base,
        })
    }
}

/// Bounds-checked accessor over a shared byte image.
pub struct MockMemory {
    image: Arc<Mutex<Vec<u8>>>,
    base: u64,
}

impl MockMemory {
    fn range(&self, address: u64, len: usize, size: usize) -> Result<usize> {
        if address < self.base {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("address below image base {:#x}", self.base),
            });
        }
        let offset = (address - self.base) as usize;
        if offset + size > len {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("out of bounds: offset={}, size={}, len={}", offset, size, len),
            });
        }
        Ok(offset)
    }
}

impl VirtualMemory for MockMemory {
    fn read_raw_into(&mut self, address: u64, out: &mut [u8]) -> Result<()> {
        let image = self.image.lock().unwrap();
        let offset = self.range(address, image.len(), out.len())?;
        out.copy_from_slice(&image[offset..offset + out.len()]);
        Ok(())
    }

    fn write_raw(&mut self, address: u64, data: &[u8]) -> Result<()> {
        let mut image = self.image.lock().unwrap();
        let offset = self
            .range(address, image.len(), data.len())
            .map_err(|e| match e {
                Error::MemoryReadFailed { address, message } => {
                    Error::MemoryWriteFailed { address, message }
                }
                other => other,
            })?;
        image[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}
