//! memflow-backed implementation of the backend seam.
//!
//! Connector and OS layer plugins (e.g. `qemu_procfs`, `win32`) are loaded
//! from the memflow plugin inventory at runtime.

use memflow::prelude::v1::*;

use crate::backend::{Backend, ModuleInfo, OpenedProcess, OsLayer, VirtualMemory};
use crate::config::ConnectorConfig;
use crate::error::{Error, Result};

pub struct MemflowBackend {
    inventory: Inventory,
}

impl MemflowBackend {
    /// Scan the default plugin search paths.
    pub fn scan() -> Self {
        Self {
            inventory: Inventory::scan(),
        }
    }
}

impl Backend for MemflowBackend {
    type Connector = ConnectorInstanceArcBox<'static>;
    type Os = MemflowOs;

    fn create_connector(&self, config: &ConnectorConfig) -> Result<Self::Connector> {
        let args = config
            .connector_args
            .as_deref()
            .map(str::parse::<ConnectorArgs>)
            .transpose()
            .map_err(|e| Error::InvalidConfig(format!("connector args: {}", e)))?;

        self.inventory
            .create_connector(&config.connector, None, args.as_ref())
            .map_err(|e| {
                Error::BackendUnavailable(format!(
                    "cannot create connector '{}': {}",
                    config.connector, e
                ))
            })
    }

    fn build_os(&self, connector: Self::Connector, config: &ConnectorConfig) -> Result<Self::Os> {
        let args = config
            .os_args
            .as_deref()
            .map(str::parse::<OsArgs>)
            .transpose()
            .map_err(|e| Error::InvalidConfig(format!("os args: {}", e)))?;

        self.inventory
            .create_os(&config.os, Some(connector), args.as_ref())
            .map(MemflowOs)
            .map_err(|e| {
                Error::OsInitFailed(format!("cannot build os layer '{}': {}", config.os, e))
            })
    }
}

pub struct MemflowOs(OsInstanceArcBox<'static>);

impl OsLayer for MemflowOs {
    type Process = MemflowProcess;

    fn try_clone(&self) -> Result<Self> {
        Ok(MemflowOs(self.0.clone()))
    }

    fn into_process_by_name(self, name: &str) -> Result<Self::Process> {
        self.0
            .into_process_by_name(name)
            .map(MemflowProcess)
            .map_err(|e| Error::ProcessNotFound(format!("process '{}': {}", name, e)))
    }
}

pub struct MemflowProcess(IntoProcessInstanceArcBox<'static>);

impl OpenedProcess for MemflowProcess {
    type Memory = MemflowMemory;

    fn module_by_name(&mut self, name: &str) -> Result<ModuleInfo> {
        self.0
            .module_by_name(name)
            .map(|m| ModuleInfo {
                name: m.name.to_string(),
                base: m.base.to_umem() as u64,
                size: m.size as u64,
            })
            .map_err(|e| Error::ModuleNotFound(format!("module '{}': {}", name, e)))
    }

    fn into_virtual_memory(self) -> Result<Self::Memory> {
        // The process instance is its own memory view.
        Ok(MemflowMemory(self.0))
    }
}

pub struct MemflowMemory(IntoProcessInstanceArcBox<'static>);

impl VirtualMemory for MemflowMemory {
    fn read_raw_into(&mut self, address: u64, out: &mut [u8]) -> Result<()> {
        MemoryView::read_raw_into(&mut self.0, Address::from(address), out)
            .data()
            .map_err(|e| Error::MemoryReadFailed {
                address,
                message: e.to_string(),
            })
    }

    fn write_raw(&mut self, address: u64, data: &[u8]) -> Result<()> {
        MemoryView::write_raw(&mut self.0, Address::from(address), data)
            .data()
            .map_err(|e| Error::MemoryWriteFailed {
                address,
                message: e.to_string(),
            })
    }
}
