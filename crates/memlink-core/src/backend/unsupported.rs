//! Fallback backend for builds without an introspection framework.
//!
//! Every attach attempt fails with `BackendUnavailable`, so a binary built
//! without the `memflow` feature still links and reports a clear diagnostic
//! instead of failing to compile.

use crate::backend::{Backend, ModuleInfo, OpenedProcess, OsLayer, VirtualMemory};
use crate::config::ConnectorConfig;
use crate::error::{Error, Result};

pub struct UnsupportedBackend;

impl Backend for UnsupportedBackend {
    type Connector = ();
    type Os = UnsupportedOs;

    fn create_connector(&self, config: &ConnectorConfig) -> Result<Self::Connector> {
        Err(Error::BackendUnavailable(format!(
            "connector '{}': no introspection backend compiled in",
            config.connector
        )))
    }

    fn build_os(&self, _connector: (), config: &ConnectorConfig) -> Result<Self::Os> {
        Err(Error::OsInitFailed(format!(
            "os layer '{}': no introspection backend compiled in",
            config.os
        )))
    }
}

pub struct UnsupportedOs;

impl OsLayer for UnsupportedOs {
    type Process = UnsupportedProcess;

    fn try_clone(&self) -> Result<Self> {
        Ok(UnsupportedOs)
    }

    fn into_process_by_name(self, name: &str) -> Result<Self::Process> {
        Err(Error::ProcessNotFound(format!(
            "process '{}': no introspection backend compiled in",
            name
        )))
    }
}

pub enum UnsupportedProcess {}

impl OpenedProcess for UnsupportedProcess {
    type Memory = UnsupportedMemory;

    fn module_by_name(&mut self, _name: &str) -> Result<ModuleInfo> {
        match *self {}
    }

    fn into_virtual_memory(self) -> Result<Self::Memory> {
        match self {}
    }
}

pub enum UnsupportedMemory {}

impl VirtualMemory for UnsupportedMemory {
    fn read_raw_into(&mut self, _address: u64, _out: &mut [u8]) -> Result<()> {
        match *self {}
    }

    fn write_raw(&mut self, _address: u64, _data: &[u8]) -> Result<()> {
        match *self {}
    }
}
