//! The process memory handle: open, validate, read/write, close.

use tracing::{debug, info, warn};

use crate::backend::{Backend, MemoryOf, OpenedProcess, OsLayer, VirtualMemory};
use crate::config::ConnectorConfig;
use crate::error::{Error, Result};
use crate::process::reader::{ReadMemory, WriteMemory};
use crate::process::status::ProcessStatus;

/// Expected signature of an executable image header ("MZ").
pub const IMAGE_DOS_SIGNATURE: u16 = 0x5A4D;

/// Handle to a target process's virtual memory.
///
/// The connector and OS layer are created on the first open and reused for
/// the lifetime of the handle; the process handle and memory accessor live
/// only between a successful `open` and the next `close`. Not safe for
/// concurrent use; serialize access externally if needed.
pub struct ProcessMemory<B: Backend> {
    backend: B,
    config: ConnectorConfig,
    os: Option<B::Os>,
    memory: Option<MemoryOf<B>>,
    base_address: u64,
    status: ProcessStatus,
}

impl<B: Backend> ProcessMemory<B> {
    pub fn new(backend: B, config: ConnectorConfig) -> Self {
        Self {
            backend,
            config,
            os: None,
            memory: None,
            base_address: 0,
            status: ProcessStatus::NotFound,
        }
    }

    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    /// Load address of the target module; 0 unless `FoundReady`.
    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Attach to the named process and locate the module of the same name.
    ///
    /// Any process-scoped state from a previous open is released first.
    /// On failure the status reflects the error kind: a process that is not
    /// running yields `NotFound`, everything else `FoundNoAccess`.
    pub fn open(&mut self, process_name: &str) -> Result<()> {
        self.close();
        match self.attach(process_name) {
            Ok((base_address, memory)) => {
                self.base_address = base_address;
                self.memory = Some(memory);
                self.status = ProcessStatus::FoundReady;
                info!("attached to '{}' at {:#x}", process_name, base_address);
                Ok(())
            }
            Err(e) => {
                self.status = e.status();
                warn!("open '{}' failed: {}", process_name, e);
                Err(e)
            }
        }
    }

    fn attach(&mut self, process_name: &str) -> Result<(u64, MemoryOf<B>)> {
        let os = self.cloned_os()?;
        let mut process = os.into_process_by_name(process_name)?;

        // The module info lives only long enough to extract the base; a
        // failed lookup drops the process handle with it.
        let base_address = {
            let module = process.module_by_name(process_name)?;
            debug!(
                "module '{}' at {:#x} ({} bytes)",
                module.name, module.base, module.size
            );
            module.base
        };

        let memory = process.into_virtual_memory()?;
        Ok((base_address, memory))
    }

    /// Hand out a clone of the OS layer, building connector and OS on first
    /// use. Opening a process consumes an OS value, so the long-lived
    /// instance is never given up.
    fn cloned_os(&mut self) -> Result<B::Os> {
        let os = match self.os.take() {
            Some(os) => os,
            None => {
                let connector = self.backend.create_connector(&self.config)?;
                debug!("connector '{}' attached", self.config.connector);
                let os = self.backend.build_os(connector, &self.config)?;
                debug!("os layer '{}' built", self.config.os);
                os
            }
        };
        let cloned = os.try_clone();
        self.os = Some(os);
        cloned
    }

    /// Release the process handle and memory accessor together and zero the
    /// base address. Safe to call repeatedly; the status is left untouched.
    pub fn close(&mut self) {
        if self.memory.is_some() {
            debug!("releasing process handle");
        }
        self.memory = None;
        self.base_address = 0;
    }

    /// Verify the attached process is still the one that was opened.
    ///
    /// Reads the image header at the cached base address and checks the
    /// executable signature. A mismatch (or a failed read) means the process
    /// exited or its address space was reused: the handle transitions to
    /// `FoundNoAccess` and is closed. Heuristic only: an unrelated image
    /// mapped at the same address with the same signature goes undetected.
    pub fn check_liveness(&mut self) -> ProcessStatus {
        if self.status != ProcessStatus::FoundReady {
            return self.status;
        }

        match self.read_u16(self.base_address) {
            Ok(IMAGE_DOS_SIGNATURE) => ProcessStatus::FoundReady,
            Ok(signature) => {
                warn!(
                    "image signature mismatch at {:#x}: {:#06x}",
                    self.base_address, signature
                );
                self.status = ProcessStatus::FoundNoAccess;
                self.close();
                self.status
            }
            Err(e) => {
                warn!("liveness read at {:#x} failed: {}", self.base_address, e);
                self.status = ProcessStatus::FoundNoAccess;
                self.close();
                self.status
            }
        }
    }

    /// Look up an arbitrary module in an arbitrary process.
    ///
    /// Rides on the OS layer built by a prior `open`; the primary process
    /// handle, base address, and status are never touched (the `&self`
    /// receiver guarantees it).
    pub fn module_address(&self, process_name: &str, module_name: &str) -> Result<u64> {
        let os = match &self.os {
            Some(os) => os.try_clone().inspect_err(|e| {
                warn!("os clone failed for module lookup: {}", e);
            })?,
            None => {
                warn!("os layer not initialized for module lookup");
                return Err(Error::OsInitFailed(
                    "os layer not initialized; open a process first".to_string(),
                ));
            }
        };

        let mut process = os.into_process_by_name(process_name).inspect_err(|e| {
            warn!("cannot open '{}' for module lookup: {}", process_name, e);
        })?;

        let module = process.module_by_name(module_name).inspect_err(|e| {
            warn!("module '{}' not found in '{}': {}", module_name, process_name, e);
        })?;

        Ok(module.base)
    }
}

impl<B: Backend> ReadMemory for ProcessMemory<B> {
    fn read_bytes(&mut self, address: u64, size: usize) -> Result<Vec<u8>> {
        let memory = match (self.status, self.memory.as_mut()) {
            (ProcessStatus::FoundReady, Some(memory)) => memory,
            _ => return Err(Error::NotReady),
        };

        let mut buffer = vec![0u8; size];
        memory.read_raw_into(address, &mut buffer)?;
        Ok(buffer)
    }
}

impl<B: Backend> WriteMemory for ProcessMemory<B> {
    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()> {
        let memory = match (self.status, self.memory.as_mut()) {
            (ProcessStatus::FoundReady, Some(memory)) => memory,
            _ => return Err(Error::NotReady),
        };

        memory.write_raw(address, data)
    }
}
