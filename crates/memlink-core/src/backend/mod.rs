//! Capability seam over the memory-introspection framework.
//!
//! These traits abstract the connector, the OS layer, and per-process
//! virtual memory, enabling mock implementations for testing without a
//! reachable memory source.

#[cfg(feature = "memflow")]
pub mod memflow;
mod unsupported;

// Mock backend for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use unsupported::UnsupportedBackend;

use crate::config::ConnectorConfig;
use crate::error::Result;

/// A loaded module inside a process's address space.
///
/// Plain value object; callers extract the base address and drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: String,
    pub base: u64,
    pub size: u64,
}

/// Entry point into a memory-introspection framework.
///
/// Scans for available connector plugins and builds the OS abstraction on
/// top of one. Both steps run at most once per handle; the OS layer is then
/// cloned for each process open.
pub trait Backend {
    type Connector;
    type Os: OsLayer;

    /// Scan available plugins and attach the configured connector.
    fn create_connector(&self, config: &ConnectorConfig) -> Result<Self::Connector>;

    /// Build the OS layer on top of an attached connector.
    ///
    /// The OS layer owns its physical-memory source from then on.
    fn build_os(&self, connector: Self::Connector, config: &ConnectorConfig) -> Result<Self::Os>;
}

/// Process and module enumeration over an attached memory source.
pub trait OsLayer: Sized {
    type Process: OpenedProcess;

    /// Clone this OS layer so a process can be opened without giving up the
    /// long-lived instance.
    fn try_clone(&self) -> Result<Self>;

    /// Open a process by executable name, consuming this OS value.
    ///
    /// Callers that want to keep their OS layer must clone it first.
    fn into_process_by_name(self, name: &str) -> Result<Self::Process>;
}

/// An opened process, ready for module lookup and memory access.
pub trait OpenedProcess: Sized {
    type Memory: VirtualMemory;

    /// Look up a loaded module by name.
    fn module_by_name(&mut self, name: &str) -> Result<ModuleInfo>;

    /// Convert this process into a virtual-memory accessor.
    ///
    /// The accessor owns the process handle; dropping it releases both.
    fn into_virtual_memory(self) -> Result<Self::Memory>;
}

/// Raw reads and writes into a process's virtual address space.
pub trait VirtualMemory {
    fn read_raw_into(&mut self, address: u64, out: &mut [u8]) -> Result<()>;

    fn write_raw(&mut self, address: u64, data: &[u8]) -> Result<()>;
}

/// OS layer type of a backend.
pub type OsOf<B> = <B as Backend>::Os;

/// Opened-process type of a backend.
pub type ProcessOf<B> = <OsOf<B> as OsLayer>::Process;

/// Virtual-memory accessor type of a backend.
pub type MemoryOf<B> = <ProcessOf<B> as OpenedProcess>::Memory;
