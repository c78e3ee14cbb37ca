//! Module command implementation.
//!
//! Resolves a module's base address in an arbitrary process. The primary
//! target is opened first so the OS layer exists; its state is otherwise
//! unaffected by the lookup.

use anyhow::Result;

use memlink_core::{Backend, ProcessMemory};

/// Run the module command
pub fn run<B: Backend>(
    handle: &mut ProcessMemory<B>,
    process: Option<&str>,
    module: &str,
) -> Result<()> {
    let primary = handle.config().process.clone();

    // The OS layer is built even when the primary target is not running;
    // only a backend failure leaves it absent, which the lookup reports.
    let _ = handle.open(&primary);

    let target = process.unwrap_or(&primary);

    // Lookup failures print a zero address; diagnostics go to the log.
    let address = handle.module_address(target, module).unwrap_or(0);
    println!("{}!{} {:#x}", target, module, address);

    Ok(())
}
