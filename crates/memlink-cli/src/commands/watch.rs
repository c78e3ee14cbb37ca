//! Watch command implementation.
//!
//! The retry loop the handle itself never performs: poll open() until the
//! target appears, then poll liveness until it exits, then start over.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Result;
use tracing::{info, warn};

use memlink_core::config::polling;
use memlink_core::{Backend, ProcessMemory, ProcessStatus};

/// Run the watch command
pub fn run<B: Backend>(handle: &mut ProcessMemory<B>) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let process = handle.config().process.clone();
    info!("Waiting for '{}'...", process);

    while running.load(Ordering::SeqCst) {
        match handle.open(&process) {
            Ok(()) => {
                info!(
                    "Attached to '{}' (base: {:#x})",
                    process,
                    handle.base_address()
                );

                while running.load(Ordering::SeqCst)
                    && handle.check_liveness() == ProcessStatus::FoundReady
                {
                    thread::sleep(polling::LIVENESS_INTERVAL);
                }

                if running.load(Ordering::SeqCst) {
                    warn!("'{}' exited or was replaced, waiting for it to return", process);
                }
            }
            Err(_) => {
                // NotFound is the quiet, expected case; open() already
                // logged anything worse.
                thread::sleep(polling::PROCESS_WAIT_INTERVAL);
            }
        }
    }

    handle.close();
    info!("Stopped");
    Ok(())
}
