//! Status command implementation.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use memlink_core::{Backend, ProcessMemory, ProcessStatus};

#[derive(Serialize)]
struct StatusReport {
    process: String,
    status: ProcessStatus,
    base_address: u64,
    signature_valid: bool,
}

/// Run the status command
pub fn run<B: Backend>(handle: &mut ProcessMemory<B>, json: bool) -> Result<()> {
    let process = handle.config().process.clone();

    // Failure details are logged by open(); the report below carries the
    // resulting status either way.
    let _ = handle.open(&process);

    let base_address = handle.base_address();
    let signature_valid = handle.status().is_ready()
        && handle.check_liveness() == ProcessStatus::FoundReady;
    let status = handle.status();

    if json {
        let report = StatusReport {
            process,
            status,
            base_address,
            signature_valid,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("memlink {} - Status", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Process:       {}", process);
    match status {
        ProcessStatus::FoundReady => println!("Status:        {}", status.green()),
        ProcessStatus::NotFound => println!("Status:        {}", status.yellow()),
        ProcessStatus::FoundNoAccess => println!("Status:        {}", status.red()),
    }
    println!("Base address:  {:#018x}", base_address);
    println!(
        "Image header:  {}",
        if signature_valid {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        }
    );

    Ok(())
}
