//! Read command implementation.
//!
//! Attaches to the target, reads a byte range, and prints a hex dump with
//! an ASCII column.

use anyhow::{Context, Result, bail};

use memlink_core::{Backend, ProcessMemory, ReadMemory};

/// Run the read command
pub fn run<B: Backend>(
    handle: &mut ProcessMemory<B>,
    address: Option<&str>,
    size: usize,
) -> Result<()> {
    let process = handle.config().process.clone();

    handle
        .open(&process)
        .with_context(|| format!("cannot attach to '{}'", process))?;

    let address = match address {
        Some(raw) => parse_hex_address(raw)?,
        None => handle.base_address(),
    };

    if size == 0 {
        bail!("size must be greater than zero");
    }

    let bytes = handle
        .read_bytes(address, size)
        .with_context(|| format!("read of {} bytes at {:#x} failed", size, address))?;

    print_hex_dump(address, &bytes);
    Ok(())
}

fn parse_hex_address(raw: &str) -> Result<u64> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u64::from_str_radix(digits, 16).with_context(|| format!("invalid address '{}'", raw))
}

fn print_hex_dump(base: u64, bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!(
            "{:#018x}  {:<47}  {}",
            base + (row as u64) * 16,
            hex.join(" "),
            ascii
        );
    }
}
