use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use memlink_core::{ConnectorConfig, ProcessMemory};

mod commands;

#[cfg(feature = "memflow")]
type DefaultBackend = memlink_core::backend::memflow::MemflowBackend;

#[cfg(not(feature = "memflow"))]
type DefaultBackend = memlink_core::backend::UnsupportedBackend;

#[derive(Parser)]
#[command(name = "memlink")]
#[command(about = "Process memory bridge over introspection backends", version)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "memlink.json")]
    config: PathBuf,

    /// Target process name (overrides the config file)
    #[arg(short, long)]
    process: Option<String>,

    /// Connector plugin name (overrides the config file)
    #[arg(long)]
    connector: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Attach once and report status, base address, and image signature
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Read bytes from the target's address space and hex dump them
    Read {
        /// Address to read from (hex); defaults to the module base
        #[arg(long)]
        address: Option<String>,

        #[arg(long, default_value = "256")]
        size: usize,
    },
    /// Resolve a module's base address in a (possibly different) process
    Module {
        /// Process to inspect (defaults to the configured target)
        #[arg(long)]
        process: Option<String>,

        /// Module to resolve
        #[arg(long)]
        module: String,
    },
    /// Wait for the target process, then poll liveness until it exits
    Watch,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("memlink=info".parse()?)
                .add_directive("memlink_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = match ConnectorConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            ConnectorConfig::default()
        }
    };
    if let Some(process) = args.process {
        config.process = process;
    }
    if let Some(connector) = args.connector {
        config.connector = connector;
    }

    let mut handle = new_handle(config);

    match args.command {
        Command::Status { json } => commands::status::run(&mut handle, json),
        Command::Read { address, size } => {
            commands::read::run(&mut handle, address.as_deref(), size)
        }
        Command::Module { process, module } => {
            commands::module::run(&mut handle, process.as_deref(), &module)
        }
        Command::Watch => commands::watch::run(&mut handle),
    }
}

fn new_handle(config: ConnectorConfig) -> ProcessMemory<DefaultBackend> {
    #[cfg(feature = "memflow")]
    let backend = memlink_core::backend::memflow::MemflowBackend::scan();

    #[cfg(not(feature = "memflow"))]
    let backend = memlink_core::backend::UnsupportedBackend;

    ProcessMemory::new(backend, config)
}
