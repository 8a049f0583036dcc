//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tunsplit_core::DeviceName;

#[derive(Parser)]
#[command(name = "tunsplit")]
#[command(about = "Split TUN namespace checker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a TUN device between two namespaces and check it across a suspend point
    Run(RunArgs),

    /// Show the network namespace identity of a process
    Inspect {
        /// Process ID (default: current process)
        #[arg(short, long)]
        pid: Option<i32>,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// JSON scenario file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interface name
    #[arg(short, long)]
    pub device: Option<DeviceName>,

    /// Create a TAP (layer 2) device instead of TUN
    #[arg(long)]
    pub tap: bool,

    /// Open the device without the packet information header
    #[arg(long)]
    pub no_pi: bool,

    /// Path to the iproute2 `ip` binary
    #[arg(long)]
    pub ip: Option<PathBuf>,

    /// Leave loopback down in the new namespaces
    #[arg(long)]
    pub no_loopback: bool,

    /// Write our PID here once ready to be checkpointed
    #[arg(long)]
    pub pidfile: Option<PathBuf>,

    /// Run the second check right away instead of waiting for SIGTERM
    #[arg(long)]
    pub no_wait: bool,
}
