//! Scenario configuration: JSON file plus command-line overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tunsplit_namespace::NetnsConfig;
use tunsplit_tun::{TunConfig, TunMode};

use crate::cli::RunArgs;

/// Everything a run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Namespace setup for parent and child
    pub netns: NetnsConfig,

    /// Device to split
    pub tun: TunConfig,

    /// Where to write the PID once ready
    pub pidfile: Option<PathBuf>,

    /// Block for the resume signal before the second check
    pub wait_for_resume: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            netns: NetnsConfig::default(),
            tun: TunConfig::default(),
            pidfile: None,
            wait_for_resume: true,
        }
    }
}

impl ScenarioConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        serde_json::from_str(&raw).with_context(|| format!("Invalid scenario file {}", path.display()))
    }

    /// Build from command-line arguments, loading `--config` first if given
    pub fn from_args(args: &RunArgs) -> Result<Self> {
        let base = match args.config {
            Some(ref path) => Self::load(path)?,
            None => Self::default(),
        };

        Ok(base.with_overrides(args))
    }

    /// Apply flags on top of this configuration
    #[must_use]
    pub fn with_overrides(mut self, args: &RunArgs) -> Self {
        if let Some(ref device) = args.device {
            self.tun.name = device.clone();
        }
        if args.tap {
            self.tun.mode = TunMode::Tap;
        }
        if args.no_pi {
            self.tun.packet_info = false;
        }
        if let Some(ref ip) = args.ip {
            self.netns.ip_command = ip.clone();
        }
        if args.no_loopback {
            self.netns.loopback_up = false;
        }
        if args.pidfile.is_some() {
            self.pidfile.clone_from(&args.pidfile);
        }
        if args.no_wait {
            self.wait_for_resume = false;
        }

        self
    }
}
