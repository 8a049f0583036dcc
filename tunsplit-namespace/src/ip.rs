//! Thin wrapper over the iproute2 `ip` tool

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use tracing::{debug, error, info};
use tunsplit_core::{DeviceName, Error, ProcessId, Result};

use crate::config::NetnsConfig;

/// Runs `ip` subcommands
#[derive(Debug, Clone)]
pub struct IpCommand {
    program: PathBuf,
}

impl IpCommand {
    /// Use the given `ip` binary
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use the binary named in a namespace config
    #[must_use]
    pub fn from_config(config: &NetnsConfig) -> Self {
        Self::new(&config.ip_command)
    }

    /// `ip link set up dev <name>` in the caller's namespace
    ///
    /// # Errors
    /// Returns error if `ip` cannot be run or exits non-zero
    pub fn link_up(&self, name: &str) -> Result<()> {
        self.run(&["link", "set", "up", "dev", name])
            .map_err(|failure| Error::Namespace {
                message: failure.to_string(),
            })
    }

    /// `ip link set <dev> netns <pid>`: move the interface into the
    /// network namespace of `pid`.
    ///
    /// The control socket of a TUN device stays where it is; only the
    /// interface registration moves.
    ///
    /// # Errors
    /// Returns [`Error::Relocation`] if `ip` cannot be run or exits non-zero
    pub fn move_link(&self, device: &DeviceName, pid: ProcessId) -> Result<()> {
        let pid_arg = pid.to_string();

        self.run(&["link", "set", device.as_str(), "netns", &pid_arg])
            .map_err(|failure| Error::Relocation {
                device: device.to_string(),
                pid,
                message: failure.to_string(),
            })?;

        info!(device = %device, pid = pid.as_raw(), "Moved device into namespace");
        Ok(())
    }

    fn run(&self, args: &[&str]) -> std::result::Result<(), CommandFailure> {
        let command = format!("{} {}", self.program.display(), args.join(" "));
        debug!(%command, "Running");

        let output = match Command::new(&self.program).args(args).output() {
            Ok(output) => output,
            Err(e) => {
                error!(%command, error = %e, "Failed to spawn");
                return Err(CommandFailure {
                    command,
                    status: None,
                    detail: e.to_string(),
                });
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!(%command, status = %output.status, %stderr, "Command failed");

        Err(CommandFailure {
            command,
            status: Some(output.status),
            detail: stderr,
        })
    }
}

/// Why an `ip` invocation did not succeed
#[derive(Debug)]
struct CommandFailure {
    command: String,
    /// `None` if the process never started
    status: Option<ExitStatus>,
    /// Spawn error, or the command's stderr
    detail: String,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "`{}` exited with {status}: {}", self.command, self.detail),
            None => write!(f, "failed to run `{}`: {}", self.command, self.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> DeviceName {
        DeviceName::new("tunA1").unwrap()
    }

    #[test]
    fn test_from_config() {
        let config = NetnsConfig::new().with_ip_command("/nonexistent/configured-ip");
        let err = IpCommand::from_config(&config).link_up("lo").unwrap_err();

        assert!(err.to_string().contains("/nonexistent/configured-ip link set up dev lo"));
    }

    #[test]
    fn test_exit_status_captured() {
        let failure = IpCommand::new("false").run(&["link"]).unwrap_err();

        assert_eq!(failure.status.and_then(|s| s.code()), Some(1));
        assert_eq!(failure.command, "false link");
        assert!(failure.to_string().starts_with("`false link` exited with"));
    }

    #[test]
    fn test_spawn_failure_has_no_status() {
        let failure = IpCommand::new("/nonexistent/ip").run(&["link"]).unwrap_err();

        assert!(failure.status.is_none());
        assert!(!failure.detail.is_empty());
    }

    #[test]
    fn test_successful_command() {
        let ip = IpCommand::new("true");
        assert!(ip.link_up("lo").is_ok());
        assert!(ip.move_link(&device(), ProcessId::from_raw(1)).is_ok());
    }

    #[test]
    fn test_failing_relocation() {
        let ip = IpCommand::new("false");
        let err = ip.move_link(&device(), ProcessId::from_raw(77)).unwrap_err();

        match err {
            Error::Relocation {
                device, pid, message,
            } => {
                assert_eq!(device, "tunA1");
                assert_eq!(pid.as_raw(), 77);
                assert!(message.contains("link set tunA1 netns 77"));
            }
            other => panic!("Wrong error type: {other}"),
        }
    }

    #[test]
    fn test_missing_binary() {
        let ip = IpCommand::new("/nonexistent/ip");
        let err = ip.link_up("lo").unwrap_err();

        assert!(matches!(err, Error::Namespace { ref message } if message.contains("failed to run")));
    }
}
