//! Network namespace creation

use nix::sched::unshare;
use tunsplit_core::{Error, Result};

use crate::config::NetnsConfig;
use crate::ip::IpCommand;

/// Moves the calling process into a fresh network namespace
#[derive(Debug)]
pub struct NetnsManager {
    config: NetnsConfig,
}

impl NetnsManager {
    /// Create a new namespace manager
    #[must_use]
    pub const fn new(config: NetnsConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &NetnsConfig {
        &self.config
    }

    /// Create the network namespace
    ///
    /// This calls unshare(2) for the current process, then brings the
    /// loopback interface up if configured.
    ///
    /// # Errors
    /// Returns error if unshare fails (typically missing `CAP_SYS_ADMIN`)
    /// or loopback bring-up fails
    pub fn create(&self) -> Result<()> {
        tracing::info!("Creating network namespace");

        unshare(self.config.to_clone_flags()).map_err(|e| {
            tracing::error!(error = %e, "Failed to unshare network namespace");
            Error::Namespace {
                message: format!("Failed to unshare network namespace: {e}"),
            }
        })?;

        if self.config.loopback_up {
            tracing::debug!("Bringing up loopback");
            IpCommand::from_config(&self.config).link_up("lo")?;
        }

        tracing::debug!("Network namespace ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_creation() {
        let manager = NetnsManager::new(NetnsConfig::default());
        assert!(manager.config().loopback_up);
    }

    #[test]
    fn test_custom_config() {
        let manager = NetnsManager::new(NetnsConfig::new().with_loopback_up(false));
        assert!(!manager.config().loopback_up);
    }
}
