//! Network namespace configuration

use nix::sched::CloneFlags;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Network namespace configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetnsConfig {
    /// Bring the loopback interface up in each new namespace
    pub loopback_up: bool,

    /// Path (or `$PATH` name) of the iproute2 `ip` tool
    pub ip_command: PathBuf,
}

impl Default for NetnsConfig {
    fn default() -> Self {
        Self {
            loopback_up: true,
            ip_command: PathBuf::from("ip"),
        }
    }
}

impl NetnsConfig {
    /// Create a new namespace configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable loopback bring-up
    #[must_use]
    pub fn with_loopback_up(mut self, enable: bool) -> Self {
        self.loopback_up = enable;
        self
    }

    /// Use a specific `ip` binary
    #[must_use]
    pub fn with_ip_command(mut self, ip_command: impl Into<PathBuf>) -> Self {
        self.ip_command = ip_command.into();
        self
    }

    /// Clone flags for unshare(2)
    #[must_use]
    pub const fn to_clone_flags(&self) -> CloneFlags {
        CloneFlags::CLONE_NEWNET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetnsConfig::default();
        assert!(config.loopback_up);
        assert_eq!(config.ip_command, PathBuf::from("ip"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = NetnsConfig::new()
            .with_loopback_up(false)
            .with_ip_command("/sbin/ip");

        assert!(!config.loopback_up);
        assert_eq!(config.ip_command, PathBuf::from("/sbin/ip"));
    }

    #[test]
    fn test_clone_flags_only_network() {
        let flags = NetnsConfig::new().to_clone_flags();
        assert_eq!(flags, CloneFlags::CLONE_NEWNET);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: NetnsConfig = serde_json::from_str(r#"{"loopback_up": false}"#).unwrap();
        assert!(!config.loopback_up);
        assert_eq!(config.ip_command, PathBuf::from("ip"));
    }
}
