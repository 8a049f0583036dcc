//! TUN device configuration

use serde::{Deserialize, Serialize};
use tunsplit_core::DeviceName;

use crate::flags::TunFlags;

/// Default interface name
pub const DEFAULT_DEVICE: &str = DeviceName::DEFAULT;

/// Layer of the virtual device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunMode {
    /// IP packets (`IFF_TUN`)
    #[default]
    Tun,
    /// Ethernet frames (`IFF_TAP`)
    Tap,
}

/// TUN device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunConfig {
    /// Interface name
    pub name: DeviceName,

    /// Device layer
    pub mode: TunMode,

    /// Prefix each packet with the 4-byte packet information header
    pub packet_info: bool,
}

impl Default for TunConfig {
    fn default() -> Self {
        Self {
            name: DeviceName::default(),
            mode: TunMode::Tun,
            packet_info: true,
        }
    }
}

impl TunConfig {
    /// Create a configuration for the named device
    #[must_use]
    pub fn new(name: DeviceName) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Set the device layer
    #[must_use]
    pub fn with_mode(mut self, mode: TunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable the packet information header
    #[must_use]
    pub fn with_packet_info(mut self, enable: bool) -> Self {
        self.packet_info = enable;
        self
    }

    /// Convert to `TUNSETIFF` flags
    #[must_use]
    pub fn to_flags(&self) -> TunFlags {
        let mut flags = match self.mode {
            TunMode::Tun => TunFlags::TUN,
            TunMode::Tap => TunFlags::TAP,
        };

        if !self.packet_info {
            flags |= TunFlags::NO_PI;
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TunConfig::default();
        assert_eq!(config.name.as_str(), "tunA1");
        assert_eq!(config.mode, TunMode::Tun);
        assert_eq!(config.to_flags(), TunFlags::TUN);
    }

    #[test]
    fn test_tap_without_pi() {
        let config = TunConfig::new(DeviceName::new("tap7").unwrap())
            .with_mode(TunMode::Tap)
            .with_packet_info(false);

        let flags = config.to_flags();
        assert!(flags.contains(TunFlags::TAP));
        assert!(flags.contains(TunFlags::NO_PI));
        assert!(!flags.contains(TunFlags::TUN));
    }

    #[test]
    fn test_json_config() {
        let config: TunConfig = serde_json::from_str(r#"{"name": "tunB2", "mode": "tap"}"#).unwrap();
        assert_eq!(config.name.as_str(), "tunB2");
        assert_eq!(config.mode, TunMode::Tap);
        assert!(config.packet_info);

        assert!(serde_json::from_str::<TunConfig>(r#"{"name": "bad name"}"#).is_err());
    }
}
