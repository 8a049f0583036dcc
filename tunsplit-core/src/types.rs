//! Core type definitions with strong typing and validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Network interface name with kernel validation rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceName(String);

impl DeviceName {
    /// Maximum length for interface names (`IFNAMSIZ` minus the NUL)
    pub const MAX_LENGTH: usize = 15;

    /// Interface name used when none is configured
    pub const DEFAULT: &'static str = "tunA1";

    /// Create a new `DeviceName` with validation
    ///
    /// # Errors
    /// Returns error if the name is one the kernel would reject
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Same checks as the kernel's `dev_valid_name()`
    fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidConfig {
                message: "Device name cannot be empty".to_string(),
            });
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(Error::InvalidConfig {
                message: format!("Device name too long (max {} bytes)", Self::MAX_LENGTH),
            });
        }

        if name == "." || name == ".." {
            return Err(Error::InvalidConfig {
                message: format!("Device name cannot be {name:?}"),
            });
        }

        if name
            .chars()
            .any(|c| c == '/' || c == ':' || c.is_whitespace() || c == '\0')
        {
            return Err(Error::InvalidConfig {
                message: "Device name cannot contain '/', ':', NUL or whitespace".to_string(),
            });
        }

        Ok(())
    }

    /// Get the device name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceName {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<DeviceName> for String {
    fn from(name: DeviceName) -> Self {
        name.0
    }
}

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ProcessId(i32);

impl ProcessId {
    /// Create from raw PID
    #[must_use]
    pub const fn from_raw(pid: i32) -> Self {
        Self(pid)
    }

    /// Get the current process ID
    #[must_use]
    pub fn current() -> Self {
        Self::from(nix::unistd::getpid())
    }

    /// Convert to `nix::unistd::Pid`
    #[must_use]
    pub const fn as_nix_pid(self) -> nix::unistd::Pid {
        nix::unistd::Pid::from_raw(self.0)
    }

    /// Get raw PID value
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<nix::unistd::Pid> for ProcessId {
    fn from(pid: nix::unistd::Pid) -> Self {
        Self(pid.as_raw())
    }
}

impl From<ProcessId> for nix::unistd::Pid {
    fn from(pid: ProcessId) -> Self {
        nix::unistd::Pid::from_raw(pid.0)
    }
}

/// Canonical identity of a network namespace: the inode number of the
/// namespace object.
///
/// `0` is never a real namespace inode and stands for "could not be
/// resolved". It compares unequal to everything through
/// [`identities_equal`], itself included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct NamespaceId(u64);

impl NamespaceId {
    /// Identity returned when a handle could not be inspected
    pub const UNRESOLVED: Self = Self(0);

    /// Create from a raw inode number
    #[must_use]
    pub const fn from_raw(ino: u64) -> Self {
        Self(ino)
    }

    /// Get the raw inode number
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Whether this is a real identity rather than the failure sentinel
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_resolved() {
            write!(f, "net:[{}]", self.0)
        } else {
            write!(f, "net:[unresolved]")
        }
    }
}

/// Whether two identities denote the same live namespace.
///
/// Raw `==` on [`NamespaceId`] treats two sentinels as equal; this does not.
#[must_use]
pub const fn identities_equal(a: NamespaceId, b: NamespaceId) -> bool {
    a.is_resolved() && a.0 == b.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_name_validation() {
        assert!(DeviceName::new("tunA1").is_ok());
        assert!(DeviceName::new("a".repeat(15)).is_ok());
        assert!(DeviceName::new("").is_err());
        assert!(DeviceName::new("a".repeat(16)).is_err());
        assert!(DeviceName::new("tun 0").is_err());
        assert!(DeviceName::new("tun/0").is_err());
        assert!(DeviceName::new("tun:0").is_err());
        assert!(DeviceName::new("..").is_err());
    }

    #[test]
    fn test_default_device_name_is_valid() {
        assert!(DeviceName::new(DeviceName::DEFAULT).is_ok());
        assert_eq!(DeviceName::default().as_str(), "tunA1");
    }

    #[test]
    fn test_device_name_serde() {
        let name = DeviceName::new("tunA1").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"tunA1\"");

        let back: DeviceName = serde_json::from_str(&json).unwrap();
        assert_eq!(name, back);

        assert!(serde_json::from_str::<DeviceName>("\"bad name\"").is_err());
    }

    #[test]
    fn test_process_id() {
        let pid = ProcessId::from_raw(123);
        assert_eq!(pid.as_raw(), 123);

        let nix_pid = pid.as_nix_pid();
        assert_eq!(nix_pid.as_raw(), 123);
    }

    #[test]
    fn test_sentinel_never_matches() {
        let unresolved = NamespaceId::UNRESOLVED;
        assert!(!unresolved.is_resolved());
        assert!(!identities_equal(unresolved, unresolved));
        assert!(!identities_equal(unresolved, NamespaceId::from_raw(1001)));
        assert!(!identities_equal(NamespaceId::from_raw(1001), unresolved));
    }

    #[test]
    fn test_identities_equal() {
        let a = NamespaceId::from_raw(1001);
        let b = NamespaceId::from_raw(2002);
        assert!(identities_equal(a, a));
        assert!(!identities_equal(a, b));
    }

    #[test]
    fn test_namespace_id_display() {
        assert_eq!(NamespaceId::from_raw(4_026_531_840).to_string(), "net:[4026531840]");
        assert_eq!(NamespaceId::UNRESOLVED.to_string(), "net:[unresolved]");
    }
}
