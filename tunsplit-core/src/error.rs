//! Error types for tunsplit

use thiserror::Error;

use crate::report::ConsistencyViolation;
use crate::types::ProcessId;

/// Tunsplit error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// System error from nix
    #[error("System error: {0}")]
    System(#[from] nix::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Namespace setup failed (unshare, loopback bring-up, child spawn)
    #[error("Namespace error: {message}")]
    Namespace {
        /// Error message
        message: String,
    },

    /// A process's network namespace reference could not be opened
    #[error("Network namespace of process {pid} unavailable: {source}")]
    NamespaceUnavailable {
        /// Process whose namespace was requested
        pid: ProcessId,
        /// Underlying open failure
        #[source]
        source: std::io::Error,
    },

    /// A namespace query on the split device returned an invalid descriptor
    #[error("{side} namespace query on {device} failed: {source}")]
    IdentityQueryFailed {
        /// Device name
        device: String,
        /// Which side was queried ("socket" or "device")
        side: &'static str,
        /// Errno from the ioctl
        #[source]
        source: nix::Error,
    },

    /// TUN device open/attach failed
    #[error("TUN device {device}: {message}")]
    Device {
        /// Device name
        device: String,
        /// Error message
        message: String,
    },

    /// Moving the device into another namespace failed
    #[error("Failed to move {device} into namespace of process {pid}: {message}")]
    Relocation {
        /// Device name
        device: String,
        /// Target process
        pid: ProcessId,
        /// Error message
        message: String,
    },

    /// The split invariant does not hold
    #[error(transparent)]
    Consistency(#[from] ConsistencyViolation),
}

impl Error {
    /// Whether this error must abort the run.
    ///
    /// Only consistency violations are recorded and carried on; everything
    /// else means the scenario itself could not be set up or observed.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Consistency(_))
    }
}

/// Result type alias for tunsplit operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{SplitSnapshot, Violation};
    use crate::types::NamespaceId;

    #[test]
    fn test_consistency_is_not_fatal() {
        let snapshot = SplitSnapshot {
            socket: NamespaceId::from_raw(1001),
            device: NamespaceId::from_raw(1001),
            parent: NamespaceId::from_raw(1001),
            child: NamespaceId::from_raw(2002),
        };
        let err = Error::from(ConsistencyViolation::new(
            snapshot,
            vec![Violation::NotSplit],
        ));

        assert!(!err.is_fatal());
    }

    #[test]
    fn test_setup_errors_are_fatal() {
        let err = Error::NamespaceUnavailable {
            pid: ProcessId::from_raw(42),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("42"));

        let err = Error::IdentityQueryFailed {
            device: "tunA1".to_string(),
            side: "socket",
            source: nix::Error::EBADF,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("socket namespace query on tunA1"));
    }
}
