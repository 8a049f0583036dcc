//! Check findings and the per-run outcome accumulator

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::NamespaceId;

/// The four namespace identities observed by one consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSnapshot {
    /// Namespace owning the device's control socket
    pub socket: NamespaceId,
    /// Namespace the network interface is registered in
    pub device: NamespaceId,
    /// Parent process namespace
    pub parent: NamespaceId,
    /// Child process namespace
    pub child: NamespaceId,
}

impl fmt::Display for SplitSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ns_sock={} ns_netdev={} ns_parent={} ns_child={}",
            self.socket.as_raw(),
            self.device.as_raw(),
            self.parent.as_raw(),
            self.child.as_raw()
        )
    }
}

/// Which of the four identities a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceSide {
    /// Control socket side of the device
    Socket,
    /// Network interface side of the device
    Device,
    /// Parent process
    Parent,
    /// Child process
    Child,
}

impl fmt::Display for NamespaceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Socket => "socket",
            Self::Device => "device",
            Self::Parent => "parent",
            Self::Child => "child",
        };
        f.write_str(name)
    }
}

/// One broken split invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    /// Socket side and device side are in the same namespace
    NotSplit,
    /// Parent and child share a namespace
    NotIsolated,
    /// Socket side is in neither process namespace
    OrphanedSocket,
    /// Device side is in neither process namespace
    OrphanedDevice,
    /// An identity could not be resolved at all
    Unresolved {
        /// Side whose handle could not be inspected
        side: NamespaceSide,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSplit => f.write_str("socket-ns equals device-ns"),
            Self::NotIsolated => f.write_str("parent-ns equals child-ns"),
            Self::OrphanedSocket => f.write_str("orphaned socket-ns"),
            Self::OrphanedDevice => f.write_str("orphaned device-ns"),
            Self::Unresolved { side } => write!(f, "{side}-ns unresolved"),
        }
    }
}

/// Every violation found by a single consistency check
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("Wrong tun ns ({snapshot}): {}", join(.violations))]
pub struct ConsistencyViolation {
    /// Identities the check saw
    pub snapshot: SplitSnapshot,
    /// Broken invariants, never empty
    pub violations: Vec<Violation>,
}

impl ConsistencyViolation {
    /// Create from a snapshot and its violations
    #[must_use]
    pub const fn new(snapshot: SplitSnapshot, violations: Vec<Violation>) -> Self {
        Self {
            snapshot,
            violations,
        }
    }

    /// Check whether a given violation was reported
    #[must_use]
    pub fn contains(&self, violation: Violation) -> bool {
        self.violations.contains(&violation)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Mismatch between the attached TUN device and what was opened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttachmentViolation {
    /// The descriptor is no longer attached to any interface
    DeviceLost,
    /// Attached to a different interface
    WrongName {
        /// Name the device was opened with
        expected: String,
        /// Name the kernel reports
        actual: String,
    },
    /// Interface type flags missing
    WrongType {
        /// Flags requested at open
        expected: u16,
        /// Flags the kernel reports
        actual: u16,
    },
}

impl fmt::Display for AttachmentViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceLost => f.write_str("attached tun file lost device"),
            Self::WrongName { expected, actual } => {
                write!(f, "attached tun {expected} wrong device {actual}")
            }
            Self::WrongType { expected, actual } => write!(
                f,
                "attached tun wrong device type (expected flags {expected:#06x}, got {actual:#06x})"
            ),
        }
    }
}

/// Point in the scenario at which checks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// Right after the device side was moved into the child namespace
    AfterRelocation,
    /// After the suspend point, once the resume signal arrived
    AfterResume,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AfterRelocation => f.write_str("after relocation"),
            Self::AfterResume => f.write_str("after resume"),
        }
    }
}

/// A recorded, non-fatal failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// Split invariant broken
    Consistency(ConsistencyViolation),
    /// TUN attachment lost or changed
    Attachment(AttachmentViolation),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consistency(v) => write!(f, "{v}"),
            Self::Attachment(v) => write!(f, "{v}"),
        }
    }
}

/// Results of every check performed during a run.
///
/// The run passes only if at least one check ran and none of them
/// recorded a finding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOutcome {
    checks: usize,
    findings: Vec<(Checkpoint, Finding)>,
}

impl RunOutcome {
    /// Create an empty outcome
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one check and whatever it found
    pub fn record(&mut self, checkpoint: Checkpoint, findings: Vec<Finding>) {
        self.checks += 1;

        for finding in findings {
            tracing::error!(%checkpoint, %finding, "Check failed");
            self.findings.push((checkpoint, finding));
        }
    }

    /// Number of checks recorded
    #[must_use]
    pub const fn checks(&self) -> usize {
        self.checks
    }

    /// All findings in the order they were recorded
    #[must_use]
    pub fn findings(&self) -> &[(Checkpoint, Finding)] {
        &self.findings
    }

    /// Whether the run as a whole passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks > 0 && self.findings.is_empty()
    }
}
