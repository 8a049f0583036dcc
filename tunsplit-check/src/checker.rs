//! Split consistency checks
//!
//! A check re-reads all four namespace identities from the backend every
//! time it runs. Nothing is cached between calls, so a restore that
//! collapsed or swapped the two sides of the device shows up on the next
//! check.

use tracing::{debug, info, warn};
use tunsplit_core::{
    ConsistencyViolation, NamespaceId, NamespaceSide, ProcessId, Result, SplitSnapshot, Violation,
    identities_equal,
};

use crate::backend::NamespaceBackend;

/// Resolve the four identities a consistency check compares.
///
/// Each handle is canonicalized (and so released) before the next one is
/// requested.
///
/// # Errors
/// Returns error if a process namespace cannot be opened or a device
/// query fails. Handles obtained before the failure are released.
pub fn snapshot<B: NamespaceBackend>(
    backend: &B,
    device: &B::Device,
    parent: ProcessId,
    child: ProcessId,
) -> Result<SplitSnapshot> {
    let socket_ns = backend.canonicalize(backend.extract_socket_namespace(device)?);
    let device_ns = backend.canonicalize(backend.extract_device_namespace(device)?);
    let parent_ns = backend.canonicalize(backend.resolve_process_namespace(parent)?);
    let child_ns = backend.canonicalize(backend.resolve_process_namespace(child)?);

    Ok(SplitSnapshot {
        socket: socket_ns,
        device: device_ns,
        parent: parent_ns,
        child: child_ns,
    })
}

/// Every broken invariant in a snapshot; empty means the device is
/// correctly split between the two processes.
#[must_use]
pub fn evaluate(snapshot: &SplitSnapshot) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (side, id) in [
        (NamespaceSide::Socket, snapshot.socket),
        (NamespaceSide::Device, snapshot.device),
        (NamespaceSide::Parent, snapshot.parent),
        (NamespaceSide::Child, snapshot.child),
    ] {
        if !id.is_resolved() {
            violations.push(Violation::Unresolved { side });
        }
    }

    if identities_equal(snapshot.socket, snapshot.device) {
        violations.push(Violation::NotSplit);
    }

    if identities_equal(snapshot.parent, snapshot.child) {
        violations.push(Violation::NotIsolated);
    }

    let owned_by_pair = |id: NamespaceId| {
        identities_equal(id, snapshot.parent) || identities_equal(id, snapshot.child)
    };

    if !owned_by_pair(snapshot.socket) {
        violations.push(Violation::OrphanedSocket);
    }

    if !owned_by_pair(snapshot.device) {
        violations.push(Violation::OrphanedDevice);
    }

    violations
}

/// Assert that `device` is split between the namespaces of `parent` and
/// `child`.
///
/// All invariants are evaluated; a failure carries every violation found.
///
/// # Errors
/// - [`Error::Consistency`](tunsplit_core::Error::Consistency) if any
///   invariant is broken (not fatal)
/// - [`Error::NamespaceUnavailable`](tunsplit_core::Error::NamespaceUnavailable) or
///   [`Error::IdentityQueryFailed`](tunsplit_core::Error::IdentityQueryFailed)
///   if the identities could not be read (fatal)
pub fn check_split_consistency<B: NamespaceBackend>(
    backend: &B,
    device: &B::Device,
    parent: ProcessId,
    child: ProcessId,
) -> Result<()> {
    let snapshot = snapshot(backend, device, parent, child)?;
    debug!(%snapshot, "Resolved namespace identities");

    let violations = evaluate(&snapshot);

    if violations.is_empty() {
        info!(
            socket = snapshot.socket.as_raw(),
            device = snapshot.device.as_raw(),
            "Device correctly split"
        );
        return Ok(());
    }

    warn!(%snapshot, count = violations.len(), "Wrong tun ns");
    Err(ConsistencyViolation::new(snapshot, violations).into())
}
