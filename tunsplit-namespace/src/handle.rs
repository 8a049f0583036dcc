//! Network namespace handles and their canonical identities
//!
//! A [`NamespaceHandle`] owns a descriptor on a kernel namespace object,
//! either opened from `/proc/<pid>/ns/net` or returned by an ioctl on
//! some other descriptor. Dropping the handle closes the descriptor.

use std::fmt;
use std::fs::File;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use tracing::{debug, trace, warn};
use tunsplit_core::{Error, NamespaceId, ProcessId, Result};

/// Where a handle came from, kept for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOrigin {
    /// `/proc/<pid>/ns/net`
    Process(ProcessId),
    /// Namespace of a device's control socket
    Socket,
    /// Namespace a network interface is registered in
    Device,
}

impl fmt::Display for HandleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process(pid) => write!(f, "process {pid}"),
            Self::Socket => f.write_str("socket"),
            Self::Device => f.write_str("device"),
        }
    }
}

/// Owned reference to a network namespace, not yet resolved to an identity
#[derive(Debug)]
pub struct NamespaceHandle {
    file: File,
    origin: HandleOrigin,
}

impl NamespaceHandle {
    /// Wrap a namespace descriptor obtained elsewhere
    #[must_use]
    pub fn from_owned_fd(fd: OwnedFd, origin: HandleOrigin) -> Self {
        trace!(%origin, "Namespace handle acquired");
        Self {
            file: File::from(fd),
            origin,
        }
    }

    /// Where this handle came from
    #[must_use]
    pub const fn origin(&self) -> HandleOrigin {
        self.origin
    }

    /// Resolve to the namespace inode and release the handle.
    ///
    /// Inspection failure yields [`NamespaceId::UNRESOLVED`]; the descriptor
    /// is closed either way.
    #[must_use]
    pub fn canonicalize(self) -> NamespaceId {
        let id = match self.file.metadata() {
            Ok(meta) => NamespaceId::from_raw(meta.ino()),
            Err(error) => {
                warn!(origin = %self.origin, %error, "Unable to stat a net namespace");
                NamespaceId::UNRESOLVED
            }
        };

        trace!(origin = %self.origin, ino = id.as_raw(), "Namespace handle released");
        id
    }
}

impl AsFd for NamespaceHandle {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

/// Path of the network namespace reference for a process
#[must_use]
pub fn namespace_path(pid: ProcessId) -> PathBuf {
    PathBuf::from(format!("/proc/{pid}/ns/net"))
}

/// Open the network namespace of a process
///
/// # Errors
/// Returns [`Error::NamespaceUnavailable`] if the process does not exist
/// or its namespace reference cannot be opened
pub fn resolve_process_namespace(pid: ProcessId) -> Result<NamespaceHandle> {
    let path = namespace_path(pid);

    let file = File::open(&path).map_err(|source| {
        warn!(pid = pid.as_raw(), path = %path.display(), error = %source, "Cannot open namespace fd");
        Error::NamespaceUnavailable { pid, source }
    })?;

    debug!(pid = pid.as_raw(), "Opened process network namespace");

    Ok(NamespaceHandle::from_owned_fd(
        OwnedFd::from(file),
        HandleOrigin::Process(pid),
    ))
}

/// Canonical network namespace identity of a process
///
/// # Errors
/// Returns error if the namespace reference cannot be opened
pub fn process_namespace_id(pid: ProcessId) -> Result<NamespaceId> {
    resolve_process_namespace(pid).map(NamespaceHandle::canonicalize)
}
