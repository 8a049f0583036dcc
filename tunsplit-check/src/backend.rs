//! Namespace backend trait for pluggable implementations

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nix::errno::Errno;
use tunsplit_core::{Error, NamespaceId, ProcessId, Result};
use tunsplit_namespace::{NamespaceHandle, resolve_process_namespace};
use tunsplit_tun::TunDevice;

/// Source of namespace handles and their identities
///
/// This allows for different implementations:
/// - [`KernelBackend`] - real `/proc` files and TUN ioctls
/// - [`MockBackend`] - scripted identities, no kernel access
///
/// Handles are owned values: whatever happens, dropping one releases it.
pub trait NamespaceBackend {
    /// Split device type
    type Device;

    /// Namespace handle type
    type Handle;

    /// Open the network namespace of a process
    ///
    /// # Errors
    /// Returns [`Error::NamespaceUnavailable`] if the process is gone or
    /// its namespace cannot be opened
    fn resolve_process_namespace(&self, pid: ProcessId) -> Result<Self::Handle>;

    /// Namespace owning the device's control socket
    ///
    /// # Errors
    /// Returns [`Error::IdentityQueryFailed`] if the query fails
    fn extract_socket_namespace(&self, device: &Self::Device) -> Result<Self::Handle>;

    /// Namespace the device's interface is registered in
    ///
    /// # Errors
    /// Returns [`Error::IdentityQueryFailed`] if the query fails
    fn extract_device_namespace(&self, device: &Self::Device) -> Result<Self::Handle>;

    /// Resolve a handle to its identity, consuming (and so releasing) it.
    /// Failure yields [`NamespaceId::UNRESOLVED`].
    fn canonicalize(&self, handle: Self::Handle) -> NamespaceId;
}

/// Production backend over `/proc/<pid>/ns/net` and TUN ioctls
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelBackend;

impl KernelBackend {
    /// Create a new kernel backend
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NamespaceBackend for KernelBackend {
    type Device = TunDevice;
    type Handle = NamespaceHandle;

    fn resolve_process_namespace(&self, pid: ProcessId) -> Result<NamespaceHandle> {
        resolve_process_namespace(pid)
    }

    fn extract_socket_namespace(&self, device: &TunDevice) -> Result<NamespaceHandle> {
        device.socket_namespace()
    }

    fn extract_device_namespace(&self, device: &TunDevice) -> Result<NamespaceHandle> {
        device.device_namespace()
    }

    fn canonicalize(&self, handle: NamespaceHandle) -> NamespaceId {
        handle.canonicalize()
    }
}

/// Scripted split device for [`MockBackend`]
///
/// # Example
/// ```
/// use tunsplit_check::MockDevice;
/// use tunsplit_core::NamespaceId;
///
/// let device = MockDevice::new(NamespaceId::from_raw(1001));
/// device.relocate(NamespaceId::from_raw(2002));
///
/// assert_eq!(device.socket(), NamespaceId::from_raw(1001));
/// assert_eq!(device.device(), NamespaceId::from_raw(2002));
/// ```
#[derive(Debug)]
pub struct MockDevice {
    socket: Cell<NamespaceId>,
    device: Cell<NamespaceId>,
}

impl MockDevice {
    /// A freshly attached device: both sides in `namespace`
    #[must_use]
    pub const fn new(namespace: NamespaceId) -> Self {
        Self {
            socket: Cell::new(namespace),
            device: Cell::new(namespace),
        }
    }

    /// Move the interface side, as `ip link set ... netns` would
    pub fn relocate(&self, namespace: NamespaceId) {
        self.device.set(namespace);
    }

    /// Move the socket side (what a broken restore might do)
    pub fn rebind_socket(&self, namespace: NamespaceId) {
        self.socket.set(namespace);
    }

    /// Current socket-side namespace
    #[must_use]
    pub fn socket(&self) -> NamespaceId {
        self.socket.get()
    }

    /// Current interface-side namespace
    #[must_use]
    pub fn device(&self) -> NamespaceId {
        self.device.get()
    }
}

/// The two questions a split device answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceQuery {
    /// Namespace of the control socket
    Socket,
    /// Namespace of the interface
    Device,
}

impl DeviceQuery {
    /// Target of the handle this query yields
    #[must_use]
    pub const fn target(self) -> MockTarget {
        match self {
            Self::Socket => MockTarget::Socket,
            Self::Device => MockTarget::Device,
        }
    }

    /// Side name used in query errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Socket => "socket",
            Self::Device => "device",
        }
    }
}

/// What a mock handle or failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockTarget {
    /// Socket-side query
    Socket,
    /// Device-side query
    Device,
    /// Namespace of one process
    Process(ProcessId),
}

/// Handle issued by [`MockBackend`]; counts itself as open until dropped
#[derive(Debug)]
pub struct MockHandle {
    target: MockTarget,
    namespace: NamespaceId,
    resolvable: bool,
    open: Arc<AtomicUsize>,
}

impl MockHandle {
    /// What this handle refers to
    #[must_use]
    pub const fn target(&self) -> MockTarget {
        self.target
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Device name reported in mock query errors
pub const MOCK_DEVICE: &str = "mock0";

/// Mock backend for testing (doesn't touch the kernel)
///
/// # Example
/// ```
/// use tunsplit_check::{MockBackend, NamespaceBackend};
/// use tunsplit_core::{NamespaceId, ProcessId};
///
/// let backend = MockBackend::new();
/// let parent = ProcessId::from_raw(100);
/// backend.set_process_namespace(parent, NamespaceId::from_raw(1001));
///
/// let handle = backend.resolve_process_namespace(parent).unwrap();
/// assert_eq!(backend.open_handles(), 1);
///
/// assert_eq!(backend.canonicalize(handle), NamespaceId::from_raw(1001));
/// assert_eq!(backend.open_handles(), 0);
/// ```
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    open: Arc<AtomicUsize>,
}

#[derive(Default)]
struct MockState {
    processes: HashMap<ProcessId, NamespaceId>,
    failing_queries: Vec<DeviceQuery>,
    unresolvable: Vec<MockTarget>,
    call_count: usize,
}

impl MockBackend {
    /// Create a new mock backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place a process in a namespace
    pub fn set_process_namespace(&self, pid: ProcessId, namespace: NamespaceId) {
        self.state().processes.insert(pid, namespace);
    }

    /// Forget a process, as if it had exited
    pub fn remove_process(&self, pid: ProcessId) {
        self.state().processes.remove(&pid);
    }

    /// Make the socket- or device-side query fail
    pub fn fail_query(&self, query: DeviceQuery) {
        self.state().failing_queries.push(query);
    }

    /// Make handles for `target` impossible to canonicalize
    pub fn fail_resolution(&self, target: MockTarget) {
        self.state().unresolvable.push(target);
    }

    /// Clear all injected failures
    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.failing_queries.clear();
        state.unresolvable.clear();
    }

    /// Handles issued and not yet dropped
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Get the number of backend calls made (for testing)
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state().call_count
    }

    fn issue(&self, target: MockTarget, namespace: NamespaceId) -> MockHandle {
        let mut state = self.state();
        state.call_count += 1;

        let resolvable = !state.unresolvable.contains(&target);
        self.open.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(?target, ino = namespace.as_raw(), "Mock: Issued handle");

        MockHandle {
            target,
            namespace,
            resolvable,
            open: Arc::clone(&self.open),
        }
    }

    fn query(&self, query: DeviceQuery, namespace: NamespaceId) -> Result<MockHandle> {
        if self.state().failing_queries.contains(&query) {
            tracing::debug!(?query, "Mock: Query failed");
            return Err(Error::IdentityQueryFailed {
                device: MOCK_DEVICE.to_string(),
                side: query.name(),
                source: Errno::ENOTTY,
            });
        }

        Ok(self.issue(query.target(), namespace))
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("open_handles", &self.open_handles())
            .finish_non_exhaustive()
    }
}

impl NamespaceBackend for MockBackend {
    type Device = MockDevice;
    type Handle = MockHandle;

    fn resolve_process_namespace(&self, pid: ProcessId) -> Result<MockHandle> {
        let namespace = self.state().processes.get(&pid).copied();

        match namespace {
            Some(namespace) => Ok(self.issue(MockTarget::Process(pid), namespace)),
            None => Err(Error::NamespaceUnavailable {
                pid,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    fn extract_socket_namespace(&self, device: &MockDevice) -> Result<MockHandle> {
        self.query(DeviceQuery::Socket, device.socket())
    }

    fn extract_device_namespace(&self, device: &MockDevice) -> Result<MockHandle> {
        self.query(DeviceQuery::Device, device.device())
    }

    fn canonicalize(&self, handle: MockHandle) -> NamespaceId {
        if handle.resolvable {
            handle.namespace
        } else {
            tracing::warn!(handle_target = ?handle.target, "Mock: Resolution failed");
            NamespaceId::UNRESOLVED
        }
    }
}
