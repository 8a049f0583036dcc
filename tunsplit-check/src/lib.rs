//! Namespace consistency checks for split TUN devices
//!
//! This crate provides a trait-based abstraction over namespace lookups,
//! with a kernel-backed and a scripted implementation, and the checker
//! that asserts a device is split between two process namespaces.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod backend;
pub mod checker;

pub use backend::{
    DeviceQuery, KernelBackend, MOCK_DEVICE, MockBackend, MockDevice, MockHandle, MockTarget,
    NamespaceBackend,
};
pub use checker::{check_split_consistency, evaluate, snapshot};

// Re-export commonly used types
pub use tunsplit_core::{ConsistencyViolation, SplitSnapshot, Violation};
