//! Tunsplit Core - shared types, error taxonomy and check results
//!
//! This crate provides the vocabulary used by every other tunsplit crate.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod report;
pub mod types;

pub use error::{Error, Result};
pub use report::{
    AttachmentViolation, Checkpoint, ConsistencyViolation, Finding, NamespaceSide, RunOutcome,
    SplitSnapshot, Violation,
};
pub use types::{DeviceName, NamespaceId, ProcessId, identities_equal};
