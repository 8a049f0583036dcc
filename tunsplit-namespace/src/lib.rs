//! Network namespace plumbing for split TUN checks
//!
//! This crate provides:
//! - Namespace handles and their canonical inode identities
//! - Network namespace creation for the current process
//! - A child process parked in its own network namespace
//! - Interface relocation through the `ip` tool

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod executor;
pub mod handle;
pub mod ip;
pub mod manager;

pub use config::NetnsConfig;
pub use executor::{ChildGuard, spawn_isolated_child};
pub use handle::{
    HandleOrigin, NamespaceHandle, namespace_path, process_namespace_id, resolve_process_namespace,
};
pub use ip::IpCommand;
pub use manager::NetnsManager;
