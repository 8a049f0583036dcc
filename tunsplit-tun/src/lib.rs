//! TUN devices whose socket and interface live in different namespaces
//!
//! A descriptor on `/dev/net/tun` answers two independent questions:
//! which network namespace owns its control socket (`SIOCGSKNS`) and
//! which one the interface is registered in (`TUNGETDEVNETNS`).

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod device;
pub mod flags;
mod ioctl;

pub use config::{DEFAULT_DEVICE, TunConfig, TunMode};
pub use device::{Attachment, TUN_DEVICE, TunDevice};
pub use flags::TunFlags;
