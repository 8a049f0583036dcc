//! Attached TUN device and its two namespace affiliations

#![allow(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};

use tracing::{debug, error, info};
use tunsplit_core::{AttachmentViolation, DeviceName, Error, Result};
use tunsplit_namespace::{HandleOrigin, NamespaceHandle};

use crate::config::TunConfig;
use crate::flags::TunFlags;
use crate::ioctl;

/// Clone device for TUN/TAP interfaces
pub const TUN_DEVICE: &str = "/dev/net/tun";

/// Interface a TUN descriptor reports via `TUNGETIFF`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Interface name
    pub name: String,
    /// Interface flags
    pub flags: TunFlags,
}

/// An open `/dev/net/tun` descriptor attached to a named interface.
///
/// The descriptor is a socket-backed file: the socket keeps the network
/// namespace it was created in, while the interface can be moved to
/// another one. That is what makes the device "split".
#[derive(Debug)]
pub struct TunDevice {
    file: File,
    name: DeviceName,
    flags: TunFlags,
}

impl TunDevice {
    /// Open the clone device and attach it to the configured interface
    ///
    /// # Errors
    /// Returns [`Error::Device`] if `/dev/net/tun` cannot be opened or
    /// `TUNSETIFF` is rejected
    pub fn open(config: &TunConfig) -> Result<Self> {
        let name = config.name.clone();
        let flags = config.to_flags();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(TUN_DEVICE)
            .map_err(|e| {
                error!(path = TUN_DEVICE, error = %e, "Can't open tun file");
                Error::Device {
                    device: name.to_string(),
                    message: format!("Can't open tun file {TUN_DEVICE}: {e}"),
                }
            })?;

        let request = interface_request(&name, flags);

        // SAFETY: `request` is a fully initialised ifreq that outlives the call
        unsafe { ioctl::tun_set_iff(file.as_raw_fd(), &request) }.map_err(|e| {
            error!(device = %name, error = %e, "Can't attach iff");
            Error::Device {
                device: name.to_string(),
                message: format!("Can't attach iff: {e}"),
            }
        })?;

        info!(device = %name, kind = flags.kind(), "TUN device attached");

        Ok(Self { file, name, flags })
    }

    /// Interface name the device was opened with
    #[must_use]
    pub const fn name(&self) -> &DeviceName {
        &self.name
    }

    /// Flags the device was opened with
    #[must_use]
    pub const fn flags(&self) -> TunFlags {
        self.flags
    }

    /// Read back the attached interface with `TUNGETIFF`
    ///
    /// # Errors
    /// Returns error if the descriptor is no longer attached
    pub fn attachment(&self) -> Result<Attachment> {
        // SAFETY: all-zero is a valid ifreq
        let mut request: libc::ifreq = unsafe { std::mem::zeroed() };

        // SAFETY: `request` is a valid, writable ifreq
        unsafe { ioctl::tun_get_iff(self.file.as_raw_fd(), &mut request) }?;

        // SAFETY: TUNGETIFF fills the flags member of the union
        let raw_flags = unsafe { request.ifr_ifru.ifru_flags };

        Ok(Attachment {
            name: interface_name(&request),
            flags: TunFlags::from_bits_retain(raw_flags.cast_unsigned()),
        })
    }

    /// Compare the live attachment with what was opened.
    ///
    /// An empty result means the descriptor is still attached to the same
    /// interface with at least the requested flags.
    #[must_use]
    pub fn verify_attachment(&self) -> Vec<AttachmentViolation> {
        compare_attachment(&self.name, self.flags, self.attachment())
    }

    /// Namespace that owns the control socket side
    ///
    /// # Errors
    /// Returns [`Error::IdentityQueryFailed`] if `SIOCGSKNS` fails
    pub fn socket_namespace(&self) -> Result<NamespaceHandle> {
        // SAFETY: plain ioctl on an fd we own
        let fd = unsafe { ioctl::sock_get_netns(self.file.as_raw_fd()) };
        self.wrap_namespace_fd(fd, HandleOrigin::Socket, "socket")
    }

    /// Namespace the network interface is registered in
    ///
    /// # Errors
    /// Returns [`Error::IdentityQueryFailed`] if `TUNGETDEVNETNS` fails
    pub fn device_namespace(&self) -> Result<NamespaceHandle> {
        // SAFETY: plain ioctl on an fd we own
        let fd = unsafe { ioctl::tun_get_dev_netns(self.file.as_raw_fd()) };
        self.wrap_namespace_fd(fd, HandleOrigin::Device, "device")
    }

    fn wrap_namespace_fd(
        &self,
        fd: nix::Result<libc::c_int>,
        origin: HandleOrigin,
        side: &'static str,
    ) -> Result<NamespaceHandle> {
        match fd {
            // SAFETY: on success both ioctls return a new descriptor that nobody else owns
            Ok(fd) => Ok(NamespaceHandle::from_owned_fd(
                unsafe { OwnedFd::from_raw_fd(fd) },
                origin,
            )),
            Err(e) => Err(self.query_failed(side, e)),
        }
    }

    fn query_failed(&self, side: &'static str, source: nix::Error) -> Error {
        error!(device = %self.name, side, error = %source, "Unable to get a net namespace fd");
        Error::IdentityQueryFailed {
            device: self.name.to_string(),
            side,
            source,
        }
    }
}

impl AsFd for TunDevice {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

/// Violations between what was opened and what `TUNGETIFF` reports now
fn compare_attachment(
    name: &DeviceName,
    flags: TunFlags,
    live: Result<Attachment>,
) -> Vec<AttachmentViolation> {
    let attachment = match live {
        Ok(attachment) => attachment,
        Err(e) => {
            debug!(device = %name, error = %e, "TUNGETIFF failed");
            return vec![AttachmentViolation::DeviceLost];
        }
    };

    let mut violations = Vec::new();

    if attachment.name != name.as_str() {
        violations.push(AttachmentViolation::WrongName {
            expected: name.to_string(),
            actual: attachment.name,
        });
    }

    if !attachment.flags.contains(flags) {
        violations.push(AttachmentViolation::WrongType {
            expected: flags.bits(),
            actual: attachment.flags.bits(),
        });
    }

    violations
}

/// Build the `ifreq` for `TUNSETIFF`
fn interface_request(name: &DeviceName, flags: TunFlags) -> libc::ifreq {
    // SAFETY: all-zero is a valid ifreq
    let mut request: libc::ifreq = unsafe { std::mem::zeroed() };

    // DeviceName is at most IFNAMSIZ - 1 bytes, so the name stays NUL terminated
    for (dst, src) in request.ifr_name.iter_mut().zip(name.as_str().bytes()) {
        *dst = src as libc::c_char;
    }

    request.ifr_ifru.ifru_flags = flags.bits().cast_signed();

    request
}

fn interface_name(request: &libc::ifreq) -> String {
    #[allow(clippy::cast_sign_loss)]
    let bytes: Vec<u8> = request
        .ifr_name
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();

    String::from_utf8_lossy(&bytes).into_owned()
}
