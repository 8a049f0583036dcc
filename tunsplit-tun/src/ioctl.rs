//! Raw ioctl bindings for `/dev/net/tun`
//!
//! Request numbers from `<linux/if_tun.h>` and `<linux/sockios.h>`.

#![allow(unsafe_code)]

use nix::{
    ioctl_none_bad, ioctl_read_bad, ioctl_write_ptr_bad, request_code_none, request_code_read,
    request_code_write,
};

const TUN_IOC_MAGIC: u8 = b'T';

/// `SIOCGSKNS`: namespace of the socket behind a descriptor
const SIOCGSKNS: u32 = 0x894C;

ioctl_write_ptr_bad!(
    /// `TUNSETIFF`: create or attach to an interface
    tun_set_iff,
    request_code_write!(TUN_IOC_MAGIC, 202, std::mem::size_of::<libc::c_int>()),
    libc::ifreq
);

ioctl_read_bad!(
    /// `TUNGETIFF`: name and flags of the attached interface
    tun_get_iff,
    request_code_read!(TUN_IOC_MAGIC, 210, std::mem::size_of::<libc::c_uint>()),
    libc::ifreq
);

ioctl_none_bad!(
    /// `TUNGETDEVNETNS`: new descriptor on the interface's network namespace
    tun_get_dev_netns,
    request_code_none!(TUN_IOC_MAGIC, 227)
);

ioctl_none_bad!(
    /// `SIOCGSKNS`: new descriptor on the control socket's network namespace
    sock_get_netns,
    SIOCGSKNS
);

#[cfg(all(test, any(target_arch = "x86_64", target_arch = "aarch64")))]
mod tests {
    use nix::{request_code_none, request_code_read, request_code_write};

    #[test]
    fn test_request_codes() {
        // Values as compiled into iproute2/criu on x86_64 and aarch64
        assert_eq!(
            request_code_write!(super::TUN_IOC_MAGIC, 202, std::mem::size_of::<libc::c_int>()),
            0x4004_54ca
        );
        assert_eq!(
            request_code_read!(super::TUN_IOC_MAGIC, 210, std::mem::size_of::<libc::c_uint>()),
            0x8004_54d2
        );
        assert_eq!(request_code_none!(super::TUN_IOC_MAGIC, 227), 0x54e3);
    }
}
