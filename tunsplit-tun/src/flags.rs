//! TUN interface flags (`ifr_flags` for `TUNSETIFF`)

use bitflags::bitflags;

bitflags! {
    /// Interface flags passed to and reported by the TUN driver
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TunFlags: u16 {
        /// Layer 3 device
        const TUN = libc::IFF_TUN as u16;
        /// Layer 2 device
        const TAP = libc::IFF_TAP as u16;
        /// No packet information header
        const NO_PI = libc::IFF_NO_PI as u16;
    }
}

impl TunFlags {
    /// Short name of the device type
    #[must_use]
    pub fn kind(self) -> &'static str {
        if self.contains(Self::TAP) {
            "tap"
        } else if self.contains(Self::TUN) {
            "tun"
        } else {
            "unknown"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_match_kernel_abi() {
        assert_eq!(TunFlags::TUN.bits(), 0x0001);
        assert_eq!(TunFlags::TAP.bits(), 0x0002);
        assert_eq!(TunFlags::NO_PI.bits(), 0x1000);
    }

    #[test]
    fn test_flag_combination() {
        let flags = TunFlags::TUN | TunFlags::NO_PI;

        assert!(flags.contains(TunFlags::TUN));
        assert!(flags.contains(TunFlags::NO_PI));
        assert!(!flags.contains(TunFlags::TAP));
    }

    #[test]
    fn test_unknown_bits_are_kept() {
        // IFF_VNET_HDR, which we never request
        let flags = TunFlags::from_bits_retain(0x4001);

        assert!(flags.contains(TunFlags::TUN));
        assert_eq!(flags.bits(), 0x4001);
    }

    #[test]
    fn test_kind() {
        assert_eq!(TunFlags::TUN.kind(), "tun");
        assert_eq!((TunFlags::TAP | TunFlags::NO_PI).kind(), "tap");
        assert_eq!(TunFlags::empty().kind(), "unknown");
    }
}
