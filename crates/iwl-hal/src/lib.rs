#![no_std]
#![forbid(unsafe_code)]

use iwl_core::Bandwidth;

/// What the PHY under the rate scaler can do.
/// Fixed for the lifetime of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    pub max_width: Bandwidth,
    pub ht_supported: bool,
    pub vht_supported: bool,
}

impl DeviceCapabilities {
    pub const fn new(max_width: Bandwidth, ht_supported: bool, vht_supported: bool) -> Self {
        Self { max_width, ht_supported, vht_supported }
    }

    /// Legacy-only devices never leave the OFDM columns.
    pub const fn supports_non_legacy(&self) -> bool {
        self.ht_supported || self.vht_supported
    }
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self::new(Bandwidth::Mhz20, true, false)
    }
}

/// Peer MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StationAddr(pub [u8; 6]);

impl core::fmt::Display for StationAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let a = &self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a[0], a[1], a[2], a[3], a[4], a[5])
    }
}

/// Monotonic time source owned by the host.
/// INVARIANT: Never goes backwards.
pub trait PlatformClock: Send + Sync {
    fn now_ns(&self) -> u64;
}
