use iwl_core::Bandwidth;
use iwl_hal::{DeviceCapabilities, PlatformClock, StationAddr};

struct FixedClock(u64);

impl PlatformClock for FixedClock {
    fn now_ns(&self) -> u64 { self.0 }
}

#[test]
fn test_clock_object_safety() {
    let clock = FixedClock(42);
    let obj: &dyn PlatformClock = &clock;
    assert_eq!(obj.now_ns(), 42);
}

#[test]
fn test_capabilities() {
    let legacy_only = DeviceCapabilities::new(Bandwidth::Mhz20, false, false);
    assert!(!legacy_only.supports_non_legacy());

    let vht = DeviceCapabilities::new(Bandwidth::Mhz80, true, true);
    assert!(vht.supports_non_legacy());
    assert_eq!(vht.max_width.mhz(), 80);
}

#[test]
fn test_station_addr_display() {
    let addr = StationAddr([0x00, 0x1b, 0x21, 0xaa, 0x0f, 0x10]);
    assert_eq!(format!("{}", addr), "00:1b:21:aa:0f:10");
}
