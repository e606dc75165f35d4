use iwl_core::{Aggregation, Antenna, AntennaSet, Bandwidth, GuardInterval, IwlError, Mode};

#[test]
fn test_antenna_set() {
    assert_eq!(AntennaSet::A.count(), 1);
    assert_eq!(AntennaSet::AB.count(), 2);
    assert!(AntennaSet::AB.contains(Antenna::B));
    assert!(!AntennaSet::AB.contains(Antenna::C));
    assert_eq!(format!("{}", AntennaSet::AB), "AB");
    assert_eq!(AntennaSet::EMPTY.count(), 0);
}

#[test]
fn test_device_width_fallback() {
    assert_eq!(Bandwidth::from_device_width(20), Bandwidth::Mhz20);
    assert_eq!(Bandwidth::from_device_width(80), Bandwidth::Mhz80);
    // 5 MHz / 10 MHz / odd values all fall through to the widest table.
    assert_eq!(Bandwidth::from_device_width(10), Bandwidth::Mhz160);
    assert_eq!(Bandwidth::from_device_width(160), Bandwidth::Mhz160);
}

#[test]
fn test_strict_width() {
    assert_eq!(Bandwidth::try_from_mhz(40), Ok(Bandwidth::Mhz40));
    assert_eq!(Bandwidth::try_from_mhz(30), Err(IwlError::InvalidBandwidth));
}

#[test]
fn test_misc() {
    assert_eq!(GuardInterval::Short.duration_ns(), 400);
    assert_eq!(GuardInterval::Long.duration_ns(), 800);
    assert_eq!(Mode::Mimo.spatial_streams(), 2);
    assert!(Mode::Legacy.is_legacy());
    assert_eq!(Aggregation::from(true), Aggregation::On);
    assert_eq!(Aggregation::default(), Aggregation::Off);
}
