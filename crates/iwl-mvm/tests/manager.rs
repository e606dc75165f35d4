use iwl_core::{Aggregation, Bandwidth, IwlError};
use iwl_hal::{DeviceCapabilities, PlatformClock, StationAddr};
use iwl_mvm::{ManagerConfig, RateManager};
use iwl_rs::{ColumnId, LegacyRate, Phase, RateId};
use std::boxed::Box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// --- MOCKS ---
struct MockClock { t: Arc<AtomicU64> }
impl MockClock {
    fn new(start: u64) -> (Self, Arc<AtomicU64>) {
        let t = Arc::new(AtomicU64::new(start));
        (Self { t: t.clone() }, t)
    }
}
impl PlatformClock for MockClock {
    fn now_ns(&self) -> u64 { self.t.load(Ordering::SeqCst) }
}

const STA_A: StationAddr = StationAddr([0x02, 0, 0, 0, 0, 0x0a]);
const STA_B: StationAddr = StationAddr([0x02, 0, 0, 0, 0, 0x0b]);

fn manager(caps: DeviceCapabilities) -> (RateManager, Arc<AtomicU64>) {
    let (clock, handle) = MockClock::new(1_000);
    let mgr = RateManager::new(Box::new(clock), ManagerConfig::new(caps)).expect("static config is valid");
    (mgr, handle)
}

#[test]
fn test_station_lifecycle() {
    let (mut mgr, _) = manager(DeviceCapabilities::default());
    assert!(mgr.is_empty());

    mgr.add_station(STA_A).unwrap();
    mgr.add_station(STA_B).unwrap();
    assert_eq!(mgr.len(), 2);
    assert_eq!(mgr.add_station(STA_A), Err(IwlError::DuplicateStation));
    assert_eq!(mgr.stations().collect::<Vec<_>>(), vec![STA_A, STA_B]);

    mgr.remove_station(STA_A).unwrap();
    assert!(!mgr.contains(STA_A));
    assert_eq!(mgr.remove_station(STA_A), Err(IwlError::UnknownStation));
    assert_eq!(mgr.len(), 1);
}

#[test]
fn test_unknown_station_reports() {
    let (mut mgr, _) = manager(DeviceCapabilities::default());
    assert_eq!(mgr.report_data_ok(STA_A), Err(IwlError::UnknownStation));
    assert_eq!(mgr.report_data_failed(STA_A), Err(IwlError::UnknownStation));
    assert_eq!(mgr.report_ampdu_tx_status(STA_A, 4, 0), Err(IwlError::UnknownStation));
    assert_eq!(mgr.set_aggregation(STA_A, Aggregation::On), Err(IwlError::UnknownStation));
    assert!(mgr.station_snapshot(STA_A).is_none());
}

#[test]
fn test_fallback_and_control_vectors() {
    let (clock, _) = MockClock::new(0);
    let mut config = ManagerConfig::new(DeviceCapabilities::default());
    config.control_rate = LegacyRate::Ofdm12;
    config.fallback_rate = LegacyRate::Ofdm24;
    let mgr = RateManager::new(Box::new(clock), config).unwrap();

    let data = mgr.data_tx_vector(STA_A);
    assert_eq!(data.rate, RateId::Legacy(LegacyRate::Ofdm24));
    assert_eq!(data.guard_interval_ns, 800);
    assert_eq!(data.antennas, 1);
    assert_eq!(data.bandwidth, Bandwidth::Mhz20);
    assert!(!data.aggregation);

    assert_eq!(mgr.control_tx_vector().rate, RateId::Legacy(LegacyRate::Ofdm12));
}

#[test]
fn test_reports_drive_the_station() {
    let (mut mgr, _) = manager(DeviceCapabilities::new(Bandwidth::Mhz80, true, true));
    mgr.add_station(STA_A).unwrap();
    mgr.add_station(STA_B).unwrap();

    let snap = mgr.station_snapshot(STA_A).unwrap();
    assert_eq!(snap.phase, Phase::SearchCycleStarted);
    assert_eq!(snap.column, ColumnId::LegacyAntA);
    assert_eq!(snap.success_ratio, None);
    assert_eq!(mgr.data_tx_vector(STA_A).rate, RateId::Legacy(LegacyRate::Ofdm6));

    for _ in 0..8 {
        mgr.report_data_ok(STA_A).unwrap();
    }
    let snap = mgr.station_snapshot(STA_A).unwrap();
    assert_eq!(snap.index, 1);

    // Stations are independent.
    assert_eq!(mgr.station_snapshot(STA_B).unwrap().index, 0);

    for _ in 0..72 {
        mgr.report_data_ok(STA_A).unwrap();
    }
    let snap = mgr.station_snapshot(STA_A).unwrap();
    assert!(snap.trial_active);
    assert_eq!(snap.column, ColumnId::SisoAntA);
    assert_eq!(snap.bandwidth, Bandwidth::Mhz80);
    assert_eq!(snap.tx_vector, mgr.data_tx_vector(STA_A));
    assert_eq!(snap.tx_vector.rate, RateId::Vht(1));
}

#[test]
fn test_rts_and_final_failures_are_ignored() {
    let (mut mgr, _) = manager(DeviceCapabilities::default());
    mgr.add_station(STA_A).unwrap();
    let before = mgr.station_snapshot(STA_A).unwrap();

    for _ in 0..20 {
        mgr.report_rts_ok(STA_A);
        mgr.report_rts_failed(STA_A);
        mgr.report_final_data_failed(STA_A);
    }
    assert_eq!(mgr.station_snapshot(STA_A).unwrap(), before);
}

#[test]
fn test_missed_block_ack() {
    let (mut mgr, _) = manager(DeviceCapabilities::default());
    mgr.add_station(STA_A).unwrap();
    mgr.set_aggregation(STA_A, Aggregation::On).unwrap();

    // Nothing acked: one failure, not sixteen.
    mgr.report_ampdu_tx_status(STA_A, 0, 16).unwrap();
    mgr.report_ampdu_tx_status(STA_A, 0, 16).unwrap();
    let snap = mgr.station_snapshot(STA_A).unwrap();
    assert_eq!(snap.aggregation, Aggregation::On);
    assert_eq!(snap.average_throughput, None);
    assert_eq!(snap.index, 0);
}

#[test]
fn test_stay_timeout_follows_host_clock() {
    let (mut mgr, clock) = manager(DeviceCapabilities::new(Bandwidth::Mhz20, false, false));
    mgr.add_station(STA_A).unwrap();

    for _ in 0..80 {
        mgr.report_data_ok(STA_A).unwrap();
    }
    assert_eq!(mgr.station_snapshot(STA_A).unwrap().phase, Phase::StayInColumn);

    clock.store(1_000 + 25_000_000_000, Ordering::SeqCst);
    mgr.report_data_ok(STA_A).unwrap();
    // Expired and, with nowhere else to go, settled again.
    let snap = mgr.station_snapshot(STA_A).unwrap();
    assert_eq!(snap.phase, Phase::StayInColumn);
    assert_eq!(snap.column, ColumnId::LegacyAntA);
    assert_eq!(snap.tx_vector.rate, RateId::Legacy(LegacyRate::Ofdm54));
}
