use iwl_core::Bandwidth;
use iwl_hal::PlatformClock;
use iwl_linux::{ChannelModel, LinuxClock, SimClock};
use iwl_rs::{LegacyRate, RateId, TxVector};

fn vht(mcs: u8, bandwidth: Bandwidth, nss: u8) -> TxVector {
    TxVector {
        rate: RateId::Vht(mcs),
        guard_interval_ns: 800,
        antennas: nss,
        nss,
        bandwidth,
        aggregation: false,
    }
}

#[test]
fn test_sim_clock_is_shared() {
    let clock = SimClock::new(10);
    let handle = clock.clone();
    handle.advance(5);
    assert_eq!(clock.now_ns(), 15);
    handle.set(1_000);
    assert_eq!(clock.now_ns(), 1_000);
}

#[test]
fn test_linux_clock_monotonic() {
    let clock = LinuxClock::new();
    let a = clock.now_ns();
    let b = clock.now_ns();
    assert!(b >= a);
}

#[test]
fn test_rejects_bad_snr() {
    assert!(ChannelModel::new(f64::NAN, 1).is_err());
    assert!(ChannelModel::new(20.0, 1).is_ok());
}

#[test]
fn test_required_snr_penalties() {
    let base = ChannelModel::required_snr(&vht(4, Bandwidth::Mhz20, 1));
    assert_eq!(ChannelModel::required_snr(&vht(4, Bandwidth::Mhz40, 1)), base + 3.0);
    assert_eq!(ChannelModel::required_snr(&vht(4, Bandwidth::Mhz160, 1)), base + 9.0);
    assert_eq!(ChannelModel::required_snr(&vht(4, Bandwidth::Mhz20, 2)), base + 3.0);

    let mut sgi = vht(4, Bandwidth::Mhz20, 1);
    sgi.guard_interval_ns = 400;
    assert_eq!(ChannelModel::required_snr(&sgi), base + 1.0);

    // HT two-stream MCS share the per-stream requirement.
    let mut ht = vht(0, Bandwidth::Mhz20, 2);
    ht.rate = RateId::Ht(12);
    assert_eq!(ChannelModel::required_snr(&ht), 18.0 + 3.0);
}

#[test]
fn test_transmit_tracks_snr() {
    let slow = TxVector::legacy(LegacyRate::Ofdm6);
    let fast = TxVector::legacy(LegacyRate::Ofdm54);

    let mut good = ChannelModel::new(40.0, 7).unwrap();
    let (ok, failed) = good.transmit(&slow, 1_000);
    assert_eq!(ok + failed, 1_000);
    assert!(ok > 990);

    let mut bad = ChannelModel::new(5.0, 7).unwrap();
    let (ok, _) = bad.transmit(&fast, 1_000);
    assert!(ok < 10);

    assert!(good.success_probability(&fast) > bad.success_probability(&fast));
}

#[test]
fn test_seeded_channel_is_reproducible() {
    let tx = TxVector::legacy(LegacyRate::Ofdm24);
    let mut a = ChannelModel::new(13.0, 42).unwrap();
    let mut b = ChannelModel::new(13.0, 42).unwrap();
    for _ in 0..50 {
        assert_eq!(a.transmit(&tx, 16), b.transmit(&tx, 16));
    }
}
