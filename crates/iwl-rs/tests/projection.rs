use iwl_core::{Aggregation, Bandwidth, GuardInterval, Mode};
use iwl_rs::{project, LegacyRate, RateId, TxParams, TxVector};

fn params(mode: Mode, index: u8) -> TxParams {
    TxParams {
        mode,
        index,
        antennas: mode.spatial_streams(),
        gi: GuardInterval::Long,
        bandwidth: Bandwidth::Mhz40,
        aggregation: Aggregation::Off,
    }
}

#[test]
fn test_siso_index_shift() {
    assert_eq!(project(&params(Mode::Siso, 9), true).rate, RateId::Vht(4));
    assert_eq!(project(&params(Mode::Siso, 9), false).rate, RateId::Ht(4));
    // Index 4 is MCS 0 in both directions.
    assert_eq!(project(&params(Mode::Siso, 4), true).rate, RateId::Vht(0));
    assert_eq!(project(&params(Mode::Siso, 6), false).rate, RateId::Ht(1));
    assert_eq!(project(&params(Mode::Siso, 14), true).rate, RateId::Vht(9));
}

#[test]
fn test_mimo_index_shift() {
    let ht = project(&params(Mode::Mimo, 4), false);
    assert_eq!(ht.rate, RateId::Ht(8));
    assert_eq!(ht.nss, 2);
    assert_eq!(ht.antennas, 2);

    assert_eq!(project(&params(Mode::Mimo, 9), false).rate, RateId::Ht(12));
    assert_eq!(project(&params(Mode::Mimo, 12), false).rate, RateId::Ht(15));
    assert_eq!(project(&params(Mode::Mimo, 9), true).rate, RateId::Vht(4));
}

#[test]
fn test_ht_caps_vht_only_slots() {
    // Two streams stop at HtMcs15, one stream at HtMcs7.
    assert_eq!(project(&params(Mode::Mimo, 13), false).rate, RateId::Ht(15));
    assert_eq!(project(&params(Mode::Mimo, 14), false).rate, RateId::Ht(15));
    assert_eq!(project(&params(Mode::Siso, 12), false).rate, RateId::Ht(7));
    assert_eq!(project(&params(Mode::Siso, 14), false).rate, RateId::Ht(7));

    // VHT keeps the full range.
    assert_eq!(project(&params(Mode::Mimo, 14), true).rate, RateId::Vht(9));
    assert_eq!(project(&params(Mode::Siso, 13), true).rate, RateId::Vht(8));
}

#[test]
fn test_legacy_mapping() {
    for low in 0..=4 {
        assert_eq!(project(&params(Mode::Legacy, low), false).rate, RateId::Legacy(LegacyRate::Ofdm6));
    }
    assert_eq!(project(&params(Mode::Legacy, 7), false).rate, RateId::Legacy(LegacyRate::Ofdm18));
    assert_eq!(project(&params(Mode::Legacy, 11), true).rate, RateId::Legacy(LegacyRate::Ofdm54));
}

#[test]
fn test_vector_fields() {
    let mut p = params(Mode::Siso, 7);
    p.gi = GuardInterval::Short;
    p.aggregation = Aggregation::On;
    p.bandwidth = Bandwidth::Mhz80;
    let v = project(&p, true);
    assert_eq!(v.guard_interval_ns, 400);
    assert_eq!(v.bandwidth, Bandwidth::Mhz80);
    assert!(v.aggregation);
    assert_eq!(v.nss, 1);

    let ctl = TxVector::legacy(LegacyRate::Ofdm6);
    assert_eq!(ctl.guard_interval_ns, 800);
    assert_eq!(ctl.bandwidth, Bandwidth::Mhz20);
}

#[test]
fn test_rate_names() {
    assert_eq!(format!("{}", RateId::Ht(12)), "HtMcs12");
    assert_eq!(format!("{}", RateId::Vht(4)), "VhtMcs4");
    assert_eq!(format!("{}", RateId::Legacy(LegacyRate::Dsss5_5)), "DsssRate5_5Mbps");
    assert_eq!(LegacyRate::Ofdm54.kbps(), 54_000);
}
