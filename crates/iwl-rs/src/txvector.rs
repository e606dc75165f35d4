#![forbid(unsafe_code)]

use iwl_core::{Aggregation, Bandwidth, GuardInterval, Mode};

/// 802.11b/a/g rates in legacy rate-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyRate {
    Dsss1,
    Dsss2,
    Dsss5_5,
    Dsss11,
    Ofdm6,
    Ofdm9,
    Ofdm12,
    Ofdm18,
    Ofdm24,
    Ofdm36,
    Ofdm48,
    Ofdm54,
}

pub const LEGACY_RATES: [LegacyRate; 12] = [
    LegacyRate::Dsss1,
    LegacyRate::Dsss2,
    LegacyRate::Dsss5_5,
    LegacyRate::Dsss11,
    LegacyRate::Ofdm6,
    LegacyRate::Ofdm9,
    LegacyRate::Ofdm12,
    LegacyRate::Ofdm18,
    LegacyRate::Ofdm24,
    LegacyRate::Ofdm36,
    LegacyRate::Ofdm48,
    LegacyRate::Ofdm54,
];

/// Lowest rate the legacy column ever transmits at (DSSS is never used).
const LEGACY_FLOOR: usize = 4;

impl LegacyRate {
    pub const fn name(self) -> &'static str {
        match self {
            LegacyRate::Dsss1 => "DsssRate1Mbps",
            LegacyRate::Dsss2 => "DsssRate2Mbps",
            LegacyRate::Dsss5_5 => "DsssRate5_5Mbps",
            LegacyRate::Dsss11 => "DsssRate11Mbps",
            LegacyRate::Ofdm6 => "OfdmRate6Mbps",
            LegacyRate::Ofdm9 => "OfdmRate9Mbps",
            LegacyRate::Ofdm12 => "OfdmRate12Mbps",
            LegacyRate::Ofdm18 => "OfdmRate18Mbps",
            LegacyRate::Ofdm24 => "OfdmRate24Mbps",
            LegacyRate::Ofdm36 => "OfdmRate36Mbps",
            LegacyRate::Ofdm48 => "OfdmRate48Mbps",
            LegacyRate::Ofdm54 => "OfdmRate54Mbps",
        }
    }

    /// Nominal rate in kbps.
    pub const fn kbps(self) -> u32 {
        match self {
            LegacyRate::Dsss1 => 1_000,
            LegacyRate::Dsss2 => 2_000,
            LegacyRate::Dsss5_5 => 5_500,
            LegacyRate::Dsss11 => 11_000,
            LegacyRate::Ofdm6 => 6_000,
            LegacyRate::Ofdm9 => 9_000,
            LegacyRate::Ofdm12 => 12_000,
            LegacyRate::Ofdm18 => 18_000,
            LegacyRate::Ofdm24 => 24_000,
            LegacyRate::Ofdm36 => 36_000,
            LegacyRate::Ofdm48 => 48_000,
            LegacyRate::Ofdm54 => 54_000,
        }
    }
}

/// Concrete rate handed to the lower layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateId {
    Legacy(LegacyRate),
    Ht(u8),
    Vht(u8),
}

impl core::fmt::Display for RateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RateId::Legacy(rate) => f.write_str(rate.name()),
            RateId::Ht(mcs) => write!(f, "HtMcs{}", mcs),
            RateId::Vht(mcs) => write!(f, "VhtMcs{}", mcs),
        }
    }
}

/// Transmission parameters for the next data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxVector {
    pub rate: RateId,
    pub guard_interval_ns: u16,
    pub antennas: u8,
    pub nss: u8,
    pub bandwidth: Bandwidth,
    pub aggregation: bool,
}

impl TxVector {
    /// Single-antenna 20MHz legacy vector, used for control frames.
    pub const fn legacy(rate: LegacyRate) -> Self {
        Self {
            rate: RateId::Legacy(rate),
            guard_interval_ns: GuardInterval::Long.duration_ns(),
            antennas: 1,
            nss: 1,
            bandwidth: Bandwidth::Mhz20,
            aggregation: false,
        }
    }
}

/// Inputs of the projection, taken from a station's current state.
#[derive(Debug, Clone, Copy)]
pub struct TxParams {
    pub mode: Mode,
    pub index: u8,
    pub antennas: u8,
    pub gi: GuardInterval,
    pub bandwidth: Bandwidth,
    pub aggregation: Aggregation,
}

/// Scaler indices 4, 6..=14 map to MCS 0..=9. Index 4 is the 6Mbps slot.
fn shift_down(index: u8) -> u8 {
    if index == 4 { 0 } else { index.saturating_sub(5) }
}

/// Highest HT MCS for one and two spatial streams.
const HT_SISO_MAX_MCS: u8 = 7;
const HT_MIMO_MAX_MCS: u8 = 15;

/// Maps scaler state to a TX vector. `vht` selects VHT MCS numbering.
///
/// The top table slots are 256-QAM rates that only VHT defines. Without VHT
/// they project to the highest HT MCS of the stream count (7 or 15), so the
/// scaler may sit at index 14 while transmitting HtMcs15.
pub fn project(params: &TxParams, vht: bool) -> TxVector {
    let nss = params.mode.spatial_streams();
    let rate = match params.mode {
        Mode::Siso => {
            let mcs = shift_down(params.index);
            if vht { RateId::Vht(mcs) } else { RateId::Ht(mcs.min(HT_SISO_MAX_MCS)) }
        }
        Mode::Mimo => {
            if vht {
                RateId::Vht(shift_down(params.index))
            } else {
                // HT numbers two-stream MCS from 8.
                let mcs = if params.index == 4 { 8 } else { params.index + 3 };
                RateId::Ht(mcs.min(HT_MIMO_MAX_MCS))
            }
        }
        Mode::Legacy => {
            let idx = (params.index as usize).clamp(LEGACY_FLOOR, LEGACY_RATES.len() - 1);
            RateId::Legacy(LEGACY_RATES[idx])
        }
    };

    TxVector {
        rate,
        guard_interval_ns: params.gi.duration_ns(),
        antennas: params.antennas,
        nss,
        bandwidth: params.bandwidth,
        aggregation: params.aggregation.is_on(),
    }
}
