#![forbid(unsafe_code)]

use iwl_core::{Aggregation, Bandwidth, GuardInterval, IwlError, IwlResult, Mode, RATES_PER_TABLE};

/// One legacy table plus SISO/MIMO x 4 widths x 2 GI x 2 aggregation.
pub const TABLE_COUNT: usize = 1 + 2 * 4 * 2 * 2;

type Row = [u16; RATES_PER_TABLE];

/// Expected throughput per rate index, taken from the iwlwifi mvm rate scaler.
/// Row order: legacy, then per mode and width the blocks
/// (LGI, no-agg) (SGI, no-agg) (LGI, agg) (SGI, agg).
static THEORETICAL_THROUGHPUT: [Row; TABLE_COUNT] = [
    // expected_tpt_legacy
    [7, 13, 35, 58, 40, 57, 72, 98, 121, 154, 177, 186, 0, 0, 0],
    // expected_tpt_siso_20MHz
    [0, 0, 0, 0, 42, 0, 76, 102, 124, 159, 183, 193, 202, 216, 0],
    [0, 0, 0, 0, 46, 0, 82, 110, 132, 168, 192, 202, 210, 225, 0],
    [0, 0, 0, 0, 49, 0, 97, 145, 192, 285, 375, 420, 464, 551, 0],
    [0, 0, 0, 0, 54, 0, 108, 160, 213, 315, 415, 465, 513, 608, 0],
    // expected_tpt_siso_40MHz
    [0, 0, 0, 0, 77, 0, 127, 160, 184, 220, 242, 250, 257, 269, 275],
    [0, 0, 0, 0, 83, 0, 135, 169, 193, 229, 250, 257, 264, 275, 280],
    [0, 0, 0, 0, 101, 0, 199, 295, 389, 570, 744, 828, 911, 1070, 1173],
    [0, 0, 0, 0, 112, 0, 220, 326, 429, 629, 819, 912, 1000, 1173, 1284],
    // expected_tpt_siso_80MHz
    [0, 0, 0, 0, 130, 0, 191, 223, 244, 273, 288, 294, 298, 305, 308],
    [0, 0, 0, 0, 138, 0, 200, 231, 251, 279, 293, 298, 302, 308, 312],
    [0, 0, 0, 0, 217, 0, 429, 634, 834, 1220, 1585, 1760, 1931, 2258, 2466],
    [0, 0, 0, 0, 241, 0, 475, 701, 921, 1343, 1741, 1931, 2117, 2468, 2691],
    // expected_tpt_siso_160MHz
    [0, 0, 0, 0, 191, 0, 244, 288, 298, 308, 313, 318, 323, 328, 330],
    [0, 0, 0, 0, 200, 0, 251, 293, 302, 312, 317, 322, 327, 332, 334],
    [0, 0, 0, 0, 439, 0, 875, 1307, 1736, 2584, 3419, 3831, 4240, 5049, 5581],
    [0, 0, 0, 0, 488, 0, 972, 1451, 1925, 2864, 3785, 4240, 4691, 5581, 6165],
    // expected_tpt_mimo2_20MHz
    [0, 0, 0, 0, 74, 0, 123, 155, 179, 213, 235, 243, 250, 261, 0],
    [0, 0, 0, 0, 81, 0, 131, 164, 187, 221, 242, 250, 256, 267, 0],
    [0, 0, 0, 0, 98, 0, 193, 286, 375, 550, 718, 799, 878, 1032, 0],
    [0, 0, 0, 0, 109, 0, 214, 316, 414, 607, 790, 879, 965, 1132, 0],
    // expected_tpt_mimo2_40MHz
    [0, 0, 0, 0, 123, 0, 182, 214, 235, 264, 279, 285, 289, 296, 300],
    [0, 0, 0, 0, 131, 0, 191, 222, 242, 270, 284, 289, 293, 300, 303],
    [0, 0, 0, 0, 200, 0, 390, 571, 741, 1067, 1365, 1505, 1640, 1894, 2053],
    [0, 0, 0, 0, 221, 0, 430, 630, 816, 1169, 1490, 1641, 1784, 2053, 2221],
    // expected_tpt_mimo2_80MHz
    [0, 0, 0, 0, 182, 0, 240, 264, 278, 299, 308, 311, 313, 317, 319],
    [0, 0, 0, 0, 190, 0, 247, 269, 282, 302, 310, 313, 315, 319, 320],
    [0, 0, 0, 0, 428, 0, 833, 1215, 1577, 2254, 2863, 3147, 3418, 3913, 4219],
    [0, 0, 0, 0, 474, 0, 920, 1338, 1732, 2464, 3116, 3418, 3705, 4225, 4545],
    // expected_tpt_mimo2_160MHz
    [0, 0, 0, 0, 240, 0, 278, 308, 313, 319, 322, 324, 328, 330, 334],
    [0, 0, 0, 0, 247, 0, 282, 310, 315, 320, 323, 325, 329, 332, 338],
    [0, 0, 0, 0, 875, 0, 1735, 2582, 3414, 5043, 6619, 7389, 8147, 9629, 10592],
    [0, 0, 0, 0, 971, 0, 1925, 2861, 3779, 5574, 7304, 8147, 8976, 10592, 11640],
];

/// Identifies one throughput table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub mode: Mode,
    pub bandwidth: Bandwidth,
    pub gi: GuardInterval,
    pub aggregation: Aggregation,
}

impl TableKey {
    pub const fn new(mode: Mode, bandwidth: Bandwidth, gi: GuardInterval, aggregation: Aggregation) -> Self {
        Self { mode, bandwidth, gi, aggregation }
    }

    /// Row of this key in the static table. Legacy rates share a single row.
    pub const fn slot(&self) -> usize {
        let mode_off = match self.mode {
            Mode::Legacy => return 0,
            Mode::Siso => 0,
            Mode::Mimo => 1,
        };
        let agg_off = match self.aggregation {
            Aggregation::Off => 0,
            Aggregation::On => 2,
        };
        let gi_off = match self.gi {
            GuardInterval::Long => 0,
            GuardInterval::Short => 1,
        };
        1 + mode_off * 16 + self.bandwidth.ordinal() * 4 + agg_off + gi_off
    }
}

/// Read-only view over the expected-throughput tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThroughputTable;

impl ThroughputTable {
    /// Row by slot number, see [`TableKey::slot`].
    pub fn row(slot: usize) -> &'static [u16; RATES_PER_TABLE] {
        &THEORETICAL_THROUGHPUT[slot]
    }

    pub fn lookup(key: TableKey) -> &'static [u16; RATES_PER_TABLE] {
        &THEORETICAL_THROUGHPUT[key.slot()]
    }

    pub fn ceiling(key: TableKey, index: usize) -> u16 {
        Self::lookup(key).get(index).copied().unwrap_or(0)
    }

    /// Best ceiling across the rates of a table.
    pub fn max_ceiling(key: TableKey) -> u16 {
        Self::lookup(key).iter().copied().max().unwrap_or(0)
    }

    /// Every table reachable by the scaler must carry at least one valid rate.
    pub fn validate() -> IwlResult<()> {
        for row in THEORETICAL_THROUGHPUT.iter() {
            if row.iter().all(|&t| t == 0) {
                return Err(IwlError::Configuration);
            }
        }
        for mode in [Mode::Siso, Mode::Mimo] {
            for bw in Bandwidth::ALL {
                for gi in [GuardInterval::Long, GuardInterval::Short] {
                    for agg in [Aggregation::Off, Aggregation::On] {
                        let key = TableKey::new(mode, bw, gi, agg);
                        // 20MHz non-legacy tops out at index 13.
                        if bw == Bandwidth::Mhz20 && Self::ceiling(key, RATES_PER_TABLE - 1) != 0 {
                            return Err(IwlError::Configuration);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
