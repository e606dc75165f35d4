#![forbid(unsafe_code)]

use iwl_core::{Aggregation, AntennaSet, Bandwidth, GuardInterval, IwlError, IwlResult, Mode};

use crate::tables::{TableKey, ThroughputTable};

/// The explorable (mode, antennas, GI) combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColumnId {
    LegacyAntA = 0,
    LegacyAntB,
    SisoAntA,
    SisoAntB,
    SisoAntASgi,
    SisoAntBSgi,
    Mimo2,
    Mimo2Sgi,
}

pub const COLUMN_COUNT: usize = 8;

/// A column and the order in which its neighbours are tried during search.
#[derive(Debug)]
pub struct Column {
    pub id: ColumnId,
    pub mode: Mode,
    pub antennas: AntennaSet,
    pub gi: GuardInterval,
    pub next_columns: &'static [ColumnId],
}

use ColumnId::*;

static COLUMNS: [Column; COLUMN_COUNT] = [
    Column {
        id: LegacyAntA,
        mode: Mode::Legacy,
        antennas: AntennaSet::A,
        gi: GuardInterval::Long,
        next_columns: &[LegacyAntB, SisoAntA, Mimo2],
    },
    Column {
        id: LegacyAntB,
        mode: Mode::Legacy,
        antennas: AntennaSet::B,
        gi: GuardInterval::Long,
        next_columns: &[LegacyAntA, SisoAntB, Mimo2],
    },
    Column {
        id: SisoAntA,
        mode: Mode::Siso,
        antennas: AntennaSet::A,
        gi: GuardInterval::Long,
        next_columns: &[SisoAntB, Mimo2, SisoAntASgi, LegacyAntA, LegacyAntB],
    },
    Column {
        id: SisoAntB,
        mode: Mode::Siso,
        antennas: AntennaSet::B,
        gi: GuardInterval::Long,
        next_columns: &[SisoAntA, Mimo2, SisoAntBSgi, LegacyAntA, LegacyAntB],
    },
    Column {
        id: SisoAntASgi,
        mode: Mode::Siso,
        antennas: AntennaSet::A,
        gi: GuardInterval::Short,
        next_columns: &[SisoAntBSgi, Mimo2Sgi, SisoAntA, LegacyAntA, LegacyAntB],
    },
    Column {
        id: SisoAntBSgi,
        mode: Mode::Siso,
        antennas: AntennaSet::B,
        gi: GuardInterval::Short,
        next_columns: &[SisoAntASgi, Mimo2Sgi, SisoAntB, LegacyAntA, LegacyAntB],
    },
    Column {
        id: Mimo2,
        mode: Mode::Mimo,
        antennas: AntennaSet::AB,
        gi: GuardInterval::Long,
        next_columns: &[SisoAntA, Mimo2Sgi, LegacyAntA, LegacyAntB],
    },
    Column {
        id: Mimo2Sgi,
        mode: Mode::Mimo,
        antennas: AntennaSet::AB,
        gi: GuardInterval::Short,
        next_columns: &[SisoAntASgi, Mimo2, LegacyAntA, LegacyAntB],
    },
];

impl ColumnId {
    pub const INITIAL: ColumnId = LegacyAntA;

    pub fn column(self) -> &'static Column {
        &COLUMNS[self as usize]
    }

    pub fn mode(self) -> Mode {
        self.column().mode
    }

    pub fn antennas(self) -> AntennaSet {
        self.column().antennas
    }

    pub fn gi(self) -> GuardInterval {
        self.column().gi
    }

    /// Reverse lookup from column parameters.
    pub fn find(mode: Mode, antennas: AntennaSet, gi: GuardInterval) -> Option<ColumnId> {
        COLUMNS
            .iter()
            .find(|c| c.mode == mode && c.antennas == antennas && c.gi == gi)
            .map(|c| c.id)
    }
}

impl core::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let c = self.column();
        let gi = match c.gi {
            GuardInterval::Short => "SGI",
            GuardInterval::Long => "LGI",
        };
        write!(f, "{}/{}/{}", c.mode, c.antennas, gi)
    }
}

/// Small set of columns, one bit per [`ColumnId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSet(u8);

impl ColumnSet {
    pub const fn only(id: ColumnId) -> Self {
        Self(1 << id as u8)
    }

    pub fn insert(&mut self, id: ColumnId) {
        self.0 |= 1 << id as u8;
    }

    pub const fn contains(&self, id: ColumnId) -> bool {
        self.0 & (1 << id as u8) != 0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Read-only view over the search graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnGraph;

impl ColumnGraph {
    pub fn candidates(id: ColumnId) -> &'static [ColumnId] {
        id.column().next_columns
    }

    /// Walks every column reachable from the initial one. Each must have
    /// outgoing edges and a populated table at every width it can run at.
    pub fn validate() -> IwlResult<()> {
        let mut seen = ColumnSet::only(ColumnId::INITIAL);
        let mut stack = [ColumnId::INITIAL; COLUMN_COUNT];
        let mut depth = 1;

        while depth > 0 {
            depth -= 1;
            let col = stack[depth].column();

            if col.next_columns.is_empty() {
                return Err(IwlError::Configuration);
            }
            let widths: &[Bandwidth] = if col.mode.is_legacy() { &[Bandwidth::Mhz20] } else { &Bandwidth::ALL };
            for &bw in widths {
                for agg in [Aggregation::Off, Aggregation::On] {
                    if ThroughputTable::max_ceiling(TableKey::new(col.mode, bw, col.gi, agg)) == 0 {
                        return Err(IwlError::Configuration);
                    }
                }
            }

            for &next in col.next_columns {
                if !seen.contains(next) {
                    seen.insert(next);
                    stack[depth] = next;
                    depth += 1;
                }
            }
        }
        Ok(())
    }
}
