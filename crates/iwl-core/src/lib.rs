#![no_std]
#[cfg(feature = "std")]
extern crate std;

/// Outcomes remembered per rate slot.
pub const HISTORY_WINDOW: usize = 62;

/// Rate slots per throughput table (MCS index 0..=14).
pub const RATES_PER_TABLE: usize = 15;

/// Transmission mode of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// 802.11a/g rates, one antenna.
    Legacy,
    /// One spatial stream (HT/VHT).
    Siso,
    /// Two spatial streams (HT/VHT).
    Mimo,
}

impl Mode {
    pub const fn is_legacy(self) -> bool {
        matches!(self, Mode::Legacy)
    }

    pub const fn spatial_streams(self) -> u8 {
        match self {
            Mode::Mimo => 2,
            _ => 1,
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Mode::Legacy => "LEGACY",
            Mode::Siso => "SISO",
            Mode::Mimo => "MIMO2",
        };
        f.write_str(s)
    }
}

/// The hardware supports at most three chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Antenna {
    A = 0,
    B = 1,
    C = 2,
}

/// Set of transmit chains, one bit per [`Antenna`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct AntennaSet(u8);

impl AntennaSet {
    pub const EMPTY: Self = Self(0);
    pub const A: Self = Self::single(Antenna::A);
    pub const B: Self = Self::single(Antenna::B);
    pub const C: Self = Self::single(Antenna::C);
    pub const AB: Self = Self::A.with(Antenna::B);

    pub const fn single(ant: Antenna) -> Self {
        Self(1 << ant as u8)
    }

    pub const fn with(self, ant: Antenna) -> Self {
        Self(self.0 | (1 << ant as u8))
    }

    pub const fn contains(self, ant: Antenna) -> bool {
        self.0 & (1 << ant as u8) != 0
    }

    pub const fn count(self) -> u8 {
        self.0.count_ones() as u8
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for AntennaSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (ant, name) in [(Antenna::A, 'A'), (Antenna::B, 'B'), (Antenna::C, 'C')] {
            if self.contains(ant) {
                core::fmt::Write::write_char(f, name)?;
            }
        }
        Ok(())
    }
}

/// Guard interval duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuardInterval {
    Short,
    Long,
}

impl GuardInterval {
    /// Duration in nanoseconds as carried in the TX vector.
    pub const fn duration_ns(self) -> u16 {
        match self {
            GuardInterval::Short => 400,
            GuardInterval::Long => 800,
        }
    }
}

/// Channel width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bandwidth {
    Mhz20,
    Mhz40,
    Mhz80,
    Mhz160,
}

impl Bandwidth {
    pub const ALL: [Bandwidth; 4] = [Bandwidth::Mhz20, Bandwidth::Mhz40, Bandwidth::Mhz80, Bandwidth::Mhz160];

    pub const fn mhz(self) -> u16 {
        match self {
            Bandwidth::Mhz20 => 20,
            Bandwidth::Mhz40 => 40,
            Bandwidth::Mhz80 => 80,
            Bandwidth::Mhz160 => 160,
        }
    }

    /// Position in [`Bandwidth::ALL`].
    pub const fn ordinal(self) -> usize {
        match self {
            Bandwidth::Mhz20 => 0,
            Bandwidth::Mhz40 => 1,
            Bandwidth::Mhz80 => 2,
            Bandwidth::Mhz160 => 3,
        }
    }

    /// Width reported by a PHY. Anything that is not 20/40/80 is treated as 160.
    pub const fn from_device_width(mhz: u16) -> Self {
        match mhz {
            20 => Bandwidth::Mhz20,
            40 => Bandwidth::Mhz40,
            80 => Bandwidth::Mhz80,
            _ => Bandwidth::Mhz160,
        }
    }

    /// Strict conversion for user-supplied widths.
    pub fn try_from_mhz(mhz: u16) -> IwlResult<Self> {
        match mhz {
            20 => Ok(Bandwidth::Mhz20),
            40 => Ok(Bandwidth::Mhz40),
            80 => Ok(Bandwidth::Mhz80),
            160 => Ok(Bandwidth::Mhz160),
            _ => Err(IwlError::InvalidBandwidth),
        }
    }
}

impl core::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}MHz", self.mhz())
    }
}

/// A-MPDU aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Aggregation {
    #[default]
    Off,
    On,
}

impl Aggregation {
    pub const fn is_on(self) -> bool {
        matches!(self, Aggregation::On)
    }
}

impl From<bool> for Aggregation {
    fn from(on: bool) -> Self {
        if on { Aggregation::On } else { Aggregation::Off }
    }
}

pub type IwlResult<T> = Result<T, IwlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IwlError {
    /// Static tables or column graph are incomplete.
    Configuration,
    UnknownStation,
    DuplicateStation,
    InvalidBandwidth,
    InvalidState,
}

impl core::fmt::Display for IwlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IwlError {}
