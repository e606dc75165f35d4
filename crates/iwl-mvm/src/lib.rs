#![no_std]
#![forbid(unsafe_code)]
extern crate alloc;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;

use log::{debug, info, trace, warn};

use iwl_core::{Aggregation, Bandwidth, IwlError, IwlResult};
use iwl_hal::{DeviceCapabilities, PlatformClock, StationAddr};
use iwl_rs::{validate_static_config, ColumnId, LegacyRate, Phase, RateScaler, TxVector};

#[derive(Debug, Clone, Copy)]
pub struct ManagerConfig {
    pub capabilities: DeviceCapabilities,
    /// Rate for control and management frames.
    pub control_rate: LegacyRate,
    /// Rate for data frames to stations we do not track.
    pub fallback_rate: LegacyRate,
}

impl ManagerConfig {
    pub const fn new(capabilities: DeviceCapabilities) -> Self {
        Self { capabilities, control_rate: LegacyRate::Ofdm6, fallback_rate: LegacyRate::Ofdm6 }
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new(DeviceCapabilities::default())
    }
}

/// Read-only view of one station, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationSnapshot {
    pub phase: Phase,
    pub column: ColumnId,
    pub index: u8,
    pub bandwidth: Bandwidth,
    pub aggregation: Aggregation,
    pub success_ratio: Option<u32>,
    pub average_throughput: Option<u32>,
    pub trial_active: bool,
    pub tx_vector: TxVector,
}

impl StationSnapshot {
    fn of(scaler: &RateScaler) -> Self {
        let history = scaler.current_history();
        Self {
            phase: scaler.phase(),
            column: scaler.column(),
            index: scaler.index(),
            bandwidth: scaler.bandwidth(),
            aggregation: scaler.aggregation(),
            success_ratio: history.success_ratio(),
            average_throughput: history.average_throughput(),
            trial_active: scaler.is_trial_active(),
            tx_vector: scaler.tx_vector(),
        }
    }
}

/// Host-facing rate manager. One [`RateScaler`] per associated station.
pub struct RateManager {
    clock: Box<dyn PlatformClock>,
    config: ManagerConfig,
    stations: BTreeMap<StationAddr, Box<RateScaler>>,
}

impl RateManager {
    pub fn new(clock: Box<dyn PlatformClock>, config: ManagerConfig) -> IwlResult<Self> {
        validate_static_config()?;

        let caps = config.capabilities;
        if !caps.supports_non_legacy() {
            warn!("Device supports neither HT nor VHT, staying on legacy rates");
        }
        info!(
            ">>> [RS] manager up: max width {} HT {} VHT {}",
            caps.max_width, caps.ht_supported, caps.vht_supported
        );

        Ok(Self { clock, config, stations: BTreeMap::new() })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn add_station(&mut self, addr: StationAddr) -> IwlResult<()> {
        if self.stations.contains_key(&addr) {
            warn!("Attempted to add station {} twice", addr);
            return Err(IwlError::DuplicateStation);
        }
        self.stations.insert(addr, Box::new(RateScaler::new(self.config.capabilities)));
        info!("Station {} added", addr);
        Ok(())
    }

    pub fn remove_station(&mut self, addr: StationAddr) -> IwlResult<()> {
        match self.stations.remove(&addr) {
            Some(_) => {
                info!("Station {} removed", addr);
                Ok(())
            }
            None => {
                warn!("Cannot remove station {}, not found", addr);
                Err(IwlError::UnknownStation)
            }
        }
    }

    pub fn contains(&self, addr: StationAddr) -> bool {
        self.stations.contains_key(&addr)
    }

    pub fn stations(&self) -> impl Iterator<Item = StationAddr> + '_ {
        self.stations.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    // --- TX status ---

    fn report(&mut self, addr: StationAddr, successes: u32, failures: u32, aggregated: bool) -> IwlResult<()> {
        let Some(scaler) = self.stations.get_mut(&addr) else {
            debug!("Station {} reported tx status after it was removed", addr);
            return Err(IwlError::UnknownStation);
        };
        scaler.report(successes, failures, aggregated, &*self.clock);
        Ok(())
    }

    pub fn report_data_ok(&mut self, addr: StationAddr) -> IwlResult<()> {
        self.report(addr, 1, 0, false)
    }

    pub fn report_data_failed(&mut self, addr: StationAddr) -> IwlResult<()> {
        self.report(addr, 0, 1, false)
    }

    /// Block-ack outcome for one A-MPDU.
    pub fn report_ampdu_tx_status(&mut self, addr: StationAddr, ok: u32, failed: u32) -> IwlResult<()> {
        self.report(addr, ok, failed, true)
    }

    // RTS and final-failure notifications do not feed the scaler.

    pub fn report_rts_ok(&mut self, addr: StationAddr) {
        trace!("RTS ok for {}, ignored", addr);
    }

    pub fn report_rts_failed(&mut self, addr: StationAddr) {
        trace!("RTS failed for {}, ignored", addr);
    }

    pub fn report_final_data_failed(&mut self, addr: StationAddr) {
        trace!("Final data failure for {}, ignored", addr);
    }

    /// Switches a station's A-MPDU state, e.g. when a block-ack session is set up or torn down.
    pub fn set_aggregation(&mut self, addr: StationAddr, aggregation: Aggregation) -> IwlResult<()> {
        let scaler = self.stations.get_mut(&addr).ok_or(IwlError::UnknownStation)?;
        scaler.set_aggregation(aggregation);
        Ok(())
    }

    // --- TX vectors ---

    pub fn data_tx_vector(&self, addr: StationAddr) -> TxVector {
        match self.stations.get(&addr) {
            Some(scaler) => scaler.tx_vector(),
            None => TxVector::legacy(self.config.fallback_rate),
        }
    }

    pub fn control_tx_vector(&self) -> TxVector {
        TxVector::legacy(self.config.control_rate)
    }

    pub fn station_snapshot(&self, addr: StationAddr) -> Option<StationSnapshot> {
        self.stations.get(&addr).map(|s| StationSnapshot::of(s))
    }
}
