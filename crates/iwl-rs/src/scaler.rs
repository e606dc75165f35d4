#![forbid(unsafe_code)]

use log::{debug, info, trace};

use iwl_core::{Aggregation, AntennaSet, Bandwidth, GuardInterval, Mode, RATES_PER_TABLE};
use iwl_hal::{DeviceCapabilities, PlatformClock};

use crate::column::{ColumnGraph, ColumnId, ColumnSet};
use crate::history::{rs_percent, OutcomeHistory};
use crate::tables::{TableKey, ThroughputTable, TABLE_COUNT};
use crate::txvector::{project, TxParams, TxVector};

/// Below this success ratio (percent) the rate is always lowered.
const SR_FORCE_DECREASE: u32 = 15;
/// At or above this success ratio (percent) the rate is never lowered.
const SR_NO_DECREASE: u32 = 85;

/// Stay-in-column timeout, in flush units.
const STAY_IN_COLUMN_TIMEOUT: u64 = 5;
const FLUSH_UNIT_NS: u64 = 5_000_000_000;

const HISTORY_COUNT: usize = TABLE_COUNT * RATES_PER_TABLE;

/// Neighbours of each legacy index. The legacy table interleaves DSSS and
/// OFDM rates, so the order is not monotonic in the index.
const LEGACY_G_ADJACENT: [(Option<u8>, Option<u8>); 12] = [
    (None, Some(1)),
    (Some(0), Some(2)),
    (Some(1), Some(3)),
    (Some(5), Some(6)),
    (Some(2), Some(3)),
    (Some(4), Some(3)),
    (Some(3), Some(7)),
    (Some(6), Some(8)),
    (Some(7), Some(9)),
    (Some(8), Some(10)),
    (Some(9), Some(11)),
    (Some(10), None),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLimits {
    failure: u32,
    success: u32,
    table_count: u32,
}

const LEGACY_LIMITS: ColumnLimits = ColumnLimits { failure: 160, success: 480, table_count: 160 };
const NON_LEGACY_LIMITS: ColumnLimits = ColumnLimits { failure: 400, success: 4500, table_count: 1500 };

impl ColumnLimits {
    const fn for_mode(mode: Mode) -> Self {
        if mode.is_legacy() { LEGACY_LIMITS } else { NON_LEGACY_LIMITS }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SearchCycleStarted,
    SearchCycleEnded,
    StayInColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScaleAction {
    Downscale,
    Stay,
    Upscale,
}

/// Where to go back to if a column trial does not pay off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSnapshot {
    pub column: ColumnId,
    pub index: u8,
    pub bandwidth: Bandwidth,
}

#[derive(Debug, Clone, Copy)]
struct ColumnTrial {
    rollback: ColumnSnapshot,
    baseline_tpt: u32,
}

/// Per-station rate scaling state.
pub struct RateScaler {
    caps: DeviceCapabilities,
    phase: Phase,
    column: ColumnId,
    index: u8,
    bandwidth: Bandwidth,
    aggregation: Aggregation,

    /// Present only while a column trial runs.
    trial: Option<ColumnTrial>,
    /// Always contains the current column.
    visited: ColumnSet,

    total_success: u32,
    total_failed: u32,
    table_count: u32,
    flush_timer: Option<u64>,

    histories: [OutcomeHistory; HISTORY_COUNT],
}

impl RateScaler {
    pub fn new(caps: DeviceCapabilities) -> Self {
        let histories = core::array::from_fn(|i| {
            let ceiling = ThroughputTable::row(i / RATES_PER_TABLE)[i % RATES_PER_TABLE];
            OutcomeHistory::new(ceiling)
        });

        Self {
            caps,
            phase: Phase::SearchCycleStarted,
            column: ColumnId::INITIAL,
            index: 0,
            bandwidth: Bandwidth::Mhz20,
            aggregation: Aggregation::Off,
            trial: None,
            visited: ColumnSet::only(ColumnId::INITIAL),
            total_success: 0,
            total_failed: 0,
            table_count: 0,
            flush_timer: None,
            histories,
        }
    }

    // --- Accessors ---

    pub fn capabilities(&self) -> &DeviceCapabilities { &self.caps }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn column(&self) -> ColumnId { self.column }
    pub fn mode(&self) -> Mode { self.column.mode() }
    pub fn antennas(&self) -> AntennaSet { self.column.antennas() }
    pub fn gi(&self) -> GuardInterval { self.column.gi() }
    pub fn index(&self) -> u8 { self.index }
    pub fn bandwidth(&self) -> Bandwidth { self.bandwidth }
    pub fn max_width(&self) -> Bandwidth { self.caps.max_width }
    pub fn aggregation(&self) -> Aggregation { self.aggregation }
    pub fn visited(&self) -> ColumnSet { self.visited }
    pub fn is_trial_active(&self) -> bool { self.trial.is_some() }
    pub fn rollback_snapshot(&self) -> Option<ColumnSnapshot> { self.trial.map(|t| t.rollback) }
    pub fn stay_totals(&self) -> (u32, u32) { (self.total_success, self.total_failed) }
    pub fn table_count(&self) -> u32 { self.table_count }
    pub fn flush_timer(&self) -> Option<u64> { self.flush_timer }

    pub fn table_key(&self) -> TableKey {
        TableKey::new(self.mode(), self.bandwidth, self.gi(), self.aggregation)
    }

    /// History of the rate currently in use.
    pub fn current_history(&self) -> &OutcomeHistory {
        self.history_at(self.index)
    }

    /// History of any rate slot, None if the index is out of range.
    pub fn history(&self, key: TableKey, index: u8) -> Option<&OutcomeHistory> {
        if index as usize >= RATES_PER_TABLE { return None; }
        Some(&self.histories[key.slot() * RATES_PER_TABLE + index as usize])
    }

    fn history_at(&self, index: u8) -> &OutcomeHistory {
        let slot = self.table_key().slot() * RATES_PER_TABLE + index as usize;
        &self.histories[slot]
    }

    fn current_history_mut(&mut self) -> &mut OutcomeHistory {
        let slot = self.table_key().slot() * RATES_PER_TABLE + self.index as usize;
        &mut self.histories[slot]
    }

    /// Clears all rate slots of the current (mode, width, GI, aggregation) group.
    fn clear_histories(&mut self) {
        let base = self.table_key().slot() * RATES_PER_TABLE;
        for h in &mut self.histories[base..base + RATES_PER_TABLE] {
            h.reset();
        }
    }

    /// Switches A-MPDU on or off once a block-ack session changes.
    /// Statistics of the new group start from scratch.
    pub fn set_aggregation(&mut self, aggregation: Aggregation) {
        if aggregation == self.aggregation { return; }
        self.aggregation = aggregation;
        self.clear_histories();
        debug!("LQ: aggregation {:?}, histories cleared", aggregation);
    }

    /// Parameters for the next data frame.
    pub fn tx_vector(&self) -> TxVector {
        let params = TxParams {
            mode: self.mode(),
            index: self.index,
            antennas: self.antennas().count(),
            gi: self.gi(),
            bandwidth: self.bandwidth,
            aggregation: self.aggregation,
        };
        project(&params, self.caps.vht_supported)
    }

    // --- Outcome entry point ---

    /// Feeds one transmit status into the scaler.
    /// A missed block-ack (aggregated, nothing acked) counts as a single failure.
    pub fn report(&mut self, successes: u32, failures: u32, aggregated: bool, clock: &dyn PlatformClock) {
        let failures = if aggregated && successes == 0 { 1 } else { failures };
        let now = clock.now_ns();

        let history = self.current_history_mut();
        history.record_many(true, successes);
        history.record_many(false, failures);

        if self.phase == Phase::StayInColumn {
            self.total_success = self.total_success.saturating_add(successes);
            self.total_failed = self.total_failed.saturating_add(failures);
        }

        self.rate_scaling(now);
    }

    // --- Decision logic ---

    fn rate_scaling(&mut self, now: u64) {
        let Some(current_tpt) = self.current_history().average_throughput() else {
            trace!(
                "LQ: test window {} succ {:?} total {}",
                self.index,
                self.current_history().success_count(),
                self.current_history().len()
            );
            self.stay_in_column(now);
            return;
        };

        let mut update = false;
        let mut done_search = false;
        let mut index = self.index;

        if let Some(trial) = self.trial.take() {
            let sr = self.current_history().success_ratio();
            if current_tpt > trial.baseline_tpt {
                info!(
                    "LQ: switching to column {} sr {:?} cur-tpt {} old-tpt {}",
                    self.column, sr, current_tpt, trial.baseline_tpt
                );
            } else {
                info!(
                    "LQ: back to column {} sr {:?} cur-tpt {} old-tpt {}",
                    trial.rollback.column, sr, current_tpt, trial.baseline_tpt
                );
                self.column = trial.rollback.column;
                self.bandwidth = trial.rollback.bandwidth;
                index = trial.rollback.index;
                update = true;
            }
            done_search = true;
        } else {
            let (low, high) = self.adjacent_indices();
            let low_tpt = low.and_then(|i| self.history_at(i).average_throughput());
            let high_tpt = high.and_then(|i| self.history_at(i).average_throughput());
            trace!(
                "LQ: cur_tpt {} sr {:?} low {:?} high {:?} low_tpt {:?} high_tpt {:?}",
                current_tpt, self.current_history().success_ratio(), low, high, low_tpt, high_tpt
            );

            match self.mcs_scaling(current_tpt, low, high, low_tpt, high_tpt) {
                ScaleAction::Downscale => match low {
                    Some(l) => { update = true; index = l; }
                    None => trace!("LQ: at the bottom rate, can't decrease"),
                },
                ScaleAction::Upscale => match high {
                    Some(h) => { update = true; index = h; }
                    None => trace!("LQ: at the top rate, can't increase"),
                },
                // Transmit power is not scaled.
                ScaleAction::Stay => {}
            }
        }

        if update {
            self.index = index;
        }

        self.stay_in_column(now);

        if !update && !done_search && self.phase == Phase::SearchCycleStarted && !self.current_history().is_empty() {
            match self.next_column(current_tpt) {
                Some(next) => self.start_trial(next, current_tpt),
                None => {
                    debug!("LQ: no more columns to explore, search cycle ended");
                    self.phase = Phase::SearchCycleEnded;
                    done_search = true;
                }
            }
        }

        if done_search && self.phase == Phase::SearchCycleEnded {
            self.enter_stay_in_column(now);
        }
    }

    /// Nearest valid lower and higher rate indices in the current column.
    pub fn adjacent_indices(&self) -> (Option<u8>, Option<u8>) {
        if self.mode().is_legacy() {
            return LEGACY_G_ADJACENT.get(self.index as usize).copied().unwrap_or((None, None));
        }

        let max_index = if self.bandwidth == Bandwidth::Mhz20 { 13 } else { 14 };
        let valid = |i: &u8| self.history_at(*i).max_throughput() != 0;
        let low = (0..self.index).rev().find(valid);
        let high = (self.index.saturating_add(1)..=max_index).find(valid);
        (low, high)
    }

    fn mcs_scaling(
        &self,
        current_tpt: u32,
        low: Option<u8>,
        high: Option<u8>,
        low_tpt: Option<u32>,
        high_tpt: Option<u32>,
    ) -> ScaleAction {
        let sr = self.current_history().success_ratio().unwrap_or(0);

        if sr <= rs_percent(SR_FORCE_DECREASE) || current_tpt == 0 {
            trace!("LQ: decrease rate because of low SR");
            return ScaleAction::Downscale;
        }

        if low_tpt.is_none() && high_tpt.is_none() && high.is_some() {
            trace!("LQ: no data about high/low rates, increase rate");
            return ScaleAction::Upscale;
        }

        if high_tpt.is_none() && high.is_some() && matches!(low_tpt, Some(l) if l < current_tpt) {
            trace!("LQ: no data about high rate and low rate is worse, increase rate");
            return ScaleAction::Upscale;
        }

        if matches!(high_tpt, Some(h) if h > current_tpt) {
            trace!("LQ: higher rate is better, increase rate");
            return ScaleAction::Upscale;
        }

        if let (Some(l), Some(h)) = (low_tpt, high_tpt) {
            if l < current_tpt && h < current_tpt {
                trace!("LQ: both high and low are worse, maintain rate");
                return ScaleAction::Stay;
            }
        }

        let action = match low_tpt {
            Some(l) if l > current_tpt => {
                trace!("LQ: lower rate is better");
                ScaleAction::Downscale
            }
            None if low.is_some() => {
                trace!("LQ: no data about lower rate");
                ScaleAction::Downscale
            }
            _ => ScaleAction::Stay,
        };

        if action == ScaleAction::Downscale {
            if let Some(l) = low {
                if sr >= rs_percent(SR_NO_DECREASE) {
                    trace!("LQ: SR is above no-decrease, avoid downscale");
                    return ScaleAction::Stay;
                }
                if current_tpt > 100 * self.history_at(l).max_throughput() as u32 {
                    trace!("LQ: current tpt is higher than max expected in low rate, avoid downscale");
                    return ScaleAction::Stay;
                }
            }
        }
        action
    }

    // --- Column search ---

    /// First unvisited candidate whose best rate could beat the current throughput.
    fn next_column(&self, current_tpt: u32) -> Option<ColumnId> {
        for &candidate in ColumnGraph::candidates(self.column) {
            if self.visited.contains(candidate) { continue; }

            let mode = candidate.mode();
            if !mode.is_legacy() && !self.caps.supports_non_legacy() {
                trace!("LQ: skip column {}: no HT/VHT support", candidate);
                continue;
            }

            let bw = if mode.is_legacy() { Bandwidth::Mhz20 } else { self.bandwidth };
            let key = TableKey::new(mode, bw, candidate.gi(), self.aggregation);
            let max_expected = ThroughputTable::max_ceiling(key) as u32;
            if 100 * max_expected <= current_tpt {
                trace!(
                    "LQ: skip column {}: can't beat current tpt, max expected {} current {}",
                    candidate, 100 * max_expected, current_tpt
                );
                continue;
            }
            return Some(candidate);
        }
        None
    }

    /// Starting rate in a new column.
    fn next_index(&self, target: ColumnId, target_bw: Bandwidth, current_tpt: u32) -> u8 {
        let sr = self.current_history().success_ratio().unwrap_or(0);
        let threshold = if sr >= rs_percent(SR_NO_DECREASE) {
            100 * self.current_history().max_throughput() as u32
        } else {
            current_tpt
        };

        let row = ThroughputTable::lookup(TableKey::new(target.mode(), target_bw, target.gi(), self.aggregation));
        let mut found = None;
        for (i, &tpt) in row.iter().enumerate() {
            if tpt == 0 { continue; }
            found = Some(i as u8);
            if 100 * tpt as u32 > threshold {
                trace!("LQ: found index {} tpt {} > {}", i, tpt, threshold);
                break;
            }
        }
        // Tables are validated non-empty at start-up.
        found.unwrap_or(0)
    }

    fn start_trial(&mut self, next: ColumnId, current_tpt: u32) {
        let rollback = ColumnSnapshot { column: self.column, index: self.index, bandwidth: self.bandwidth };
        let bandwidth = if next.mode().is_legacy() { Bandwidth::Mhz20 } else { self.caps.max_width };
        // Start index comes from the table at the width the column will run at, not the current one.
        let index = self.next_index(next, bandwidth, current_tpt);

        info!("LQ: trying column {} at index {} ({}), from {}", next, index, bandwidth, self.column);

        self.trial = Some(ColumnTrial { rollback, baseline_tpt: current_tpt });
        self.column = next;
        self.bandwidth = bandwidth;
        self.index = index;
        self.visited.insert(next);
        // New territory starts with clean statistics.
        self.clear_histories();
    }

    // --- Stay-in-column ---

    fn enter_stay_in_column(&mut self, now: u64) {
        debug!("LQ: moving to stay-in-column at {}", self.column);
        self.phase = Phase::StayInColumn;
        self.total_failed = 0;
        self.total_success = 0;
        self.table_count = 0;
        self.flush_timer = Some(now);
        self.visited = ColumnSet::only(self.column);
    }

    fn stay_in_column(&mut self, now: u64) {
        if self.phase != Phase::StayInColumn { return; }

        let limits = ColumnLimits::for_mode(self.mode());
        let flush_passed = self
            .flush_timer
            .map_or(false, |t| now.saturating_sub(t) >= FLUSH_UNIT_NS * STAY_IN_COLUMN_TIMEOUT);

        let failures_exceeded = self.total_failed > limits.failure;
        let successes_exceeded = self.total_success > limits.success;
        let timed_out = self.trial.is_none() && flush_passed;

        if failures_exceeded || successes_exceeded || timed_out {
            debug!(
                "LQ: stay is expired (fail {} succ {} timeout {})",
                failures_exceeded, successes_exceeded, timed_out
            );
            self.phase = Phase::SearchCycleStarted;
            self.total_failed = 0;
            self.total_success = 0;
            self.table_count = 0;
            self.flush_timer = None;
            self.visited = ColumnSet::only(self.column);
        } else {
            self.table_count += 1;
            if self.table_count > limits.table_count {
                self.table_count = 0;
                debug!("LQ: stay in table, clear the histories");
                self.clear_histories();
            }
        }
    }
}
