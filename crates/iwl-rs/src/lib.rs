#![no_std]

mod history;
mod tables;
mod column;
mod scaler;
mod txvector;

pub use history::{rs_percent, OutcomeHistory, MIN_FAILURE_TH, MIN_SUCCESS_TH};
pub use tables::{TableKey, ThroughputTable, TABLE_COUNT};
pub use column::{Column, ColumnGraph, ColumnId, ColumnSet, COLUMN_COUNT};
pub use scaler::{ColumnSnapshot, Phase, RateScaler};
pub use txvector::{project, LegacyRate, RateId, TxParams, TxVector, LEGACY_RATES};

/// Checks the static tables and the column graph. Run once at start-up.
pub fn validate_static_config() -> iwl_core::IwlResult<()> {
    ThroughputTable::validate()?;
    ColumnGraph::validate()
}
