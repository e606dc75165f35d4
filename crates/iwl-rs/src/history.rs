#![forbid(unsafe_code)]

use iwl_core::HISTORY_WINDOW;

/// Average throughput stays unknown until this many failures...
pub const MIN_FAILURE_TH: u32 = 3;
/// ...or this many successes have been seen.
pub const MIN_SUCCESS_TH: u32 = 8;

/// Success ratio in percent, fixed point (x128).
pub const fn rs_percent(pct: u32) -> u32 {
    128 * pct
}

const WINDOW_MASK: u64 = (1u64 << HISTORY_WINDOW) - 1;

/// Tracks the last 62 transmit outcomes of one rate slot.
/// Bit 0 is the newest outcome, 1 = acked.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeHistory {
    bits: u64,
    len: u8,
    /// Theoretical ceiling of the slot, 0 when the slot is not a valid rate.
    max_throughput: u16,
}

impl OutcomeHistory {
    pub const fn new(max_throughput: u16) -> Self {
        Self { bits: 0, len: 0, max_throughput }
    }

    pub const fn max_throughput(&self) -> u16 {
        self.max_throughput
    }

    pub fn record(&mut self, success: bool) {
        // Shifting drops the oldest outcome once the window is full.
        self.bits = ((self.bits << 1) | success as u64) & WINDOW_MASK;
        if (self.len as usize) < HISTORY_WINDOW {
            self.len += 1;
        }
    }

    /// Records `count` identical outcomes. Only the last 62 can survive.
    pub fn record_many(&mut self, success: bool, count: u32) {
        for _ in 0..count.min(HISTORY_WINDOW as u32) {
            self.record(success);
        }
    }

    pub fn reset(&mut self) {
        self.bits = 0;
        self.len = 0;
    }

    pub const fn len(&self) -> u32 {
        self.len as u32
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn success_count(&self) -> Option<u32> {
        if self.is_empty() { return None; }
        Some(self.bits.count_ones())
    }

    pub fn fail_count(&self) -> Option<u32> {
        if self.is_empty() { return None; }
        Some(self.len() - self.bits.count_ones())
    }

    /// `128 * 100 * successes / total`, so 12800 is 100%.
    pub fn success_ratio(&self) -> Option<u32> {
        let succ = self.success_count()?;
        Some(rs_percent(100) * succ / self.len())
    }

    /// Measured throughput in units of ceiling x100.
    /// None until enough samples passed the minimum gates.
    pub fn average_throughput(&self) -> Option<u32> {
        let succ = self.success_count()?;
        let fail = self.len() - succ;
        if fail < MIN_FAILURE_TH && succ < MIN_SUCCESS_TH {
            return None;
        }
        let sr = self.success_ratio()?;
        Some((sr * self.max_throughput as u32 + 64) / 128)
    }
}
