use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::trace;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use iwl_core::Bandwidth;
use iwl_hal::PlatformClock;
use iwl_rs::{LegacyRate, RateId, TxVector};

pub struct LinuxClock(Instant);
impl LinuxClock { pub fn new() -> Self { Self(Instant::now()) } }
impl Default for LinuxClock { fn default() -> Self { Self::new() } }
impl PlatformClock for LinuxClock {
    fn now_ns(&self) -> u64 { self.0.elapsed().as_nanos() as u64 }
}

/// Manually driven clock. Clones share the same time.
#[derive(Clone, Default)]
pub struct SimClock(Arc<AtomicU64>);

impl SimClock {
    pub fn new(start_ns: u64) -> Self { Self(Arc::new(AtomicU64::new(start_ns))) }
    pub fn advance(&self, ns: u64) { self.0.fetch_add(ns, Ordering::SeqCst); }
    pub fn set(&self, ns: u64) { self.0.store(ns, Ordering::SeqCst) }
}

impl PlatformClock for SimClock {
    fn now_ns(&self) -> u64 { self.0.load(Ordering::SeqCst) }
}

/// SNR (dB) at which a 20MHz single-stream frame has even odds.
fn legacy_required_snr(rate: LegacyRate) -> f64 {
    match rate {
        LegacyRate::Dsss1 => 1.0,
        LegacyRate::Dsss2 => 3.0,
        LegacyRate::Dsss5_5 => 5.0,
        LegacyRate::Dsss11 => 8.0,
        LegacyRate::Ofdm6 => 5.0,
        LegacyRate::Ofdm9 => 6.0,
        LegacyRate::Ofdm12 => 8.0,
        LegacyRate::Ofdm18 => 10.0,
        LegacyRate::Ofdm24 => 13.0,
        LegacyRate::Ofdm36 => 17.0,
        LegacyRate::Ofdm48 => 21.0,
        LegacyRate::Ofdm54 => 23.0,
    }
}

/// BPSK 1/2 up to 256-QAM 5/6, by per-stream MCS.
const MCS_REQUIRED_SNR: [f64; 10] = [5.0, 8.0, 11.0, 14.0, 18.0, 22.0, 24.0, 25.0, 29.0, 31.0];

fn bandwidth_penalty(bw: Bandwidth) -> f64 {
    3.0 * bw.ordinal() as f64
}

/// Lossy link with a fixed SNR and a seeded loss process.
pub struct ChannelModel {
    snr_db: f64,
    /// Steepness of the success curve, per dB.
    slope: f64,
    rng: ChaCha20Rng,
}

impl ChannelModel {
    pub fn new(snr_db: f64, seed: u64) -> anyhow::Result<Self> {
        anyhow::ensure!(snr_db.is_finite(), "SNR must be a finite number of dB, got {}", snr_db);
        Ok(Self { snr_db, slope: 1.5, rng: ChaCha20Rng::seed_from_u64(seed) })
    }

    pub fn snr_db(&self) -> f64 { self.snr_db }

    pub fn set_snr_db(&mut self, snr_db: f64) { self.snr_db = snr_db; }

    /// SNR needed for 50% delivery with this vector.
    pub fn required_snr(tx: &TxVector) -> f64 {
        let base = match tx.rate {
            RateId::Legacy(rate) => return legacy_required_snr(rate),
            RateId::Ht(mcs) => MCS_REQUIRED_SNR[(mcs % 8) as usize],
            RateId::Vht(mcs) => MCS_REQUIRED_SNR[(mcs as usize).min(MCS_REQUIRED_SNR.len() - 1)],
        };
        let mut required = base + bandwidth_penalty(tx.bandwidth);
        if tx.nss > 1 {
            required += 3.0;
        }
        if tx.guard_interval_ns < 800 {
            required += 1.0;
        }
        required
    }

    pub fn success_probability(&self, tx: &TxVector) -> f64 {
        let margin = self.snr_db - Self::required_snr(tx);
        1.0 / (1.0 + (-self.slope * margin).exp())
    }

    /// Sends `mpdus` frames and returns (acked, lost).
    pub fn transmit(&mut self, tx: &TxVector, mpdus: u32) -> (u32, u32) {
        let p = self.success_probability(tx);
        let ok = (0..mpdus).filter(|_| self.rng.gen::<f64>() < p).count() as u32;
        trace!("channel: {} p={:.3} ok {}/{}", tx.rate, p, ok, mpdus);
        (ok, mpdus - ok)
    }
}
