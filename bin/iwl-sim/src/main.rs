use clap::Parser;
use colored::Colorize;
use iwl_core::{Aggregation, Bandwidth};
use iwl_hal::{DeviceCapabilities, StationAddr};
use iwl_linux::{ChannelModel, SimClock};
use iwl_mvm::{ManagerConfig, RateManager};
use iwl_rs::RateId;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use log::{info, warn};

#[derive(Parser)]
#[command(about = "Drives the rate scaler against a simulated lossy link")]
struct Cli {
    /// Maximum channel width in MHz (20, 40, 80 or 160).
    #[arg(long, default_value_t = 80)] width: u16,
    #[arg(long)] no_ht: bool,
    #[arg(long)] no_vht: bool,
    /// Link SNR in dB.
    #[arg(long, default_value_t = 25.0)] snr: f64,
    /// MPDUs per A-MPDU. 1 sends single frames.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=64))] mpdus: u32,
    #[arg(long, default_value_t = 20_000)] packets: u64,
    #[arg(long, default_value_t = 1_000)] tick_us: u64,
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..))] stations: u8,
    #[arg(long)] seed: Option<u64>,
}

#[derive(Default)]
struct StationStats {
    delivered: u64,
    lost: u64,
    rate_changes: u32,
    last_rate: Option<RateId>,
}

fn station_addr(i: u8) -> StationAddr {
    StationAddr([0x02, 0x00, 0x00, 0x00, 0x00, i])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let width = Bandwidth::try_from_mhz(cli.width)?;
    let caps = DeviceCapabilities::new(width, !cli.no_ht, !cli.no_vht);
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(">>> IWL-SIM: {} HT {} VHT {} SNR {} dB seed {} <<<", width, caps.ht_supported, caps.vht_supported, cli.snr, seed);

    let clock = SimClock::new(0);
    let mut mgr = RateManager::new(Box::new(clock.clone()), ManagerConfig::new(caps))?;
    let mut channel = ChannelModel::new(cli.snr, seed)?;
    let aggregated = cli.mpdus > 1;

    let addrs: Vec<StationAddr> = (1..=cli.stations).map(station_addr).collect();
    for &addr in &addrs {
        mgr.add_station(addr)?;
        if aggregated {
            mgr.set_aggregation(addr, Aggregation::On)?;
        }
    }
    let mut stats: Vec<StationStats> = addrs.iter().map(|_| StationStats::default()).collect();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Signal received. Stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut sent = 0u64;
    while sent < cli.packets && running.load(Ordering::SeqCst) {
        for (addr, st) in addrs.iter().zip(stats.iter_mut()) {
            let tx = mgr.data_tx_vector(*addr);
            if st.last_rate != Some(tx.rate) {
                info!("{}: {} {} nss {} gi {}ns", addr, tx.rate, tx.bandwidth, tx.nss, tx.guard_interval_ns);
                if st.last_rate.is_some() {
                    st.rate_changes += 1;
                }
                st.last_rate = Some(tx.rate);
            }

            let (ok, failed) = channel.transmit(&tx, cli.mpdus);
            if aggregated {
                mgr.report_ampdu_tx_status(*addr, ok, failed)?;
            } else if ok > 0 {
                mgr.report_data_ok(*addr)?;
            } else {
                mgr.report_data_failed(*addr)?;
            }
            st.delivered += ok as u64;
            st.lost += failed as u64;
        }
        clock.advance(cli.tick_us * 1_000);
        sent += 1;
    }

    if sent < cli.packets {
        warn!("Stopped early after {} of {} rounds", sent, cli.packets);
    }

    println!("{}", format!("=== {} rounds, {:.1} s simulated ===", sent, (sent * cli.tick_us) as f64 / 1e6).bold());
    for (addr, st) in addrs.iter().zip(stats.iter()) {
        let Some(snap) = mgr.station_snapshot(*addr) else { continue };
        let total = st.delivered + st.lost;
        let delivery = if total == 0 { 0.0 } else { 100.0 * st.delivered as f64 / total as f64 };
        let delivery_str = format!("{:.1}%", delivery);
        let delivery_str = if delivery >= 90.0 {
            delivery_str.green()
        } else if delivery >= 50.0 {
            delivery_str.yellow()
        } else {
            delivery_str.red()
        };
        println!(
            "{}  {} {}  column {}  phase {:?}  delivered {} ({})  rate changes {}",
            addr.to_string().cyan(),
            snap.tx_vector.rate.to_string().bold(),
            snap.bandwidth,
            snap.column,
            snap.phase,
            st.delivered,
            delivery_str,
            st.rate_changes,
        );
    }
    Ok(())
}
