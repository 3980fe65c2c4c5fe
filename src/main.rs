// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! Fazenda - Irrigation Rig Simulation Core
//!
//! Console front-end for the simulation: polls snapshots on a fixed
//! cadence, renders tank and sector gauges, and maps CLI flags to pump
//! actions. The simulation itself lives in the library.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use fazenda::{Config, Engine, Snapshot, VERSION};

/// Fazenda - irrigation rig simulator
#[derive(Parser, Debug)]
#[command(name = "fazenda")]
#[command(version = VERSION)]
#[command(about = "Simulates a water tank, a pump and drying plant sectors")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request irrigation of this sector at startup
    #[arg(short, long)]
    irrigate: Option<String>,

    /// Refill the tank at startup
    #[arg(long)]
    refill: bool,

    /// Print snapshots as JSON lines instead of gauges
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Fazenda v{} - irrigation rig simulator", VERSION);

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_create(&config_path)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, args))
}

async fn run(config: Config, args: Args) -> Result<()> {
    let poll_ms = config.poll_ms;
    let mut engine = Engine::new(config)?;
    engine.start();

    // mirror status transitions into the log as they happen
    let mut events = engine.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("event: {:?}", event.kind);
        }
    });

    if args.refill {
        engine.refill_tank().await;
    }
    if let Some(sector) = &args.irrigate {
        if let Err(e) = engine.request_irrigation(sector).await {
            warn!("irrigation request refused: {}", e);
        }
    }

    info!("polling snapshots every {} ms, press Ctrl+C to quit", poll_ms);
    let mut poll = tokio::time::interval(std::time::Duration::from_millis(poll_ms));

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let snap = engine.snapshot().await;
                if args.json {
                    println!("{}", serde_json::to_string(&snap)?);
                } else {
                    render(&snap);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

fn render(snap: &Snapshot) {
    let pump = match &snap.pump.active_sector {
        Some(sector) => format!("irrigating {}", sector),
        None => "idle".to_string(),
    };
    let sectors = snap
        .sectors
        .iter()
        .map(|s| format!("{} {:>5.1}%", s.name, s.moisture))
        .collect::<Vec<_>>()
        .join(" | ");
    println!(
        "tank {:>7.0}/{:.0} L | pump {:<20} | {}",
        snap.tank.level, snap.tank.capacity, pump, sectors
    );
}
