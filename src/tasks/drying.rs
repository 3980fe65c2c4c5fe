// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! Passive drying - the sun, on a timer

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{error, info, trace};

use crate::config::DryingConfig;
use crate::state::StateStore;

/// Long-lived ticker that dries every sector a little on each tick.
///
/// Runs for the whole process lifetime, independent of pump activity,
/// until the shutdown signal arrives.
pub struct DryingProcess {
    store: Arc<StateStore>,
    sectors: Vec<String>,
    config: DryingConfig,
    shutdown: broadcast::Receiver<()>,
}

impl DryingProcess {
    pub fn new(
        store: Arc<StateStore>,
        sectors: Vec<String>,
        config: DryingConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            store,
            sectors,
            config,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(Duration::from_millis(self.config.tick_ms));
        // the first interval tick fires immediately; skip it so sectors
        // only start drying one full interval after startup
        ticker.tick().await;

        info!(
            "drying process running, -{} moisture every {} ms",
            self.config.rate_per_tick, self.config.tick_ms
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for name in &self.sectors {
                        match self.store.apply_sector_delta(name, -self.config.rate_per_tick).await {
                            Ok(moisture) => trace!("{} dried to {:.1}%", name, moisture),
                            // the sector set is fixed at startup; a miss here
                            // is a broken invariant, not a transient fault
                            Err(e) => error!("drying process hit invalid state: {}", e),
                        }
                    }
                }
                _ = self.shutdown.recv() => {
                    info!("drying process shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn n_ticks_dry_every_sector_by_rate_times_n() {
        let config = Config::default();
        let store = Arc::new(StateStore::new(&config));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let process = DryingProcess::new(
            store.clone(),
            config.sector_names(),
            config.drying.clone(),
            shutdown_rx,
        );
        let handle = tokio::spawn(process.run());

        // 7 ticks x 500 ms
        sleep(Duration::from_millis(3_600)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        let snap = store.snapshot().await;
        for (sector, initial) in snap.sectors.iter().zip([40.0, 60.0, 20.0, 80.0]) {
            assert!((sector.moisture - (initial - 0.7)).abs() < 1e-9);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn drying_clamps_at_zero() {
        let mut config = Config::default();
        config.sectors = vec![crate::config::SectorConfig::new("Batata", 0.3)];
        config.drying.tick_ms = 100;
        let store = Arc::new(StateStore::new(&config));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let process = DryingProcess::new(
            store.clone(),
            config.sector_names(),
            config.drying.clone(),
            shutdown_rx,
        );
        let handle = tokio::spawn(process.run());

        // far more ticks than 0.3 moisture can absorb
        sleep(Duration::from_millis(2_050)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        assert_eq!(store.snapshot().await.sectors[0].moisture, 0.0);
    }
}
