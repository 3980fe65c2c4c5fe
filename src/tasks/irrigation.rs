// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! Irrigation job - time-bounded watering of one sector

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::IrrigationConfig;
use crate::pump::PumpController;
use crate::state::StateStore;

/// One watering run: a fixed number of ticks against a single sector.
///
/// Each tick drains the tank and raises the target sector's moisture. The
/// job runs its full duration even if the tank empties mid-run; the
/// remaining ticks simply drain nothing. Releases the pump on every exit
/// path, including shutdown.
pub struct IrrigationJob {
    store: Arc<StateStore>,
    pump: Arc<PumpController>,
    config: IrrigationConfig,
    sector: String,
    shutdown: broadcast::Receiver<()>,
}

impl IrrigationJob {
    pub fn new(
        store: Arc<StateStore>,
        pump: Arc<PumpController>,
        config: IrrigationConfig,
        sector: String,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            store,
            pump,
            config,
            sector,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let tick = Duration::from_millis(self.config.tick_ms);
        info!(
            "irrigating {} for {} ticks of {:?}",
            self.sector, self.config.ticks, tick
        );

        for n in 0..self.config.ticks {
            // shutdown is checked at every tick boundary so the loop can be
            // interrupted promptly, never mid-mutation
            tokio::select! {
                _ = sleep(tick) => {
                    let level = self.store.apply_tank_delta(-self.config.drain_per_tick).await;
                    match self
                        .store
                        .apply_sector_delta(&self.sector, self.config.gain_per_tick)
                        .await
                    {
                        Ok(moisture) => {
                            debug!(
                                "tick {}/{}: tank {:.1} L, {} at {:.1}%",
                                n + 1,
                                self.config.ticks,
                                level,
                                self.sector,
                                moisture
                            );
                        }
                        // the controller validated the sector; this cannot
                        // happen unless an invariant broke
                        Err(e) => error!("irrigation job hit invalid state: {}", e),
                    }
                }
                _ = self.shutdown.recv() => {
                    info!("irrigation of {} interrupted by shutdown", self.sector);
                    break;
                }
            }
        }

        self.pump.release(&self.sector).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::EventBus;

    fn rig(config: &Config) -> (Arc<StateStore>, Arc<PumpController>) {
        let store = Arc::new(StateStore::new(config));
        let bus = Arc::new(EventBus::new(16));
        let (shutdown_tx, _) = broadcast::channel(4);
        let pump = Arc::new(PumpController::new(
            store.clone(),
            bus,
            config.irrigation.clone(),
            config.tank.capacity,
            shutdown_tx,
        ));
        (store, pump)
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_drains_400_and_gains_60() {
        let config = Config::default();
        let (store, pump) = rig(&config);

        pump.request_irrigation("Cenoura").await.unwrap();
        // 40 ticks x 100 ms
        sleep(Duration::from_millis(4_050)).await;

        let snap = store.snapshot().await;
        assert_eq!(snap.tank.level, 4_600.0);
        let cenoura = snap.sectors.iter().find(|s| s.name == "Cenoura").unwrap();
        // 60 + 1.5 * 40 = 120, clamped
        assert_eq!(cenoura.moisture, 100.0);
        assert!(!snap.pump.active);
        assert!(snap.pump.active_sector.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn job_keeps_ticking_after_tank_runs_dry() {
        let mut config = Config::default();
        config.tank.initial_level = 50.0;
        config.sectors = vec![crate::config::SectorConfig::new("Batata", 0.0)];
        let (store, pump) = rig(&config);

        pump.request_irrigation("Batata").await.unwrap();
        sleep(Duration::from_millis(4_050)).await;

        let snap = store.snapshot().await;
        // dry after 5 ticks, but all 40 ticks still run
        assert_eq!(snap.tank.level, 0.0);
        assert_eq!(snap.sectors[0].moisture, 60.0);
        assert!(!snap.pump.active);
    }

    #[tokio::test(start_paused = true)]
    async fn refill_mid_run_feeds_the_remaining_ticks() {
        let config = Config::default();
        let (store, pump) = rig(&config);

        pump.request_irrigation("Milho").await.unwrap();
        // 20 of 40 ticks elapse
        sleep(Duration::from_millis(2_050)).await;
        assert_eq!(store.snapshot().await.tank.level, 4_800.0);

        pump.refill().await;
        sleep(Duration::from_millis(2_050)).await;

        let snap = store.snapshot().await;
        // remaining 20 ticks drain against the refilled level
        assert_eq!(snap.tank.level, 9_800.0);
        assert!(!snap.pump.active);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_job_and_releases_the_pump() {
        let config = Config::default();
        let store = Arc::new(StateStore::new(&config));
        let bus = Arc::new(EventBus::new(16));
        let (shutdown_tx, _) = broadcast::channel(4);
        let pump = Arc::new(PumpController::new(
            store.clone(),
            bus,
            config.irrigation.clone(),
            config.tank.capacity,
            shutdown_tx.clone(),
        ));

        pump.request_irrigation("Morango").await.unwrap();
        sleep(Duration::from_millis(1_050)).await;
        shutdown_tx.send(()).unwrap();
        // one more tick boundary for the job to observe the signal
        sleep(Duration::from_millis(200)).await;

        let snap = store.snapshot().await;
        assert!(!snap.pump.active);
        // 10 ticks ran before the signal
        assert_eq!(snap.tank.level, 4_900.0);
    }
}
