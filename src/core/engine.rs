//! Engine facade - the front-end's single entry point into the simulation

use std::sync::Arc;
use anyhow::Result;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::pump::{PumpController, PumpError};
use crate::state::{Snapshot, StateStore};
use crate::tasks::DryingProcess;
use super::{Event, EventBus};

/// Owns the whole rig: state store, pump controller, event bus and the
/// drying process. The presentation layer only ever talks to this type:
/// it polls `snapshot` and calls `request_irrigation` / `refill_tank`.
pub struct Engine {
    config: Arc<Config>,
    store: Arc<StateStore>,
    pump: Arc<PumpController>,
    bus: Arc<EventBus>,
    shutdown_tx: broadcast::Sender<()>,
    drying: Option<JoinHandle<()>>,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let store = Arc::new(StateStore::new(&config));
        let bus = Arc::new(EventBus::new(64));
        let (shutdown_tx, _) = broadcast::channel(4);
        let pump = Arc::new(PumpController::new(
            store.clone(),
            bus.clone(),
            config.irrigation.clone(),
            config.tank.capacity,
            shutdown_tx.clone(),
        ));

        Ok(Self {
            config,
            store,
            pump,
            bus,
            shutdown_tx,
            drying: None,
        })
    }

    /// Launches the passive drying process. Call once, after construction.
    pub fn start(&mut self) {
        info!("starting irrigation rig ({} sectors)", self.config.sectors.len());
        let drying = DryingProcess::new(
            self.store.clone(),
            self.config.sector_names(),
            self.config.drying.clone(),
            self.shutdown_tx.subscribe(),
        );
        self.drying = Some(tokio::spawn(drying.run()));
    }

    /// Signals every background loop to exit at its next tick boundary and
    /// waits for the drying process to stop. An in-flight irrigation job
    /// observes the same signal and releases the pump on its way out.
    pub async fn shutdown(&mut self) {
        info!("shutting down...");
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.drying.take() {
            let _ = handle.await;
        }
        info!("engine stopped");
    }

    /// A consistent, tear-free copy of the full rig state.
    pub async fn snapshot(&self) -> Snapshot {
        self.store.snapshot().await
    }

    /// Asks the pump controller to irrigate `sector`. Returns immediately;
    /// the watering itself happens on a background task.
    pub async fn request_irrigation(&self, sector: &str) -> Result<(), PumpError> {
        self.pump.request_irrigation(sector).await
    }

    /// Refills the tank to capacity. Always succeeds.
    pub async fn refill_tank(&self) -> f64 {
        self.pump.refill().await
    }

    /// Subscribe to pump/tank status transitions.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
