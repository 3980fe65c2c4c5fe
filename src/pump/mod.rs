// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! Pump controller - serializes who may irrigate, and whether at all

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::config::IrrigationConfig;
use crate::core::{EventBus, SimEvent};
use crate::state::StateStore;
use crate::tasks::IrrigationJob;

/// Why an irrigation request was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PumpError {
    /// Another irrigation job is running. Recoverable: retry later.
    #[error("pump is busy irrigating another sector")]
    Busy,

    /// No water left. Recoverable: refill first.
    #[error("tank is empty, refill before irrigating")]
    EmptyTank,

    /// The sector is not in the configured set. A caller/configuration
    /// mismatch, not a transient condition.
    #[error("unknown sector: {0}")]
    UnknownSector(String),
}

/// Gatekeeper for the single pump.
///
/// Enforces "at most one irrigation job at a time" and "no irrigation on an
/// empty tank". The request path is serialized by an internal mutex so two
/// concurrent requests can never both pass the checks.
pub struct PumpController {
    store: Arc<StateStore>,
    bus: Arc<EventBus>,
    irrigation: IrrigationConfig,
    tank_capacity: f64,
    shutdown_tx: broadcast::Sender<()>,
    gate: Mutex<()>,
}

impl PumpController {
    pub fn new(
        store: Arc<StateStore>,
        bus: Arc<EventBus>,
        irrigation: IrrigationConfig,
        tank_capacity: f64,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            store,
            bus,
            irrigation,
            tank_capacity,
            shutdown_tx,
            gate: Mutex::new(()),
        }
    }

    /// Validates preconditions and, on success, marks the pump active and
    /// spawns the irrigation job for `sector`. Returns without waiting for
    /// the job; a failed request leaves all state untouched.
    pub async fn request_irrigation(self: &Arc<Self>, sector: &str) -> Result<(), PumpError> {
        // checks and the transition to active must be atomic across callers
        let _gate = self.gate.lock().await;

        let snapshot = self.store.snapshot().await;
        if snapshot.pump.active {
            return Err(PumpError::Busy);
        }
        if snapshot.tank.level <= 0.0 {
            return Err(PumpError::EmptyTank);
        }
        if !snapshot.sectors.iter().any(|s| s.name == sector) {
            return Err(PumpError::UnknownSector(sector.to_string()));
        }

        self.store.set_pump(true, Some(sector.to_string())).await;
        self.bus.publish(SimEvent::IrrigationStarted {
            sector: sector.to_string(),
        });
        info!("pump on, irrigating {}", sector);

        let job = IrrigationJob::new(
            self.store.clone(),
            Arc::clone(self),
            self.irrigation.clone(),
            sector.to_string(),
            self.shutdown_tx.subscribe(),
        );
        tokio::spawn(job.run());

        Ok(())
    }

    /// Sets the tank to capacity. Always succeeds, independent of pump
    /// state; a running job drains against the refilled level.
    pub async fn refill(&self) -> f64 {
        let level = self.store.set_tank(self.tank_capacity).await;
        self.bus.publish(SimEvent::TankRefilled { level });
        info!("tank refilled to {} L", level);
        level
    }

    /// Clears pump-active state. Called by the owning irrigation job on
    /// every exit path, exactly once.
    pub async fn release(&self, sector: &str) {
        self.store.set_pump(false, None).await;
        self.bus.publish(SimEvent::IrrigationFinished {
            sector: sector.to_string(),
        });
        info!("pump off, {} done", sector);
    }
}
