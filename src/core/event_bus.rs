// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! Event bus - pump and tank status transitions for observers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Status transitions the simulation announces. Purely observational:
/// the front-end can show them without diffing snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimEvent {
    IrrigationStarted { sector: String },
    IrrigationFinished { sector: String },
    TankRefilled { level: f64 },
}

/// Generic event wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: SimEvent,
}

/// Broadcast channel for sim events. Lossy for slow subscribers, which is
/// fine for status display; the snapshot remains the source of truth.
pub struct EventBus {
    event_tx: broadcast::Sender<Event>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);
        Self {
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, kind: SimEvent) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            id,
            timestamp: Utc::now(),
            kind,
        };
        // no subscribers is not an error
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }
}
