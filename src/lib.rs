// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! Fazenda - Irrigation Rig Simulation Core
//!
//! A toy rate simulation of a small irrigation rig: one shared water tank,
//! one exclusive pump, and a fixed set of plant sectors that dry out over
//! time and get watered one at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                       Engine                         │
//! ├──────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────────┐                 │
//! │  │   Pump     │──▶│  Irrigation    │  (one at a time)│
//! │  │ Controller │   │  Job (task)    │                 │
//! │  └────────────┘   └────────────────┘                 │
//! │        │                  │        ┌──────────────┐  │
//! │        ▼                  ▼        │   Drying     │  │
//! │  ┌──────────────────────────────┐◀─│ Process(task)│  │
//! │  │         State Store          │  └──────────────┘  │
//! │  │  tank · sectors · pump flag  │                    │
//! │  └──────────────────────────────┘                    │
//! │        │ snapshots          │ events                 │
//! │        ▼                    ▼                        │
//! │   front-end polling    event subscribers             │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The front-end (console, GUI, whatever) stays outside the core: it polls
//! [`Engine::snapshot`] on a cadence and turns user actions into
//! [`Engine::request_irrigation`] / [`Engine::refill_tank`] calls.

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod config;
pub mod core;
pub mod pump;
pub mod state;
pub mod tasks;

// Re-exports for convenience
pub use config::Config;
pub use self::core::{Engine, Event, EventBus, SimEvent};
pub use pump::{PumpController, PumpError};
pub use state::{PumpState, SectorState, Snapshot, StateStore, TankState, UnknownSector};

/// Fazenda version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fazenda name
pub const NAME: &str = "Fazenda";
