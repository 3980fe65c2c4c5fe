// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! State store - the single source of truth for tank, sectors and pump

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::Config;

/// Moisture is a percentage.
pub const MOISTURE_MAX: f64 = 100.0;

/// The water reservoir feeding all sectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankState {
    /// Current water level in litres.
    pub level: f64,
    /// Maximum level. Fixed for the process lifetime.
    pub capacity: f64,
}

/// One named plant sector and its moisture level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorState {
    /// Unique sector name, fixed at startup.
    pub name: String,
    /// Moisture in `[0, 100]`.
    pub moisture: f64,
}

/// Pump status. The mutual-exclusion token for the whole rig:
/// `active == false` implies `active_sector == None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PumpState {
    pub active: bool,
    pub active_sector: Option<String>,
}

/// A consistent, point-in-time copy of the full rig state.
///
/// Snapshots are owned values; readers render them without holding any
/// lock, and repeated snapshots with no intervening mutation are identical
/// apart from `taken_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tank: TankState,
    /// Sectors in configured order.
    pub sectors: Vec<SectorState>,
    pub pump: PumpState,
    pub taken_at: DateTime<Utc>,
}

/// A sector name outside the configured set was referenced.
///
/// From external callers this is a caller/configuration mismatch; from the
/// background processes it is an internal invariant violation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown sector: {0}")]
pub struct UnknownSector(pub String);

struct Shared {
    tank: TankState,
    sectors: Vec<SectorState>,
    pump: PumpState,
}

/// Holds all mutable rig state behind one lock.
///
/// Whole-record locking keeps every mutation an atomic read-modify-write
/// and makes `snapshot` tear-free: no reader can observe a half-applied
/// update. Every operation completes in bounded time; no long-running work
/// happens under the lock.
pub struct StateStore {
    inner: RwLock<Shared>,
}

impl StateStore {
    /// Builds the store from startup configuration. The sector set is
    /// fixed here and never changes afterwards.
    pub fn new(config: &Config) -> Self {
        let sectors = config
            .sectors
            .iter()
            .map(|s| SectorState {
                name: s.name.clone(),
                moisture: s.initial_moisture.clamp(0.0, MOISTURE_MAX),
            })
            .collect();

        Self {
            inner: RwLock::new(Shared {
                tank: TankState {
                    level: config.tank.initial_level.clamp(0.0, config.tank.capacity),
                    capacity: config.tank.capacity,
                },
                sectors,
                pump: PumpState::default(),
            }),
        }
    }

    /// Returns a consistent snapshot of tank, sectors and pump.
    pub async fn snapshot(&self) -> Snapshot {
        let shared = self.inner.read().await;
        Snapshot {
            tank: shared.tank.clone(),
            sectors: shared.sectors.clone(),
            pump: shared.pump.clone(),
            taken_at: Utc::now(),
        }
    }

    /// Adds `delta` (possibly negative) to the tank level, clamped to
    /// `[0, capacity]`. Returns the resulting level.
    pub async fn apply_tank_delta(&self, delta: f64) -> f64 {
        let mut shared = self.inner.write().await;
        let capacity = shared.tank.capacity;
        shared.tank.level = (shared.tank.level + delta).clamp(0.0, capacity);
        shared.tank.level
    }

    /// Adds `delta` to the named sector's moisture, clamped to `[0, 100]`.
    /// Returns the resulting moisture.
    pub async fn apply_sector_delta(&self, name: &str, delta: f64) -> Result<f64, UnknownSector> {
        let mut shared = self.inner.write().await;
        let sector = shared
            .sectors
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| UnknownSector(name.to_string()))?;
        sector.moisture = (sector.moisture + delta).clamp(0.0, MOISTURE_MAX);
        Ok(sector.moisture)
    }

    /// Sets the tank level directly, clamped to `[0, capacity]`.
    pub async fn set_tank(&self, level: f64) -> f64 {
        let mut shared = self.inner.write().await;
        let capacity = shared.tank.capacity;
        shared.tank.level = level.clamp(0.0, capacity);
        shared.tank.level
    }

    /// Overwrites pump status. Only the pump controller may call this; the
    /// store enforces nothing beyond the none-iff-inactive rule.
    pub async fn set_pump(&self, active: bool, sector: Option<String>) {
        let mut shared = self.inner.write().await;
        shared.pump.active = active;
        shared.pump.active_sector = if active { sector } else { None };
    }

    /// Whether `name` is in the configured sector set.
    pub async fn contains_sector(&self, name: &str) -> bool {
        let shared = self.inner.read().await;
        shared.sectors.iter().any(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn store() -> StateStore {
        StateStore::new(&Config::default())
    }

    #[tokio::test]
    async fn tank_delta_clamps_at_zero_and_capacity() {
        let s = store();

        assert_eq!(s.apply_tank_delta(-99_999.0).await, 0.0);
        assert_eq!(s.apply_tank_delta(-10.0).await, 0.0);
        assert_eq!(s.apply_tank_delta(99_999.0).await, 10_000.0);
        assert_eq!(s.apply_tank_delta(1.0).await, 10_000.0);
    }

    #[tokio::test]
    async fn sector_delta_clamps_and_rejects_unknown_names() {
        let s = store();

        assert_eq!(s.apply_sector_delta("Batata", -50.0).await.unwrap(), 0.0);
        assert_eq!(s.apply_sector_delta("Milho", 50.0).await.unwrap(), 100.0);

        let err = s.apply_sector_delta("Alface", 1.0).await.unwrap_err();
        assert_eq!(err, UnknownSector("Alface".to_string()));
    }

    #[tokio::test]
    async fn set_tank_clamps() {
        let s = store();
        assert_eq!(s.set_tank(-5.0).await, 0.0);
        assert_eq!(s.set_tank(123_456.0).await, 10_000.0);
        assert_eq!(s.set_tank(42.0).await, 42.0);
    }

    #[tokio::test]
    async fn pump_state_drops_sector_when_inactive() {
        let s = store();

        s.set_pump(true, Some("Morango".to_string())).await;
        let snap = s.snapshot().await;
        assert!(snap.pump.active);
        assert_eq!(snap.pump.active_sector.as_deref(), Some("Morango"));

        // sector name is ignored when active is false
        s.set_pump(false, Some("Morango".to_string())).await;
        let snap = s.snapshot().await;
        assert!(!snap.pump.active);
        assert!(snap.pump.active_sector.is_none());
    }

    #[tokio::test]
    async fn snapshot_is_idempotent_without_mutation() {
        let s = store();
        let a = s.snapshot().await;
        let b = s.snapshot().await;

        assert_eq!(a.tank.level, b.tank.level);
        assert_eq!(a.pump.active, b.pump.active);
        for (x, y) in a.sectors.iter().zip(b.sectors.iter()) {
            assert_eq!(x.name, y.name);
            assert_eq!(x.moisture, y.moisture);
        }
    }

    #[tokio::test]
    async fn concurrent_deltas_never_lose_updates_or_escape_bounds() {
        let s = std::sync::Arc::new(store());
        let mut handles = Vec::new();

        for i in 0..8 {
            let s = s.clone();
            let delta = if i % 2 == 0 { 3.0 } else { -3.0 };
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    let level = s.apply_tank_delta(delta).await;
                    assert!((0.0..=10_000.0).contains(&level));
                    let m = s.apply_sector_delta("Cenoura", delta).await.unwrap();
                    assert!((0.0..=100.0).contains(&m));
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // paired +3/-3 writers: net tank change is zero if no update was lost
        let snap = s.snapshot().await;
        assert_eq!(snap.tank.level, 5_000.0);
    }
}
