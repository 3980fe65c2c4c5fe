// Copyright (c) 2026 fazenda contributors
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/fazenda-sim/fazenda

//! Configuration module

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Main application configuration.
///
/// Every simulation constant lives here so tests can run with different
/// rates; nothing is hard-baked into the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tank configuration
    pub tank: TankConfig,

    /// Irrigation job configuration
    pub irrigation: IrrigationConfig,

    /// Passive drying configuration
    pub drying: DryingConfig,

    /// The fixed set of plant sectors
    pub sectors: Vec<SectorConfig>,

    /// Snapshot poll cadence for the front-end, in milliseconds
    pub poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tank: TankConfig::default(),
            irrigation: IrrigationConfig::default(),
            drying: DryingConfig::default(),
            sectors: vec![
                SectorConfig::new("Morango", 40.0),
                SectorConfig::new("Cenoura", 60.0),
                SectorConfig::new("Batata", 20.0),
                SectorConfig::new("Milho", 80.0),
            ],
            poll_ms: 100,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("fazenda"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Reject configurations the simulation cannot run on.
    pub fn validate(&self) -> Result<()> {
        if self.tank.capacity <= 0.0 {
            bail!("tank capacity must be positive");
        }
        if !(0.0..=self.tank.capacity).contains(&self.tank.initial_level) {
            bail!("initial tank level must be within [0, capacity]");
        }
        if self.sectors.is_empty() {
            bail!("at least one sector is required");
        }
        let mut names = HashSet::new();
        for sector in &self.sectors {
            if sector.name.trim().is_empty() {
                bail!("sector names must not be empty");
            }
            if !names.insert(sector.name.as_str()) {
                bail!("duplicate sector name: {}", sector.name);
            }
            if !(0.0..=100.0).contains(&sector.initial_moisture) {
                bail!("initial moisture for {} must be within [0, 100]", sector.name);
            }
        }
        if self.irrigation.tick_ms == 0 || self.drying.tick_ms == 0 {
            bail!("tick intervals must be positive");
        }
        Ok(())
    }

    /// Names of all configured sectors, in configured order.
    pub fn sector_names(&self) -> Vec<String> {
        self.sectors.iter().map(|s| s.name.clone()).collect()
    }
}

/// Tank configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankConfig {
    /// Maximum water level in litres
    pub capacity: f64,

    /// Water level at startup
    pub initial_level: f64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000.0,
            initial_level: 5_000.0,
        }
    }
}

/// Irrigation job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrigationConfig {
    /// Interval between job ticks, in milliseconds
    pub tick_ms: u64,

    /// Total number of ticks per job
    pub ticks: u32,

    /// Litres drained from the tank per tick
    pub drain_per_tick: f64,

    /// Moisture added to the target sector per tick
    pub gain_per_tick: f64,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            ticks: 40,
            drain_per_tick: 10.0,
            gain_per_tick: 1.5,
        }
    }
}

/// Passive drying configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryingConfig {
    /// Interval between drying ticks, in milliseconds
    pub tick_ms: u64,

    /// Moisture removed from every sector per tick
    pub rate_per_tick: f64,
}

impl Default for DryingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            rate_per_tick: 0.1,
        }
    }
}

/// One plant sector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorConfig {
    /// Unique sector name
    pub name: String,

    /// Moisture at startup, in `[0, 100]`
    pub initial_moisture: f64,
}

impl SectorConfig {
    pub fn new(name: &str, initial_moisture: f64) -> Self {
        Self {
            name: name.to_string(),
            initial_moisture,
        }
    }
}
