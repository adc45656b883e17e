//! Configuration file support for Sentinel
//!
//! Loads the zone/slot catalog and recalibration settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.sentinelrc.json` in the working directory
//! 3. `sentinel.config.json` in the working directory
//!
//! All fields are optional. Missing catalog lists fall back to the built-in ones.

use crate::catalog::{builtin_time_slots, builtin_zones, Catalog, TimeSlot, Zone};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cosmetic delay between a selection and its recomputation
pub const DEFAULT_RECALIBRATION_DELAY_MS: u64 = 400;

const MAX_RECALIBRATION_DELAY_MS: u64 = 10_000;

/// Sentinel configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentinelConfig {
    /// Replaces the built-in zone list
    #[serde(default)]
    pub zones: Option<Vec<Zone>>,

    /// Replaces the built-in time slot list
    #[serde(default)]
    pub time_slots: Option<Vec<TimeSlot>>,

    /// Delay before a selection is recomputed (default: 400)
    #[serde(default)]
    pub recalibration_delay_ms: Option<u64>,

    /// Slot id selected initially (default: first slot)
    #[serde(default)]
    pub default_slot: Option<String>,
}

/// Resolved configuration ready for use
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub catalog: Catalog,
    pub recalibration_delay: Duration,
    pub default_slot: TimeSlot,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl SentinelConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref zones) = self.zones {
            if zones.is_empty() {
                anyhow::bail!("zones must not be empty when specified");
            }
            let mut seen = HashSet::new();
            for zone in zones {
                if zone.id.trim().is_empty() {
                    anyhow::bail!("zone ids must not be empty (zone named {:?})", zone.name);
                }
                if !seen.insert(zone.id.as_str()) {
                    anyhow::bail!("duplicate zone id: {}", zone.id);
                }
            }
        }

        if let Some(ref slots) = self.time_slots {
            if slots.is_empty() {
                anyhow::bail!("time_slots must not be empty when specified");
            }
            let mut seen = HashSet::new();
            for slot in slots {
                if slot.id.trim().is_empty() {
                    anyhow::bail!("time slot ids must not be empty (slot labelled {:?})", slot.label);
                }
                if !seen.insert(slot.id.as_str()) {
                    anyhow::bail!("duplicate time slot id: {}", slot.id);
                }
            }
        }

        if let Some(delay) = self.recalibration_delay_ms {
            if delay > MAX_RECALIBRATION_DELAY_MS {
                anyhow::bail!(
                    "recalibration_delay_ms must be at most {} (got {})",
                    MAX_RECALIBRATION_DELAY_MS,
                    delay
                );
            }
        }

        if let Some(ref slot_id) = self.default_slot {
            let known = match &self.time_slots {
                Some(slots) => slots.iter().any(|s| &s.id == slot_id),
                None => builtin_time_slots().iter().any(|s| &s.id == slot_id),
            };
            if !known {
                anyhow::bail!("default_slot {:?} does not name a configured time slot", slot_id);
            }
        }

        Ok(())
    }

    /// Resolve config into the catalog and settings used at runtime
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let zones = self.zones.clone().unwrap_or_else(builtin_zones);
        let time_slots = self.time_slots.clone().unwrap_or_else(builtin_time_slots);
        let catalog = Catalog::new(zones, time_slots);

        let default_slot = match &self.default_slot {
            Some(id) => catalog.slot(id).cloned(),
            None => catalog.first_slot().cloned(),
        }
        .ok_or_else(|| anyhow::anyhow!("no time slot available to select"))?;

        Ok(ResolvedConfig {
            catalog,
            recalibration_delay: Duration::from_millis(
                self.recalibration_delay_ms
                    .unwrap_or(DEFAULT_RECALIBRATION_DELAY_MS),
            ),
            default_slot,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        SentinelConfig::default().resolve()
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.sentinelrc.json`
/// 2. `sentinel.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(SentinelConfig, PathBuf)>> {
    for name in [".sentinelrc.json", "sentinel.config.json"] {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<SentinelConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: SentinelConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from `dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (SentinelConfig::default(), None),
        }
    };

    match &source_path {
        Some(path) => tracing::info!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using built-in catalog"),
    }

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
