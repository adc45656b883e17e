//! Zone risk estimation
//!
//! Global invariants enforced:
//! - Deterministic risk calculations
//! - Scores are clamped to [0, 100] before classification
//! - Level classification is monotonic in score

use crate::catalog::{Zone, ZoneCategory};
use serde::{Deserialize, Serialize};

/// Starting score before hour and noise adjustments
pub const BASE_SCORE: i64 = 20;

pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 100;

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,      // <= 30
    Medium,   // 31-60
    High,     // 61-80
    Critical, // > 80
}

/// Upper score bound (inclusive) of each level, ascending
const LEVEL_BANDS: &[(u8, RiskLevel)] = &[
    (30, RiskLevel::Low),
    (60, RiskLevel::Medium),
    (80, RiskLevel::High),
    (MAX_SCORE, RiskLevel::Critical),
];

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// Fixed explanation attached to every result at this level
    pub fn details(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Traffic flow normal.",
            RiskLevel::Medium => "Moderate traffic density.",
            RiskLevel::High => "High speed variance detected.",
            RiskLevel::Critical => "Heavy congestion + poor visibility predicted.",
        }
    }
}

/// Risk estimate for one zone at one hour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskResult {
    pub zone_id: String,
    pub score: u8,
    pub level: RiskLevel,
    pub details: String,
}

/// Score increment for a zone category at an hour
///
/// Hours outside a category's listed windows fall through to that
/// category's baseline increment.
pub fn hour_adjustment(category: ZoneCategory, hour: i32) -> i64 {
    match category {
        ZoneCategory::Urban => match hour {
            9 | 18 => 50,
            12 | 15 => 30,
            _ => 10,
        },
        ZoneCategory::Highway => match hour {
            0 | 3 => 65,
            21 => 45,
            9 => 20,
            _ => 0,
        },
        ZoneCategory::Rural => {
            if hour >= 18 || hour <= 3 {
                40
            } else {
                0
            }
        }
    }
}

/// Per-zone offset derived from the identifier length
///
/// noise = (len(id) * 7) mod 15
///
/// The length is measured in UTF-16 code units, so a zone id outside the basic
/// multilingual plane counts two per character.
pub fn zone_noise(zone_id: &str) -> i64 {
    let len = zone_id.encode_utf16().count() as i64;
    len.wrapping_mul(7).rem_euclid(15)
}

/// Classify a score into its level using the ordered band table
pub fn classify(score: u8) -> RiskLevel {
    LEVEL_BANDS
        .iter()
        .find(|(upper, _)| score <= *upper)
        .map(|(_, level)| *level)
        .unwrap_or(RiskLevel::Critical)
}

/// Clamp a raw additive score into [0, 100]
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8
}

/// Estimate the risk of a zone at the given hour
///
/// Formula:
/// score = clamp(20 + hour_adjustment(category, hour) + noise(id), 0, 100)
pub fn estimate(zone: &Zone, hour: i32) -> RiskResult {
    let raw = BASE_SCORE + hour_adjustment(zone.category, hour) + zone_noise(&zone.id);
    let score = clamp_score(raw);
    let level = classify(score);

    RiskResult {
        zone_id: zone.id.clone(),
        score,
        level,
        details: level.details().to_string(),
    }
}

/// Estimate every zone at the given hour, preserving zone order
pub fn estimate_all(zones: &[Zone], hour: i32) -> Vec<RiskResult> {
    zones.iter().map(|zone| estimate(zone, hour)).collect()
}
