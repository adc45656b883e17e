//! Sentinel core library - simulated traffic risk across zones and time slots

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Scoring and ranking are pure functions of the catalog and selected slot
// - No global mutable state; the catalog is passed in explicitly
// - No randomness; identical input yields byte-for-byte identical output
// - Derived collections are rebuilt wholesale, never patched in place

pub mod catalog;
pub mod config;
pub mod deployment;
pub mod recalibrate;
pub mod report;
pub mod risk;

pub use catalog::{Catalog, TimeSlot, Zone, ZoneCategory};
pub use config::{load_and_resolve, ResolvedConfig, SentinelConfig};
pub use deployment::{rank, DeploymentRecommendation};
pub use recalibrate::{Recalibrator, RequestToken};
pub use report::{render_json, render_sweep_json, render_sweep_text, render_text};
pub use risk::{estimate, RiskLevel, RiskResult};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Everything derived from one time slot selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SlotAssessment {
    pub slot: TimeSlot,
    pub results: Vec<RiskResult>,
    pub recommendations: Vec<DeploymentRecommendation>,
}

impl SlotAssessment {
    /// Risk result for a zone, if the zone was assessed
    pub fn result_for(&self, zone_id: &str) -> Option<&RiskResult> {
        self.results.iter().find(|r| r.zone_id == zone_id)
    }

    /// No zone crossed the deployment threshold
    pub fn is_all_clear(&self) -> bool {
        self.recommendations.is_empty()
    }
}

/// Assess every catalog zone for a slot, then rank deployments
pub fn assess(catalog: &Catalog, slot: &TimeSlot) -> SlotAssessment {
    let results = risk::estimate_all(catalog.zones(), slot.hour);
    let recommendations = rank(&results, catalog.zones());

    tracing::debug!(
        slot = %slot.id,
        hour = slot.hour,
        zones = results.len(),
        recommendations = recommendations.len(),
        "assessed time slot"
    );

    SlotAssessment {
        slot: slot.clone(),
        results,
        recommendations,
    }
}

/// Assess a slot selected by id
pub fn assess_slot_id(catalog: &Catalog, slot_id: &str) -> Result<SlotAssessment> {
    let slot = catalog
        .slot(slot_id)
        .ok_or_else(|| anyhow::anyhow!("unknown time slot: {}", slot_id))?;
    Ok(assess(catalog, slot))
}

/// Assess every slot in catalog order
pub fn sweep(catalog: &Catalog) -> Vec<SlotAssessment> {
    catalog
        .time_slots()
        .iter()
        .map(|slot| assess(catalog, slot))
        .collect()
}
