//! Deployment ranking
//!
//! Turns a full set of zone risk results into a short, ordered list of
//! recommended responses.
//!
//! Global invariants enforced:
//! - At most `MAX_RECOMMENDATIONS` entries, every one scoring above `DEPLOYMENT_THRESHOLD`
//! - Output is sorted by score descending; ties keep input order
//! - An empty list means no action is required

use crate::catalog::Zone;
use crate::risk::{RiskLevel, RiskResult};
use serde::{Deserialize, Serialize};

/// Scores must exceed this to be considered for deployment
pub const DEPLOYMENT_THRESHOLD: u8 = 50;

pub const MAX_RECOMMENDATIONS: usize = 3;

/// Label used when a result references a zone missing from the catalog
pub const UNKNOWN_ZONE_NAME: &str = "Unknown Zone";

const CRITICAL_UNITS: u32 = 4;
const ALERT_UNITS: u32 = 2;

/// Recommended response for one at-risk zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeploymentRecommendation {
    pub zone_id: String,
    pub zone_name: String,
    pub risk_score: u8,
    pub units_required: u32,
    pub action: String,
}

/// Units and action text for a qualifying result
fn response_for(level: RiskLevel, zone_name: &str) -> (u32, String) {
    if level == RiskLevel::Critical {
        (
            CRITICAL_UNITS,
            format!(
                "IMMEDIATE: Deploy highway patrol and ambulance units to {}. Establish speed checkposts. High probability of collision due to visibility/speed.",
                zone_name
            ),
        )
    } else {
        (
            ALERT_UNITS,
            format!(
                "ALERT: Increase patrol visibility in {}. Monitor CCTV feeds for reckless driving patterns typical of this time window.",
                zone_name
            ),
        )
    }
}

/// Rank results and produce recommendations for the top zones
///
/// Steps:
/// 1. Keep results scoring above `DEPLOYMENT_THRESHOLD`
/// 2. Stable sort by score descending
/// 3. Take the first `MAX_RECOMMENDATIONS`
/// 4. Resolve zone names, falling back to `UNKNOWN_ZONE_NAME`
pub fn rank(results: &[RiskResult], zones: &[Zone]) -> Vec<DeploymentRecommendation> {
    let mut candidates: Vec<&RiskResult> = results
        .iter()
        .filter(|r| r.score > DEPLOYMENT_THRESHOLD)
        .collect();

    // sort_by is stable, equal scores retain input order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    candidates
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|risk| {
            let zone_name = zones
                .iter()
                .find(|z| z.id == risk.zone_id)
                .map(|z| z.name.as_str())
                .unwrap_or_else(|| {
                    tracing::warn!(zone_id = %risk.zone_id, "risk result references unknown zone");
                    UNKNOWN_ZONE_NAME
                });
            let (units_required, action) = response_for(risk.level, zone_name);

            DeploymentRecommendation {
                zone_id: risk.zone_id.clone(),
                zone_name: zone_name.to_string(),
                risk_score: risk.score,
                units_required,
                action,
            }
        })
        .collect()
}
