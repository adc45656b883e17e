//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering (catalog order for zones, rank order for deployments)
//! - Byte-for-byte identical output across runs

use crate::{Catalog, RiskLevel, RiskResult, SlotAssessment};

const NO_ANOMALY_MESSAGE: &str = "No critical anomalies detected for this time window.";
const STANDARD_PATROL_MESSAGE: &str = "Standard patrol routines advised.";

/// Render a single slot assessment as text
///
/// The catalog supplies zone names and categories for the heatmap rows.
pub fn render_text(catalog: &Catalog, assessment: &SlotAssessment) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Time window: {} ({})\n\n",
        assessment.slot.label, assessment.slot.id
    ));

    // Heatmap
    output.push_str(&format!(
        "{:<12} {:<24} {:<8} {:>6} {:<9} {}\n",
        "ZONE", "NAME", "TYPE", "RISK", "LEVEL", "DETAILS"
    ));
    for result in &assessment.results {
        let zone = catalog.zone(&result.zone_id);
        output.push_str(&format!(
            "{:<12} {:<24} {:<8} {:>5}% {:<9} {}\n",
            truncate_or_pad(&result.zone_id, 12),
            truncate_or_pad(zone.map(|z| z.name.as_str()).unwrap_or("-"), 24),
            zone.map(|z| z.category.as_str()).unwrap_or("-"),
            result.score,
            result.level.as_str(),
            result.details,
        ));
    }

    // Deployment strategy
    output.push_str("\nDeployment strategy\n");
    if assessment.recommendations.is_empty() {
        output.push_str(&format!("  {}\n  {}\n", NO_ANOMALY_MESSAGE, STANDARD_PATROL_MESSAGE));
        return output;
    }

    for (idx, rec) in assessment.recommendations.iter().enumerate() {
        output.push_str(&format!(
            "  PRIORITY #{} {} - {}% - {} - {} units required\n    {}\n",
            idx + 1,
            rec.zone_name,
            rec.risk_score,
            assessment.slot.label,
            rec.units_required,
            rec.action,
        ));
    }

    output
}

/// Render a single slot assessment as JSON
pub fn render_json(assessment: &SlotAssessment) -> String {
    serde_json::to_string_pretty(assessment).unwrap_or_else(|_| "{}".to_string())
}

/// Render every slot as a zone by slot score matrix
pub fn render_sweep_text(assessments: &[SlotAssessment]) -> String {
    let mut output = String::new();
    let Some(first) = assessments.first() else {
        return output;
    };

    output.push_str(&format!("{:<12}", "ZONE"));
    for assessment in assessments {
        output.push_str(&format!(" {:>6}", assessment.slot.id));
    }
    output.push('\n');

    for (row, result) in first.results.iter().enumerate() {
        output.push_str(&truncate_or_pad(&result.zone_id, 12));
        for assessment in assessments {
            match assessment.results.get(row) {
                Some(r) => output.push_str(&format!(" {:>5}{}", r.score, level_marker(r))),
                None => output.push_str(&format!(" {:>6}", "-")),
            }
        }
        output.push('\n');
    }

    output.push_str("\nMarkers: ' ' low, '.' medium, '+' high, '!' critical\n");
    for assessment in assessments {
        let top: Vec<&str> = assessment
            .recommendations
            .iter()
            .map(|r| r.zone_id.as_str())
            .collect();
        let top = if top.is_empty() {
            "-".to_string()
        } else {
            top.join(", ")
        };
        output.push_str(&format!("{:<4} {:<15} {}\n", assessment.slot.id, assessment.slot.label, top));
    }

    output
}

/// Render every slot as JSON
pub fn render_sweep_json(assessments: &[SlotAssessment]) -> String {
    serde_json::to_string_pretty(assessments).unwrap_or_else(|_| "[]".to_string())
}

fn level_marker(result: &RiskResult) -> char {
    match result.level {
        RiskLevel::Low => ' ',
        RiskLevel::Medium => '.',
        RiskLevel::High => '+',
        RiskLevel::Critical => '!',
    }
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
