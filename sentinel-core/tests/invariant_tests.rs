//! Invariant Tests
//!
//! These tests explicitly validate invariants that must always hold for any
//! zone, hour or selection sequence.

use sentinel_core::deployment::{DEPLOYMENT_THRESHOLD, MAX_RECOMMENDATIONS};
use sentinel_core::risk::classify;
use sentinel_core::{
    estimate, rank, sweep, Catalog, Recalibrator, RiskLevel, RiskResult, Zone, ZoneCategory,
};
use std::time::Duration;

const CATEGORIES: [ZoneCategory; 3] = [ZoneCategory::Urban, ZoneCategory::Highway, ZoneCategory::Rural];

fn synthetic_zones() -> Vec<Zone> {
    let mut zones = Vec::new();
    for (i, category) in CATEGORIES.iter().enumerate() {
        for len in 0..20 {
            let id = format!("{}{}", i, "z".repeat(len));
            zones.push(Zone::new(id.clone(), id, *category));
        }
    }
    zones
}

fn result(zone_id: &str, score: u8) -> RiskResult {
    let level = classify(score);
    RiskResult {
        zone_id: zone_id.to_string(),
        score,
        level,
        details: level.details().to_string(),
    }
}

#[test]
fn test_score_always_in_range() {
    let hours = (-48..=48).chain([i32::MIN, i32::MIN + 1, i32::MAX - 1, i32::MAX]);
    let zones = synthetic_zones();
    for hour in hours {
        for zone in &zones {
            let r = estimate(zone, hour);
            assert!(r.score <= 100, "{} at {} scored {}", zone.id, hour, r.score);
            assert_eq!(r.level, classify(r.score));
            assert_eq!(r.details, r.level.details());
        }
    }
}

#[test]
fn test_estimate_is_deterministic() {
    for zone in synthetic_zones() {
        for hour in [0, 3, 6, 9, 12, 15, 18, 21] {
            assert_eq!(estimate(&zone, hour), estimate(&zone, hour));
        }
    }
}

#[test]
fn test_exact_band_boundaries() {
    let cases = [
        (30, RiskLevel::Low),
        (31, RiskLevel::Medium),
        (60, RiskLevel::Medium),
        (61, RiskLevel::High),
        (80, RiskLevel::High),
        (81, RiskLevel::Critical),
    ];
    for (score, level) in cases {
        assert_eq!(classify(score), level, "score {}", score);
    }
}

#[test]
fn test_rank_invariants_over_every_slot() {
    let catalog = Catalog::builtin();
    for assessment in sweep(&catalog) {
        let recs = &assessment.recommendations;
        assert!(recs.len() <= MAX_RECOMMENDATIONS);
        assert!(recs.iter().all(|r| r.risk_score > DEPLOYMENT_THRESHOLD));
        assert!(recs.windows(2).all(|w| w[0].risk_score >= w[1].risk_score));

        // Nothing left out scores higher than the last recommendation
        if recs.len() == MAX_RECOMMENDATIONS {
            let floor = recs[MAX_RECOMMENDATIONS - 1].risk_score;
            let above = assessment.results.iter().filter(|r| r.score > floor).count();
            assert!(above < MAX_RECOMMENDATIONS);
        }
    }
}

#[test]
fn test_rank_preserves_input_order_among_ties() {
    let results: Vec<RiskResult> = ["e", "d", "c", "b", "a"]
        .iter()
        .map(|id| result(id, 70))
        .collect();
    let recs = rank(&results, &[]);
    let ids: Vec<&str> = recs.iter().map(|r| r.zone_id.as_str()).collect();
    assert_eq!(ids, vec!["e", "d", "c"]);
}

#[test]
fn test_rank_empty_when_nothing_exceeds_threshold() {
    let results: Vec<RiskResult> = (0..=DEPLOYMENT_THRESHOLD)
        .map(|score| result(&format!("z{}", score), score))
        .collect();
    assert!(rank(&results, &[]).is_empty());
}

#[test]
fn test_reselection_yields_single_result_for_last_slot() {
    let recalibrator = Recalibrator::new(Catalog::builtin(), Duration::from_millis(200)).unwrap();
    for slot in ["t1", "t2", "t3", "t4", "t5", "t6"] {
        recalibrator.select_id(slot).unwrap();
    }
    let last = recalibrator.select_id("t8").unwrap();

    let assessment = recalibrator.wait_latest().unwrap();
    assert_eq!(assessment.slot.id, "t8");
    assert_eq!(recalibrator.applied_token(), Some(last));

    // The single worker has settled every earlier request by now
    assert_eq!(recalibrator.discarded(), 6);
    assert_eq!(recalibrator.applied_token(), Some(last));
}

#[test]
fn test_selection_after_apply_replaces_result() {
    let recalibrator = Recalibrator::new(Catalog::builtin(), Duration::ZERO).unwrap();
    recalibrator.select_id("t1").unwrap();
    assert_eq!(recalibrator.wait_latest().unwrap().slot.id, "t1");

    recalibrator.select_id("t4").unwrap();
    let assessment = recalibrator.wait_latest().unwrap();
    assert_eq!(assessment.slot.id, "t4");
    assert_eq!(recalibrator.discarded(), 0);
}
