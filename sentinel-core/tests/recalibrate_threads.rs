//! Thread usage of the recalibrator under bursts of selections
//!
//! Kept in its own test binary so no other test threads skew the count.

#![cfg(target_os = "linux")]

use sentinel_core::{Catalog, Recalibrator};
use std::time::{Duration, Instant};

fn live_threads() -> usize {
    let status = std::fs::read_to_string("/proc/self/status").expect("failed to read /proc/self/status");
    status
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|n| n.trim().parse().ok())
        .expect("no Threads line in /proc/self/status")
}

#[test]
fn test_burst_of_selections_uses_bounded_threads() {
    let before = live_threads();

    let recalibrator = Recalibrator::new(Catalog::builtin(), Duration::from_secs(3)).unwrap();
    for _ in 0..2000 {
        recalibrator.select_id("t1").unwrap();
    }
    let last = recalibrator.select_id("t8").unwrap();

    let during = live_threads();
    assert!(
        during <= before + 1,
        "superseded selections must not hold threads: before={} during={}",
        before,
        during
    );
    assert_eq!(recalibrator.discarded(), 2000);
    assert_eq!(recalibrator.latest_token(), Some(last));

    // Dropping cancels the pending 3s wait and joins the worker
    drop(recalibrator);
    let deadline = Instant::now() + Duration::from_secs(2);
    while live_threads() > before && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(live_threads(), before);
}
