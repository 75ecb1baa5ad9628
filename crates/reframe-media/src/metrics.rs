//! Planner metrics.
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! whether a recorder (Prometheus or otherwise) is installed.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const PLANS_TOTAL: &str = "reframe_plans_total";
    pub const SAMPLES_TOTAL: &str = "reframe_samples_total";
    pub const DETECTION_MISSES_TOTAL: &str = "reframe_detection_misses_total";
    pub const CACHE_HITS_TOTAL: &str = "reframe_cache_hits_total";
    pub const PLAN_DURATION_SECONDS: &str = "reframe_plan_duration_seconds";
    pub const PLAN_CENTER_X: &str = "reframe_plan_center_x";
}

/// Record a finished plan. `outcome` is "crop" or "skip".
pub fn record_plan(outcome: &'static str, duration_secs: f64) {
    counter!(names::PLANS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::PLAN_DURATION_SECONDS).record(duration_secs);
}

/// Record per-run sample accounting.
pub fn record_samples(samples: usize, misses: usize, cache_hits: u64) {
    counter!(names::SAMPLES_TOTAL).increment(samples as u64);
    counter!(names::DETECTION_MISSES_TOTAL).increment(misses as u64);
    counter!(names::CACHE_HITS_TOTAL).increment(cache_hits);
}

/// Record the resolved crop center.
pub fn record_center(center_x: i32) {
    histogram!(names::PLAN_CENTER_X).record(center_x as f64);
}
