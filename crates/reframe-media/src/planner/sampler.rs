//! Adaptive temporal sampling.
//!
//! Detector calls dominate planning time, so the number of analysed frames
//! is a small step function of clip length. The two regimes share N = 6 at
//! the boundary so sampling density does not jump.

use reframe_models::SamplePlan;

use crate::config::SamplingConfig;

/// Number of frames to analyse for a clip of `duration` seconds.
///
/// Non-finite or negative durations count as zero. An unvalidated config
/// whose minimum exceeds its maximum yields the maximum.
pub fn sample_count(duration: f64, config: &SamplingConfig) -> usize {
    let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };

    if duration > config.regime_boundary_secs {
        let n = (duration / config.long_divisor).round() as usize;
        bounded(n, config.long_min, config.long_max)
    } else {
        let n = (duration / config.short_divisor).round() as usize;
        bounded(n, config.short_min, config.short_max)
    }
}

fn bounded(n: usize, min: usize, max: usize) -> usize {
    n.max(min).min(max)
}

/// Uniformly spaced sample times over `[0, duration]`.
pub fn plan_samples(duration: f64, config: &SamplingConfig) -> SamplePlan {
    let count = sample_count(duration, config);
    let span = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
    SamplePlan::uniform(span, count)
}
