//! Speaker-centred crop planning.
//!
//! # Architecture
//!
//! ```text
//! ClipGeometry
//!     │
//!     ▼
//! ┌──────────────────┐
//! │  Frame Sampler   │ ← N timestamps over [0, duration]
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Gap-Fill Select  │ ◄─► │ Observation Cache│ ◄─► FrameProvider + FaceObservationSource
//! └────────┬─────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    Smoother      │ ← centered moving average
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Center Estimator │ ← median x
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Crop Resolver   │ ← clamp to frame, even width
//! └────────┬─────────┘
//!          │
//!          ▼
//!     CropDecision
//! ```
//!
//! Everything runs on the calling thread, one sample at a time.

pub mod cache;
pub mod estimator;
pub mod resolver;
pub mod sampler;
pub mod selector;
pub mod smoothing;

pub use cache::ObservationCache;
pub use estimator::{estimate_center, median};
pub use resolver::CropResolver;
pub use sampler::{plan_samples, sample_count};
pub use selector::{fill_trajectory, GapFillSelector};
pub use smoothing::smooth_trajectory;

use std::time::Instant;

use reframe_models::{ClipGeometry, CropDecision, Observation, SamplePlan, TrajectoryPoint};
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::config::ReframeConfig;
use crate::detection::{FaceObservationSource, FrameProvider, ScaledSource};
use crate::error::{MediaError, MediaResult};
use crate::metrics;

/// Everything one planning run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub clip: ClipGeometry,
    pub decision: CropDecision,
    pub samples: SamplePlan,
    pub raw: Vec<TrajectoryPoint>,
    pub smoothed: Vec<(f64, f64)>,
    pub estimated_center: i32,
    pub detection_hits: usize,
    pub detection_misses: usize,
}

impl PlanReport {
    fn skipped(clip: ClipGeometry, decision: CropDecision) -> Self {
        Self {
            clip,
            decision,
            samples: SamplePlan::uniform(0.0, 0),
            raw: Vec::new(),
            smoothed: Vec::new(),
            estimated_center: clip.midpoint_x(),
            detection_hits: 0,
            detection_misses: 0,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.decision.is_skip()
    }
}

/// Plans speaker-centred vertical crops with a caller-owned face detector.
///
/// The tracker owns the detector for its lifetime and releases it exactly
/// once, in [`FaceTracker::close`] or on drop.
pub struct FaceTracker<D: FaceObservationSource> {
    source: D,
    config: ReframeConfig,
    resolver: CropResolver,
    cache: ObservationCache,
    released: bool,
}

impl<D: FaceObservationSource> FaceTracker<D> {
    /// Create a tracker. Fails if the config is invalid or the detector is
    /// not usable.
    pub fn new(source: D, config: ReframeConfig) -> MediaResult<Self> {
        config.validate()?;
        source.ensure_ready()?;

        info!(
            source = source.name(),
            aspect = %config.aspect_ratio,
            smoothing_window = config.smoothing_window,
            "Initialized face tracker"
        );

        Ok(Self {
            resolver: CropResolver::new(config.aspect_ratio),
            source,
            config,
            cache: ObservationCache::new(),
            released: false,
        })
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Plan the crop for one clip.
    ///
    /// Per-sample frame or detection failures are absorbed. Only invalid
    /// geometry and detector resource failures return an error.
    pub fn plan<P>(&mut self, clip: &ClipGeometry, frames: &P) -> MediaResult<PlanReport>
    where
        P: FrameProvider + ?Sized,
    {
        if clip.width == 0 || clip.height == 0 {
            return Err(MediaError::InvalidVideo(format!(
                "invalid frame size {}x{}",
                clip.width, clip.height
            )));
        }

        let span = info_span!("plan", width = clip.width, height = clip.height);
        let _guard = span.enter();
        let started = Instant::now();

        if self.resolver.should_skip(clip.width, clip.height) {
            info!("Skipping face tracking - video already in target aspect ratio");
            let decision = self
                .resolver
                .resolve(clip.width, clip.height, clip.midpoint_x());
            metrics::record_plan("skip", started.elapsed().as_secs_f64());
            return Ok(PlanReport::skipped(*clip, decision));
        }

        self.source.ensure_ready()?;

        self.cache.clear();
        let result = self.run(clip, frames);
        let cache_hits = self.cache.hits();
        self.cache.clear();
        let report = result?;

        metrics::record_samples(report.raw.len(), report.detection_misses, cache_hits);
        metrics::record_center(report.decision.plan().center_x);
        metrics::record_plan("crop", started.elapsed().as_secs_f64());

        Ok(report)
    }

    fn run<P>(&mut self, clip: &ClipGeometry, frames: &P) -> MediaResult<PlanReport>
    where
        P: FrameProvider + ?Sized,
    {
        let samples = plan_samples(clip.duration, &self.config.sampling);
        info!(
            samples = samples.len(),
            duration = clip.duration,
            source = self.source.name(),
            "Analyzing frames for face tracking"
        );

        let min_confidence = self.config.min_detection_confidence;
        let source = &self.source;
        let cache = &mut self.cache;
        let mut hits = 0usize;

        let raw = fill_trajectory(&samples, clip.midpoint_x(), |idx, time| {
            let observation = cache.get_or_compute(time, || {
                let frame = frames.frame_at(time)?;
                let faces = source
                    .detect(&frame)?
                    .into_iter()
                    .filter(|face| face.confidence >= min_confidence)
                    .collect();
                Ok(Observation::ranked(faces))
            })?;

            if let Some(face) = observation.best() {
                hits += 1;
                debug!(
                    sample = idx + 1,
                    x = face.center_x,
                    confidence = face.confidence,
                    "Found face"
                );
            }
            Ok(observation)
        })?;

        let mid_y = clip.midpoint_y() as f64;
        let positions: Vec<(f64, f64)> = raw.iter().map(|p| (p.x as f64, mid_y)).collect();
        let smoothed = smooth_trajectory(&positions, self.config.smoothing_window);
        let estimated_center = estimate_center(&smoothed, clip.width);
        let decision = self
            .resolver
            .resolve(clip.width, clip.height, estimated_center);

        let plan = decision.plan();
        info!(
            estimated_center,
            center_x = plan.center_x,
            left = plan.left,
            target_width = plan.target_width,
            hits,
            misses = raw.len() - hits,
            "Face tracking complete"
        );

        Ok(PlanReport {
            clip: *clip,
            decision,
            detection_misses: raw.len() - hits,
            detection_hits: hits,
            samples,
            raw,
            smoothed,
            estimated_center,
        })
    }

    /// Release the detector and any cached observations.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.cache.clear();
        self.source.release();
        self.released = true;
        info!(source = self.source.name(), "Face tracking resources released");
    }
}

impl<D: FaceObservationSource> FaceTracker<ScaledSource<D>> {
    /// Tracker whose detector runs on frames resized by
    /// `config.detection_scale`.
    pub fn scaled(source: D, config: ReframeConfig) -> MediaResult<Self> {
        let source = ScaledSource::new(source, config.detection_scale)?;
        Self::new(source, config)
    }
}

impl<D: FaceObservationSource> Drop for FaceTracker<D> {
    fn drop(&mut self) {
        self.release();
    }
}
