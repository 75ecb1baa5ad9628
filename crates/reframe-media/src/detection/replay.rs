//! Face source backed by a precomputed detection track.
//!
//! Lets a clip be planned from detections produced earlier (by another
//! process or a previous run) without loading a model. The track is a JSON
//! list of `{"time": seconds, "faces": [FaceBox, ...]}` entries.

use std::path::Path;

use reframe_models::FaceBox;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use image::RgbImage;

use super::{FaceObservationSource, Frame, FrameProvider};
use crate::error::{MediaError, MediaResult};

/// Detections recorded for one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEntry {
    pub time: f64,
    #[serde(default)]
    pub faces: Vec<FaceBox>,
}

/// Replays recorded detections by nearest timestamp.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    entries: Vec<ReplayEntry>,
    tolerance: f64,
}

impl ReplaySource {
    /// Build from entries in any order. Entries with non-finite times are dropped.
    pub fn new(mut entries: Vec<ReplayEntry>, tolerance: f64) -> Self {
        entries.retain(|e| e.time.is_finite());
        entries.sort_by(|a, b| {
            a.time
                .partial_cmp(&b.time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { entries, tolerance }
    }

    /// Load a JSON detection track.
    pub fn from_json_file(path: impl AsRef<Path>, tolerance: f64) -> MediaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<ReplayEntry> = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            entries = entries.len(),
            "Loaded detection track"
        );
        Ok(Self::new(entries, tolerance))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry closest to `time`, if within tolerance.
    fn nearest(&self, time: f64) -> Option<&ReplayEntry> {
        let idx = self.entries.partition_point(|e| e.time < time);
        let before = idx.checked_sub(1).and_then(|i| self.entries.get(i));
        let after = self.entries.get(idx);

        let best = match (before, after) {
            (Some(b), Some(a)) => {
                if (time - b.time).abs() <= (a.time - time).abs() {
                    b
                } else {
                    a
                }
            }
            (Some(b), None) => b,
            (None, Some(a)) => a,
            (None, None) => return None,
        };

        ((best.time - time).abs() <= self.tolerance).then_some(best)
    }
}

impl FaceObservationSource for ReplaySource {
    fn detect(&self, frame: &Frame) -> MediaResult<Vec<FaceBox>> {
        match self.nearest(frame.timestamp) {
            Some(entry) => Ok(entry.faces.clone()),
            None => {
                debug!(time = frame.timestamp, "No recorded detections near sample");
                Ok(Vec::new())
            }
        }
    }

    fn ensure_ready(&self) -> MediaResult<()> {
        if self.entries.is_empty() {
            return Err(MediaError::detector_unavailable("detection track is empty"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

/// Frame provider for sources that only read the sample time.
///
/// Replayed detections never look at pixels, so no decoding happens and a
/// recorded detection is never lost to a decode failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFrames;

impl FrameProvider for TimestampFrames {
    fn frame_at(&self, timestamp: f64) -> MediaResult<Frame> {
        Ok(Frame::new(timestamp, RgbImage::new(0, 0)))
    }
}
