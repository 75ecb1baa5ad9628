//! Interfaces to the external face detector and frame source.
//!
//! The planner never decodes video or runs inference itself. It asks a
//! [`FrameProvider`] for the frame at each sample time and hands that frame
//! to a [`FaceObservationSource`]. Both are owned by the caller.

pub mod replay;
pub mod scaled;

pub use replay::{ReplayEntry, ReplaySource, TimestampFrames};
pub use scaled::ScaledSource;

use image::RgbImage;
use reframe_models::FaceBox;

use crate::error::MediaResult;

/// A decoded frame at a sample time.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Sample time in seconds
    pub timestamp: f64,
    /// RGB pixels
    pub image: RgbImage,
}

impl Frame {
    pub fn new(timestamp: f64, image: RgbImage) -> Self {
        Self { timestamp, image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Face detector consumed by the planner.
///
/// An empty `Vec` means "no faces". Errors from `detect` are logged and
/// treated the same as an empty result, except resource failures
/// ([`crate::MediaError::is_resource_failure`]) which abort the run.
pub trait FaceObservationSource: Send {
    /// Detect faces, returning boxes in the frame's own pixel coordinates.
    fn detect(&self, frame: &Frame) -> MediaResult<Vec<FaceBox>>;

    /// Check that the underlying model is loaded and usable.
    fn ensure_ready(&self) -> MediaResult<()> {
        Ok(())
    }

    /// Release the model. Called once when the owning tracker is closed.
    fn release(&mut self) {}

    /// Source name for logging.
    fn name(&self) -> &'static str;
}

/// Supplies decoded frames for a clip of known geometry.
pub trait FrameProvider {
    /// Frame at `timestamp` seconds. May fail per timestamp.
    fn frame_at(&self, timestamp: f64) -> MediaResult<Frame>;
}

impl<D: FaceObservationSource + ?Sized> FaceObservationSource for Box<D> {
    fn detect(&self, frame: &Frame) -> MediaResult<Vec<FaceBox>> {
        (**self).detect(frame)
    }

    fn ensure_ready(&self) -> MediaResult<()> {
        (**self).ensure_ready()
    }

    fn release(&mut self) {
        (**self).release()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
