//! Downscaled detection wrapper.
//!
//! Face detectors run much faster on a reduced frame and a talking head is
//! still large enough to find at half resolution. Boxes are mapped back to
//! source coordinates before they reach the planner.

use image::imageops::{self, FilterType};
use reframe_models::FaceBox;
use tracing::trace;

use super::{FaceObservationSource, Frame};
use crate::error::{MediaError, MediaResult};

/// Runs the inner source on a frame resized by `scale`.
pub struct ScaledSource<D> {
    inner: D,
    scale: f64,
}

impl<D: FaceObservationSource> ScaledSource<D> {
    /// Wrap `inner`, detecting on frames scaled by `scale` in (0, 1].
    pub fn new(inner: D, scale: f64) -> MediaResult<Self> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(MediaError::InvalidConfig(format!(
                "detection scale {} outside (0, 1]",
                scale
            )));
        }
        Ok(Self { inner, scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Map a box found on the scaled frame back to source pixels.
    fn unscale(&self, face: &FaceBox) -> FaceBox {
        let left = (face.center_x - face.width / 2) as f64;
        let top = (face.center_y - face.height / 2) as f64;
        FaceBox::from_corner(
            (left / self.scale) as i32,
            (top / self.scale) as i32,
            (face.width as f64 / self.scale) as i32,
            (face.height as f64 / self.scale) as i32,
            face.confidence,
        )
    }
}

impl<D: FaceObservationSource> FaceObservationSource for ScaledSource<D> {
    fn detect(&self, frame: &Frame) -> MediaResult<Vec<FaceBox>> {
        if self.scale >= 1.0 {
            return self.inner.detect(frame);
        }

        let width = ((frame.width() as f64 * self.scale) as u32).max(1);
        let height = ((frame.height() as f64 * self.scale) as u32).max(1);
        trace!(
            from_w = frame.width(),
            from_h = frame.height(),
            to_w = width,
            to_h = height,
            "Downscaling frame for detection"
        );

        let small = Frame::new(
            frame.timestamp,
            imageops::resize(&frame.image, width, height, FilterType::Triangle),
        );

        Ok(self
            .inner
            .detect(&small)?
            .iter()
            .map(|face| self.unscale(face))
            .collect())
    }

    fn ensure_ready(&self) -> MediaResult<()> {
        self.inner.ensure_ready()
    }

    fn release(&mut self) {
        self.inner.release();
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Reports one face in the middle of whatever frame it sees.
    struct CenterFace {
        seen_width: AtomicU32,
    }

    impl FaceObservationSource for CenterFace {
        fn detect(&self, frame: &Frame) -> MediaResult<Vec<FaceBox>> {
            self.seen_width.store(frame.width(), Ordering::SeqCst);
            let w = frame.width() as i32;
            let h = frame.height() as i32;
            Ok(vec![FaceBox::from_corner(w / 4, h / 4, w / 2, h / 2, 0.8)])
        }

        fn name(&self) -> &'static str {
            "center"
        }
    }

    fn frame(width: u32, height: u32) -> Frame {
        Frame::new(1.0, RgbImage::new(width, height))
    }

    #[test]
    fn test_half_scale_maps_boxes_back() {
        let source = ScaledSource::new(
            CenterFace {
                seen_width: AtomicU32::new(0),
            },
            0.5,
        )
        .unwrap();

        let faces = source.detect(&frame(400, 200)).unwrap();

        assert_eq!(source.inner().seen_width.load(Ordering::SeqCst), 200);
        assert_eq!(faces.len(), 1);
        // Scaled frame 200x100: corner (50, 25), size 100x50 -> source (100, 50), 200x100
        assert_eq!(faces[0].width, 200);
        assert_eq!(faces[0].height, 100);
        assert_eq!(faces[0].center_x, 200);
        assert_eq!(faces[0].center_y, 100);
        assert!((faces[0].confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_scale_passes_frame_through() {
        let source = ScaledSource::new(
            CenterFace {
                seen_width: AtomicU32::new(0),
            },
            1.0,
        )
        .unwrap();

        source.detect(&frame(320, 180)).unwrap();
        assert_eq!(source.inner().seen_width.load(Ordering::SeqCst), 320);
    }

    #[test]
    fn test_rejects_invalid_scale() {
        let make = || CenterFace {
            seen_width: AtomicU32::new(0),
        };
        assert!(ScaledSource::new(make(), 0.0).is_err());
        assert!(ScaledSource::new(make(), 1.2).is_err());
        assert!(ScaledSource::new(make(), f64::NAN).is_err());
    }
}
