//! Boundary-safe crop window derivation.

use reframe_models::{AspectRatio, CropDecision, CropPlan};

/// Turns an estimated center into a crop window that fits the frame.
#[derive(Debug, Clone, Copy)]
pub struct CropResolver {
    aspect_ratio: AspectRatio,
}

impl Default for CropResolver {
    fn default() -> Self {
        Self::new(AspectRatio::PORTRAIT)
    }
}

impl CropResolver {
    pub fn new(aspect_ratio: AspectRatio) -> Self {
        Self { aspect_ratio }
    }

    /// Even crop width for a frame of this height.
    pub fn target_width(&self, frame_height: u32) -> i32 {
        self.aspect_ratio.even_width_for_height(frame_height) as i32
    }

    /// Whether the frame is already at or narrower than the target.
    pub fn should_skip(&self, frame_width: u32, frame_height: u32) -> bool {
        let target = self.target_width(frame_height);
        target <= 0 || frame_width as i64 <= target as i64
    }

    /// Clamp `estimated_center` so the window stays inside the frame.
    pub fn resolve(&self, frame_width: u32, frame_height: u32, estimated_center: i32) -> CropDecision {
        if self.should_skip(frame_width, frame_height) {
            return CropDecision::Skip(CropPlan::passthrough(frame_width));
        }

        let target_width = self.target_width(frame_height);
        let half = target_width / 2;
        let width = frame_width as i32;
        let center_x = estimated_center.clamp(half, width - half);

        CropDecision::Crop(CropPlan {
            target_width,
            center_x,
            left: center_x - half,
        })
    }
}
