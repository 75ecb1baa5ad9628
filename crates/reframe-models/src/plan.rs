//! Sampling and crop plans produced by one planning run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Clip being planned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipGeometry {
    /// Duration in seconds
    pub duration: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl ClipGeometry {
    pub fn new(duration: f64, width: u32, height: u32) -> Self {
        Self {
            duration,
            width,
            height,
        }
    }

    /// Horizontal midpoint, used whenever no face position is known.
    pub fn midpoint_x(&self) -> i32 {
        (self.width / 2) as i32
    }

    /// Vertical midpoint.
    pub fn midpoint_y(&self) -> i32 {
        (self.height / 2) as i32
    }
}

/// Ordered sample timestamps spanning `[0, duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SamplePlan {
    times: Vec<f64>,
}

impl SamplePlan {
    /// `count` timestamps uniformly spaced over `[0, duration]`, both ends included.
    pub fn uniform(duration: f64, count: usize) -> Self {
        let times = match count {
            0 => Vec::new(),
            1 => vec![0.0],
            n => {
                let step = duration / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { duration } else { step * i as f64 })
                    .collect()
            }
        };
        Self { times }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Where a raw trajectory position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    /// Best face of the sample's observation
    Observed,
    /// Previous position repeated after a miss
    Held,
    /// Frame midpoint after a miss with no history
    Midpoint,
}

/// One raw trajectory entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub x: i32,
    pub source: PositionSource,
}

/// Final horizontal crop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CropPlan {
    /// Crop width (even for real crops)
    pub target_width: i32,
    /// Clamped horizontal center of the window
    pub center_x: i32,
    /// Left edge of the window
    pub left: i32,
}

impl CropPlan {
    /// Full-width window for clips that need no cropping.
    pub fn passthrough(frame_width: u32) -> Self {
        let width = frame_width as i32;
        Self {
            target_width: width,
            center_x: width / 2,
            left: 0,
        }
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.left + self.target_width
    }

    /// Whether the window lies entirely inside a frame of the given width.
    pub fn fits_within(&self, frame_width: u32) -> bool {
        self.left >= 0 && self.target_width > 0 && self.right() <= frame_width as i32
    }
}

/// Outcome of crop resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", content = "plan", rename_all = "snake_case")]
pub enum CropDecision {
    /// Crop the clip to this window.
    Crop(CropPlan),
    /// Clip is already at or narrower than the target; do not crop.
    Skip(CropPlan),
}

impl CropDecision {
    pub fn plan(&self) -> &CropPlan {
        match self {
            CropDecision::Crop(plan) | CropDecision::Skip(plan) => plan,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, CropDecision::Skip(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_includes_both_endpoints() {
        let plan = SamplePlan::uniform(6.0, 3);
        assert_eq!(plan.times(), &[0.0, 3.0, 6.0]);

        let plan = SamplePlan::uniform(7.0, 8);
        assert_eq!(plan.len(), 8);
        assert_eq!(plan.times()[0], 0.0);
        assert_eq!(*plan.times().last().unwrap(), 7.0);
        for pair in plan.times().windows(2) {
            assert!((pair[1] - pair[0] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_uniform_degenerate_counts() {
        assert!(SamplePlan::uniform(5.0, 0).is_empty());
        assert_eq!(SamplePlan::uniform(5.0, 1).times(), &[0.0]);
        assert_eq!(SamplePlan::uniform(0.0, 3).times(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_passthrough_plan() {
        let plan = CropPlan::passthrough(1080);
        assert_eq!(plan.left, 0);
        assert_eq!(plan.target_width, 1080);
        assert_eq!(plan.center_x, 540);
        assert!(plan.fits_within(1080));
    }

    #[test]
    fn test_fits_within() {
        let plan = CropPlan {
            target_width: 606,
            center_x: 1617,
            left: 1314,
        };
        assert!(plan.fits_within(1920));
        assert!(!plan.fits_within(1900));
    }

    #[test]
    fn test_decision_serialization() {
        let decision = CropDecision::Skip(CropPlan::passthrough(1080));
        let json = serde_json::to_value(decision).unwrap();
        assert_eq!(json["action"], "skip");
        assert_eq!(json["plan"]["target_width"], 1080);
        assert!(decision.is_skip());
    }

    #[test]
    fn test_geometry_midpoints() {
        let clip = ClipGeometry::new(6.0, 1921, 1080);
        assert_eq!(clip.midpoint_x(), 960);
        assert_eq!(clip.midpoint_y(), 540);
    }
}
