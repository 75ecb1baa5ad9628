//! Face detections and per-sample observations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A detected face in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaceBox {
    /// Horizontal center of the face box
    pub center_x: i32,
    /// Vertical center of the face box
    pub center_y: i32,
    /// Box width
    pub width: i32,
    /// Box height
    pub height: i32,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
}

impl FaceBox {
    /// Create a new face box.
    pub fn new(center_x: i32, center_y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            center_x,
            center_y,
            width,
            height,
            confidence,
        }
    }

    /// Build a face box from its top-left corner, the way most detectors report boxes.
    pub fn from_corner(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self::new(x + width / 2, y + height / 2, width, height, confidence)
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Ranking score: large, confident faces beat small spurious ones.
    #[inline]
    pub fn score(&self) -> f64 {
        self.confidence * self.area() as f64
    }
}

/// Faces seen at one sample time, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Observation {
    faces: Vec<FaceBox>,
}

impl Observation {
    /// An observation with no faces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rank faces descending by `confidence * area`.
    ///
    /// The sort is stable, so equal scores keep detector order.
    pub fn ranked(mut faces: Vec<FaceBox>) -> Self {
        faces.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { faces }
    }

    /// Highest-ranked face, if any.
    pub fn best(&self) -> Option<&FaceBox> {
        self.faces.first()
    }

    pub fn faces(&self) -> &[FaceBox] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }
}
