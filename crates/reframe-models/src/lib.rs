//! Shared data models for the vertical reframe planner.
//!
//! This crate provides Serde-serializable types for:
//! - Face detections and ranked per-sample observations
//! - Sample plans and raw trajectory points
//! - Crop plans and crop decisions
//! - Target aspect ratios

pub mod aspect;
pub mod face;
pub mod plan;

pub use aspect::{AspectRatio, AspectRatioParseError};
pub use face::{FaceBox, Observation};
pub use plan::{
    ClipGeometry, CropDecision, CropPlan, PositionSource, SamplePlan, TrajectoryPoint,
};
