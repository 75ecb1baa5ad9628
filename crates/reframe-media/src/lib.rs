#![deny(unreachable_patterns)]
//! Speaker-centred vertical reframing.
//!
//! This crate provides:
//! - Adaptive frame sampling and gap-filled face trajectories
//! - Smoothing and median center estimation
//! - Boundary-safe 9:16 crop resolution
//! - Frame extraction, probing and crop rendering over the FFmpeg CLI

pub mod command;
pub mod config;
pub mod detection;
pub mod error;
pub mod frames;
pub mod metrics;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod sink;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use config::{ReframeConfig, SamplingConfig};
pub use detection::{
    FaceObservationSource, Frame, FrameProvider, ReplayEntry, ReplaySource, ScaledSource,
    TimestampFrames,
};
pub use error::{MediaError, MediaResult};
pub use frames::FfmpegFrameProvider;
pub use planner::{CropResolver, FaceTracker, PlanReport};
pub use probe::{probe_clip, VideoInfo};
pub use progress::RenderProgress;
pub use sink::{apply_decision, crop_filter, FfmpegCropSink, VideoSink};
