//! Error types for reframe planning and media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during planning or media processing.
///
/// Per-sample detection failures are absorbed by the planner; only the
/// variants returned from [`crate::FaceTracker::plan`] abort a run.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Frame unavailable at {time:.3}s: {message}")]
    FrameUnavailable { time: f64, message: String },

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Face detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create a detector-unavailable error.
    pub fn detector_unavailable(message: impl Into<String>) -> Self {
        Self::DetectorUnavailable(message.into())
    }

    /// Create a frame-unavailable error.
    pub fn frame_unavailable(time: f64, message: impl Into<String>) -> Self {
        Self::FrameUnavailable {
            time,
            message: message.into(),
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error means the detector itself cannot run.
    ///
    /// These abort a planning run; every other detection-time error is
    /// treated as an empty observation for that sample.
    pub fn is_resource_failure(&self) -> bool {
        matches!(
            self,
            MediaError::DetectorUnavailable(_) | MediaError::ModelNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_failure_classification() {
        assert!(MediaError::detector_unavailable("closed").is_resource_failure());
        assert!(MediaError::model_not_found("blaze_face.tflite").is_resource_failure());
        assert!(!MediaError::detection_failed("bad frame").is_resource_failure());
        assert!(!MediaError::frame_unavailable(1.5, "eof").is_resource_failure());
    }

    #[test]
    fn test_frame_unavailable_message() {
        let err = MediaError::frame_unavailable(2.0, "seek past end");
        assert_eq!(err.to_string(), "Frame unavailable at 2.000s: seek past end");
    }
}
