//! Configuration for the reframe planning pipeline.

use std::path::Path;

use reframe_models::AspectRatio;
use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// How many frames to sample for a clip of a given duration.
///
/// Short clips use `clamp(round(duration / short_divisor), short_min, short_max)`,
/// clips longer than `regime_boundary_secs` use the `long_*` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Durations above this many seconds use the long-clip regime (default: 10.0)
    pub regime_boundary_secs: f64,
    /// Seconds per sample for short clips (default: 3.0)
    pub short_divisor: f64,
    pub short_min: usize,
    pub short_max: usize,
    /// Seconds per sample for long clips (default: 4.0)
    pub long_divisor: f64,
    pub long_min: usize,
    pub long_max: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            regime_boundary_secs: 10.0,
            short_divisor: 3.0,
            short_min: 3,
            short_max: 6,
            long_divisor: 4.0,
            long_min: 6,
            long_max: 8,
        }
    }
}

/// Configuration for one planner instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReframeConfig {
    // === Sampling ===
    pub sampling: SamplingConfig,

    // === Smoothing ===
    /// Moving-average window in samples (default: 3)
    pub smoothing_window: usize,

    // === Output ===
    /// Target aspect ratio of the crop window (default: 9:16)
    pub aspect_ratio: AspectRatio,

    // === Detection ===
    /// Frame scale applied before detection (default: 0.5)
    pub detection_scale: f64,

    /// Faces below this confidence are ignored (default: 0.5)
    pub min_detection_confidence: f64,

    /// Max distance in seconds between a sample and a replayed detection (default: 0.25)
    pub replay_tolerance_secs: f64,

    // === Rendering ===
    /// FFmpeg x264 preset for the crop render (default: "veryfast")
    pub render_preset: String,

    /// FFmpeg CRF quality (default: 23)
    pub render_crf: u8,

    /// Kill the crop render after this many seconds (default: none)
    pub render_timeout_secs: Option<u64>,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            smoothing_window: 3,
            aspect_ratio: AspectRatio::PORTRAIT,
            detection_scale: 0.5,
            min_detection_confidence: 0.5,
            replay_tolerance_secs: 0.25,
            render_preset: "veryfast".to_string(),
            render_crf: 23,
            render_timeout_secs: None,
        }
    }
}

impl ReframeConfig {
    /// Fewer samples and a quicker encode for previews.
    pub fn fast() -> Self {
        Self {
            sampling: SamplingConfig {
                short_max: 4,
                long_min: 4,
                long_max: 6,
                ..Default::default()
            },
            detection_scale: 0.35,
            render_preset: "ultrafast".to_string(),
            render_crf: 26,
            ..Default::default()
        }
    }

    /// Denser sampling and a wider window for shaky or crowded footage.
    pub fn stable() -> Self {
        Self {
            sampling: SamplingConfig {
                short_max: 8,
                long_min: 8,
                long_max: 12,
                ..Default::default()
            },
            smoothing_window: 5,
            detection_scale: 1.0,
            render_preset: "medium".to_string(),
            render_crf: 20,
            ..Default::default()
        }
    }

    /// Default config with overrides from `REFRAME_*` environment variables.
    ///
    /// A variable that is set but does not parse is an error.
    pub fn from_env() -> MediaResult<Self> {
        let mut config = Self::default();

        if let Some(window) = env_parse("REFRAME_SMOOTHING_WINDOW")? {
            config.smoothing_window = window;
        }
        if let Some(ratio) = env_parse("REFRAME_ASPECT_RATIO")? {
            config.aspect_ratio = ratio;
        }
        if let Some(scale) = env_parse("REFRAME_DETECTION_SCALE")? {
            config.detection_scale = scale;
        }
        if let Some(confidence) = env_parse("REFRAME_MIN_CONFIDENCE")? {
            config.min_detection_confidence = confidence;
        }
        if let Some(boundary) = env_parse("REFRAME_REGIME_BOUNDARY_SECS")? {
            config.sampling.regime_boundary_secs = boundary;
        }
        if let Ok(preset) = std::env::var("REFRAME_RENDER_PRESET") {
            config.render_preset = preset;
        }
        if let Some(crf) = env_parse("REFRAME_RENDER_CRF")? {
            config.render_crf = crf;
        }
        if let Some(timeout) = env_parse("REFRAME_RENDER_TIMEOUT_SECS")? {
            config.render_timeout_secs = Some(timeout);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break planner invariants.
    pub fn validate(&self) -> MediaResult<()> {
        let s = &self.sampling;
        if s.short_min < 3 || s.long_min < 3 {
            return Err(MediaError::InvalidConfig(
                "sampling minimums must be at least 3".to_string(),
            ));
        }
        if s.short_min > s.short_max || s.long_min > s.long_max {
            return Err(MediaError::InvalidConfig(
                "sampling minimum exceeds maximum".to_string(),
            ));
        }
        if !(s.short_divisor > 0.0) || !(s.long_divisor > 0.0) {
            return Err(MediaError::InvalidConfig(
                "sampling divisors must be positive".to_string(),
            ));
        }
        if !s.regime_boundary_secs.is_finite() || s.regime_boundary_secs < 0.0 {
            return Err(MediaError::InvalidConfig(
                "regime boundary must be a non-negative number of seconds".to_string(),
            ));
        }
        if self.smoothing_window == 0 {
            return Err(MediaError::InvalidConfig(
                "smoothing window must be at least 1".to_string(),
            ));
        }
        if self.aspect_ratio.width == 0 || self.aspect_ratio.height == 0 {
            return Err(MediaError::InvalidConfig(
                "aspect ratio cannot have zero values".to_string(),
            ));
        }
        if !(self.detection_scale > 0.0 && self.detection_scale <= 1.0) {
            return Err(MediaError::InvalidConfig(format!(
                "detection scale {} outside (0, 1]",
                self.detection_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(MediaError::InvalidConfig(format!(
                "min detection confidence {} outside [0, 1]",
                self.min_detection_confidence
            )));
        }
        if !(self.replay_tolerance_secs >= 0.0) {
            return Err(MediaError::InvalidConfig(
                "replay tolerance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> MediaResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| MediaError::InvalidConfig(format!("{}={:?}: {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_are_valid() {
        ReframeConfig::default().validate().unwrap();
        ReframeConfig::fast().validate().unwrap();
        ReframeConfig::stable().validate().unwrap();
    }

    #[test]
    fn test_default_values() {
        let config = ReframeConfig::default();
        assert_eq!(config.smoothing_window, 3);
        assert_eq!(config.aspect_ratio, AspectRatio::PORTRAIT);
        assert_eq!(config.sampling.short_min, 3);
        assert_eq!(config.sampling.long_max, 8);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ReframeConfig {
            smoothing_window: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MediaError::InvalidConfig(_))));

        let config = ReframeConfig {
            detection_scale: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut config = ReframeConfig::default();
        config.sampling.short_min = 2;
        assert!(config.validate().is_err());

        let mut config = ReframeConfig::default();
        config.sampling.long_min = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"smoothing_window": 5, "aspect_ratio": {{"width": 4, "height": 5}}, "sampling": {{"long_max": 10}}}}"#
        )
        .unwrap();

        let config = ReframeConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.aspect_ratio, AspectRatio::INSTAGRAM_PORTRAIT);
        assert_eq!(config.sampling.long_max, 10);
        assert_eq!(config.sampling.long_min, 6);
        assert_eq!(config.render_preset, "veryfast");
    }

    #[test]
    fn test_json_file_missing() {
        let result = ReframeConfig::from_json_file("/nonexistent/reframe.json");
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[test]
    fn test_env_values_must_parse() {
        // Keys unique to this test so parallel tests never see them.
        std::env::set_var("REFRAME_TEST_WINDOW_GOOD", " 5 ");
        std::env::set_var("REFRAME_TEST_WINDOW_BAD", "abc");
        std::env::set_var("REFRAME_TEST_ASPECT_BAD", "wide");

        assert_eq!(env_parse::<usize>("REFRAME_TEST_WINDOW_GOOD").unwrap(), Some(5));
        assert_eq!(env_parse::<usize>("REFRAME_TEST_WINDOW_UNSET").unwrap(), None);
        assert!(matches!(
            env_parse::<usize>("REFRAME_TEST_WINDOW_BAD"),
            Err(MediaError::InvalidConfig(_))
        ));
        assert!(matches!(
            env_parse::<AspectRatio>("REFRAME_TEST_ASPECT_BAD"),
            Err(MediaError::InvalidConfig(_))
        ));
    }
}
