//! FFprobe clip geometry.

use reframe_models::ClipGeometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Video stream information needed for planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec
    pub codec: String,
    /// Display rotation in degrees clockwise: 0, 90, 180 or 270
    #[serde(default)]
    pub rotation: u32,
}

impl VideoInfo {
    /// Geometry of the frames FFmpeg decodes, which it auto-rotates.
    pub fn geometry(&self) -> ClipGeometry {
        if self.rotation % 180 == 90 {
            ClipGeometry::new(self.duration, self.height, self.width)
        } else {
            ClipGeometry::new(self.duration, self.width, self.height)
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<f64>,
}

impl FfprobeStream {
    /// Display matrix rotation first, legacy `rotate` tag as fallback.
    fn rotation(&self) -> u32 {
        let degrees = self
            .side_data_list
            .iter()
            .find_map(|d| d.rotation)
            .or_else(|| self.tags.get("rotate").and_then(|r| r.trim().parse().ok()))
            .filter(|r: &f64| r.is_finite())
            .unwrap_or(0.0);
        let quarter_turns = (degrees / 90.0).round() as i64;
        (quarter_turns.rem_euclid(4) * 90) as u32
    }
}

/// Probe a clip for its duration and frame size.
pub async fn probe_clip(path: impl AsRef<Path>) -> MediaResult<VideoInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed on {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let info = parse_probe_output(&output.stdout)?;
    debug!(
        path = %path.display(),
        duration = info.duration,
        width = info.width,
        height = info.height,
        "Probed clip"
    );
    Ok(info)
}

fn parse_probe_output(json: &[u8]) -> MediaResult<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::InvalidVideo("No video stream found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(MediaError::InvalidVideo(
                "Video stream has no frame size".to_string(),
            ))
        }
    };

    // Container duration first, stream duration as fallback.
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(stream.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(30.0);

    Ok(VideoInfo {
        duration,
        width,
        height,
        fps,
        codec: stream.codec_name.clone().unwrap_or_default(),
        rotation: stream.rotation(),
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    let fps = match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den <= 0.0 {
                return None;
            }
            num / den
        }
        None => s.parse().ok()?,
    };
    (fps > 0.0).then_some(fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_parse_stream_info() {
        let json = br#"{
            "streams": [{
                "codec_type": "video",
                "codec_name": "h264",
                "width": 1920,
                "height": 1080,
                "avg_frame_rate": "0/0",
                "r_frame_rate": "30000/1001"
            }],
            "format": {"duration": "6.006000"}
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.codec, "h264");
        assert!((info.duration - 6.006).abs() < 1e-9);
        assert!((info.fps - 29.97).abs() < 0.01);

        let clip = info.geometry();
        assert_eq!((clip.width, clip.height), (1920, 1080));
    }

    #[test]
    fn test_stream_duration_fallback() {
        let json = br#"{
            "streams": [{"codec_type": "video", "width": 1080, "height": 1920, "duration": "12.5"}]
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.duration - 12.5).abs() < 1e-9);
        assert_eq!(info.fps, 30.0);
    }

    #[test]
    fn test_rotate_tag_swaps_geometry() {
        let json = br#"{
            "streams": [{"codec_type": "video", "width": 1920, "height": 1080,
                         "tags": {"rotate": "90", "language": "und"}}],
            "format": {"duration": "4.0"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.rotation, 90);
        let clip = info.geometry();
        assert_eq!((clip.width, clip.height), (1080, 1920));
    }

    #[test]
    fn test_display_matrix_rotation() {
        let json = br#"{
            "streams": [{"codec_type": "video", "width": 1920, "height": 1080,
                         "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]}]
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.rotation, 270);
        assert_eq!(info.geometry().width, 1080);

        let upside_down = br#"{
            "streams": [{"codec_type": "video", "width": 1920, "height": 1080,
                         "side_data_list": [{"rotation": 180}]}]
        }"#;
        let info = parse_probe_output(upside_down).unwrap();
        assert_eq!(info.rotation, 180);
        assert_eq!(info.geometry().width, 1920);
    }

    #[test]
    fn test_missing_video_stream() {
        let json = br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::InvalidVideo(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_clip_file() {
        let result = probe_clip("/nonexistent/clip.mp4").await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
