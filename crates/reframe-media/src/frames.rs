//! Frame extraction through the FFmpeg CLI.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbImage;
use reframe_models::ClipGeometry;
use tracing::trace;

use crate::command::{check_ffmpeg, FfmpegCommand};
use crate::detection::{Frame, FrameProvider};
use crate::error::{MediaError, MediaResult};

/// Seeking to the exact end of a clip yields no frame, so the last sample
/// is pulled back by this much.
pub const END_GUARD_SECS: f64 = 0.05;

/// Decodes single frames from a clip on disk, one FFmpeg call per sample.
#[derive(Debug, Clone)]
pub struct FfmpegFrameProvider {
    input: PathBuf,
    clip: ClipGeometry,
}

impl FfmpegFrameProvider {
    pub fn new(input: impl AsRef<Path>, clip: ClipGeometry) -> MediaResult<Self> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
        check_ffmpeg()?;

        Ok(Self {
            input: input.to_path_buf(),
            clip,
        })
    }

    /// Seek position actually used for a sample time.
    pub fn seek_time(&self, timestamp: f64) -> f64 {
        clamp_seek(timestamp, self.clip.duration)
    }

    fn command(&self, seek: f64) -> FfmpegCommand {
        FfmpegCommand::new(&self.input, "-")
            .seek(seek)
            .frames(1)
            .raw_rgb()
            .without_progress()
    }
}

impl FrameProvider for FfmpegFrameProvider {
    fn frame_at(&self, timestamp: f64) -> MediaResult<Frame> {
        let seek = self.seek_time(timestamp);
        let args = self.command(seek).build_args();
        trace!(timestamp, seek, "Extracting frame");

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| MediaError::frame_unavailable(timestamp, e.to_string()))?;

        if !output.status.success() {
            return Err(MediaError::frame_unavailable(
                timestamp,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let image = image_from_rgb24(self.clip.width, self.clip.height, output.stdout)
            .ok_or_else(|| MediaError::frame_unavailable(timestamp, "short frame read"))?;

        Ok(Frame::new(timestamp, image))
    }
}

fn clamp_seek(timestamp: f64, duration: f64) -> f64 {
    let last = (duration - END_GUARD_SECS).max(0.0);
    timestamp.clamp(0.0, last)
}

/// Wrap a packed rgb24 buffer. Trailing bytes from extra frames are dropped.
fn image_from_rgb24(width: u32, height: u32, mut raw: Vec<u8>) -> Option<RgbImage> {
    let expected = width as usize * height as usize * 3;
    if expected == 0 || raw.len() < expected {
        return None;
    }
    raw.truncate(expected);
    RgbImage::from_raw(width, height, raw)
}
