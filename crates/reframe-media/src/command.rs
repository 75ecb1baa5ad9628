//! FFmpeg command builder and async runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::RenderProgress;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    /// Output path; `-` writes to stdout
    output: PathBuf,
    input_args: Vec<String>,
    output_args: Vec<String>,
    /// Emit `-progress pipe:2` key/value blocks on stderr
    progress: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            progress: true,
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Seek before decoding.
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Stop after `count` video frames.
    pub fn frames(self, count: u32) -> Self {
        self.output_arg("-frames:v").output_arg(count.to_string())
    }

    /// Raw rgb24 output, one packed frame after another.
    pub fn raw_rgb(self) -> Self {
        self.output_arg("-f")
            .output_arg("rawvideo")
            .output_arg("-pix_fmt")
            .output_arg("rgb24")
    }

    /// Don't ask FFmpeg for `-progress` output.
    pub fn without_progress(mut self) -> Self {
        self.progress = false;
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];

        if self.progress {
            args.push("-progress".to_string());
            args.push("pipe:2".to_string());
        }

        args.extend(self.input_args.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runs FFmpeg commands with progress reporting and an optional timeout.
#[derive(Debug, Default)]
pub struct FfmpegRunner {
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run an FFmpeg command, reporting each progress block.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, on_progress: F) -> MediaResult<()>
    where
        F: Fn(RenderProgress) + Send + 'static,
    {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr not captured"))?;
        let mut lines = BufReader::new(stderr).lines();

        let progress_task = tokio::spawn(async move {
            let mut progress = RenderProgress::default();
            let mut tail = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                match progress.apply_line(&line) {
                    Some(snapshot) => on_progress(snapshot),
                    None if !line.contains('=') => tail.push(line),
                    None => {}
                }
            }
            tail
        });

        let result = self.wait(&mut child).await;
        let tail = progress_task.await.unwrap_or_default();

        result.map_err(|e| match e {
            MediaError::FfmpegFailed {
                message, exit_code, ..
            } if !tail.is_empty() => MediaError::ffmpeg_failed(message, Some(tail.join("\n")), exit_code),
            other => other,
        })
    }

    async fn wait(&self, child: &mut Child) -> MediaResult<()> {
        let status = match self.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(std::time::Duration::from_secs(secs), child.wait()).await
                {
                    Ok(status) => status?,
                    Err(_) => {
                        warn!("FFmpeg timed out after {} seconds, killing process", secs);
                        let _ = child.kill().await;
                        return Err(MediaError::Timeout(secs));
                    }
                }
            }
            None => child.wait().await?,
        };

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                None,
                status.code(),
            ))
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_render_args() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .video_filter("crop=606:1080:1097:0")
            .video_codec("libx264")
            .preset("veryfast")
            .crf(23)
            .audio_codec("copy");

        let args = cmd.build_args();
        assert_eq!(&args[..5], &["-y", "-v", "error", "-progress", "pipe:2"]);
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "crop=606:1080:1097:0");
        assert!(args.windows(2).any(|w| w == ["-c:a", "copy"]));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_frame_grab_args() {
        let cmd = FfmpegCommand::new("in.mp4", "-")
            .seek(2.5)
            .frames(1)
            .raw_rgb()
            .without_progress();

        let args = cmd.build_args();
        assert!(!args.contains(&"-progress".to_string()));
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "2.500");
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "rgb24"]));
        assert_eq!(args.last().unwrap(), "-");
    }
}
