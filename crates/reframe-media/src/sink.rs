//! Applying a crop plan to a clip.

use std::path::Path;

use async_trait::async_trait;
use reframe_models::{ClipGeometry, CropDecision, CropPlan};
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::ReframeConfig;
use crate::error::{MediaError, MediaResult};
use crate::progress::RenderProgress;

/// Consumer of a resolved crop window.
#[async_trait]
pub trait VideoSink: Send + Sync {
    /// Write `input` (a clip of geometry `clip`) cropped to `plan` into `output`.
    async fn apply(
        &self,
        input: &Path,
        output: &Path,
        plan: &CropPlan,
        clip: &ClipGeometry,
    ) -> MediaResult<()>;

    fn name(&self) -> &'static str;
}

/// FFmpeg `crop` filter for a plan covering the full frame height.
pub fn crop_filter(plan: &CropPlan, frame_height: u32) -> String {
    format!(
        "crop={}:{}:{}:0",
        plan.target_width, frame_height, plan.left
    )
}

/// Renders the crop with libx264, copying audio untouched.
#[derive(Debug, Clone)]
pub struct FfmpegCropSink {
    preset: String,
    crf: u8,
    timeout_secs: Option<u64>,
}

impl FfmpegCropSink {
    pub fn from_config(config: &ReframeConfig) -> Self {
        Self {
            preset: config.render_preset.clone(),
            crf: config.render_crf,
            timeout_secs: config.render_timeout_secs,
        }
    }

    pub fn build_command(
        &self,
        input: &Path,
        output: &Path,
        plan: &CropPlan,
        frame_height: u32,
    ) -> FfmpegCommand {
        FfmpegCommand::new(input, output)
            .video_filter(crop_filter(plan, frame_height))
            .video_codec("libx264")
            .preset(self.preset.clone())
            .crf(self.crf)
            .audio_codec("copy")
            .output_arg("-movflags")
            .output_arg("+faststart")
    }
}

#[async_trait]
impl VideoSink for FfmpegCropSink {
    async fn apply(
        &self,
        input: &Path,
        output: &Path,
        plan: &CropPlan,
        clip: &ClipGeometry,
    ) -> MediaResult<()> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let cmd = self.build_command(input, output, plan, clip.height);
        let runner = FfmpegRunner::new().with_timeout(self.timeout_secs);
        let duration = clip.duration;
        runner
            .run_with_progress(&cmd, move |progress: RenderProgress| {
                debug!(
                    frame = progress.frame,
                    percent = progress.percentage(duration),
                    eta_secs = progress.eta_seconds(duration),
                    speed = progress.speed,
                    "Render progress"
                );
            })
            .await?;

        info!(
            output = %output.display(),
            width = plan.target_width,
            left = plan.left,
            "Rendered cropped clip"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Hand a decision to the sink. Skip decisions leave the sink untouched.
///
/// Returns whether anything was rendered.
pub async fn apply_decision<S>(
    sink: &S,
    input: &Path,
    output: &Path,
    decision: &CropDecision,
    clip: &ClipGeometry,
) -> MediaResult<bool>
where
    S: VideoSink + ?Sized,
{
    match decision {
        CropDecision::Skip(_) => {
            info!(sink = sink.name(), "Clip already vertical, nothing to render");
            Ok(false)
        }
        CropDecision::Crop(plan) => {
            sink.apply(input, output, plan, clip).await?;
            Ok(true)
        }
    }
}
