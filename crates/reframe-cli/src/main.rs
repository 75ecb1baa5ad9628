//! Vertical reframe command line.

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reframe_media::{
    apply_decision, probe_clip, FaceTracker, FfmpegCropSink, PlanReport, ReframeConfig,
    ReplaySource, TimestampFrames,
};
use reframe_models::AspectRatio;

#[derive(Debug, Parser)]
#[command(name = "reframe-cli", version, about = "Speaker-centred vertical crops")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan a crop from a recorded detection track, optionally rendering it
    Plan(PlanArgs),
    /// Check that FFmpeg and FFprobe are installed
    Selfcheck,
}

#[derive(Debug, clap::Args)]
struct PlanArgs {
    /// Input clip
    #[arg(short, long)]
    input: PathBuf,

    /// JSON detection track (`[{"time": 0.0, "faces": [...]}, ...]`)
    #[arg(short, long)]
    detections: PathBuf,

    /// JSON config file; environment variables are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render the cropped clip here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the target aspect ratio, e.g. "9:16"
    #[arg(long)]
    aspect: Option<AspectRatio>,

    /// Override the smoothing window
    #[arg(long)]
    window: Option<usize>,

    /// Print the full plan report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan(args) => run_plan(args).await,
        Commands::Selfcheck => selfcheck(),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn load_config(args: &PlanArgs) -> anyhow::Result<ReframeConfig> {
    let mut config = match &args.config {
        Some(path) => ReframeConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReframeConfig::from_env().context("reading REFRAME_* environment")?,
    };

    if let Some(aspect) = args.aspect {
        config.aspect_ratio = aspect;
    }
    if let Some(window) = args.window {
        config.smoothing_window = window;
    }

    config.validate()?;
    Ok(config)
}

async fn run_plan(args: PlanArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    info!(input = %args.input.display(), "Planning vertical crop");

    let info = probe_clip(&args.input)
        .await
        .with_context(|| format!("probing {}", args.input.display()))?;
    let clip = info.geometry();

    let track = ReplaySource::from_json_file(&args.detections, config.replay_tolerance_secs)
        .with_context(|| format!("loading detections {}", args.detections.display()))?;

    // Replayed detections carry their own coordinates, so frames are never decoded.
    let mut tracker = FaceTracker::new(track, config.clone())?;
    let report = tracker.plan(&clip, &TimestampFrames)?;
    tracker.close();

    if let Some(output) = &args.output {
        render(&config, &args.input, output, &report).await?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary_line(&report));
    }
    Ok(())
}

async fn render(
    config: &ReframeConfig,
    input: &Path,
    output: &Path,
    report: &PlanReport,
) -> anyhow::Result<()> {
    if input == output {
        bail!("output must differ from input");
    }
    let sink = FfmpegCropSink::from_config(config);
    let rendered = apply_decision(&sink, input, output, &report.decision, &report.clip)
        .await
        .with_context(|| format!("rendering {}", output.display()))?;
    if !rendered {
        info!(output = %output.display(), "Nothing rendered, clip is already vertical");
    }
    Ok(())
}

fn summary_line(report: &PlanReport) -> String {
    let plan = report.decision.plan();
    if report.is_skip() {
        format!(
            "skip: {}x{} already fits",
            report.clip.width, report.clip.height
        )
    } else {
        format!(
            "crop: width={} center_x={} left={} ({} of {} samples observed)",
            plan.target_width,
            plan.center_x,
            plan.left,
            report.detection_hits,
            report.raw.len()
        )
    }
}

fn selfcheck() -> anyhow::Result<()> {
    for tool in ["ffmpeg", "ffprobe"] {
        let output = StdCommand::new(tool)
            .arg("-version")
            .output()
            .map_err(|e| anyhow::anyhow!("{} not available: {}", tool, e))?;
        if !output.status.success() {
            bail!("{} -version failed: {:?}", tool, output.status);
        }
    }
    println!("reframe-cli selfcheck: ok");
    Ok(())
}
