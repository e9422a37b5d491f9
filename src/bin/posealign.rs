use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use posealign::{
    AlignmentResult, ConfigCatalog, ExtractOpts, KeypointFileSource, OverlayRenderer, PoseConfig,
    RenderOpts, Sequence, SequenceExtractor,
};

#[derive(Parser, Debug)]
#[command(name = "posealign", version)]
struct Cli {
    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a pose sequence from a video (requires `ffmpeg`/`ffprobe` on PATH).
    Extract(ExtractArgs),
    /// Render the alignment overlay video (requires `ffmpeg`/`ffprobe` on PATH).
    Render(RenderArgs),
    /// Print the resolved pose configuration as JSON.
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigSource {
    /// Single pose configuration JSON.
    #[arg(long, conflicts_with = "catalog")]
    config: Option<PathBuf>,

    /// Configuration catalog JSON keyed by video file name.
    #[arg(long, requires = "video_id")]
    catalog: Option<PathBuf>,

    /// Catalog id, e.g. `01_03`.
    #[arg(long, requires = "catalog")]
    video_id: Option<String>,
}

impl ConfigSource {
    fn resolve(&self) -> anyhow::Result<PoseConfig> {
        let cfg = match (&self.config, &self.catalog, &self.video_id) {
            (Some(path), _, _) => PoseConfig::from_json_file(path)?,
            (None, Some(path), Some(id)) => ConfigCatalog::from_json_file(path)?.config(id)?.clone(),
            _ => PoseConfig::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Input video.
    #[arg(long)]
    video: PathBuf,

    /// Detector output recorded for `--video` (`{"frames": [...]}`).
    #[arg(long)]
    keypoints: PathBuf,

    /// Output sequence JSON.
    #[arg(long)]
    out: PathBuf,

    /// Record every N-th decoded frame.
    #[arg(long, default_value_t = 1)]
    stride: usize,

    /// Detection score below which a frame counts as empty.
    #[arg(long, default_value_t = posealign::DEFAULT_MIN_DETECTION_CONFIDENCE)]
    min_detection_confidence: f64,

    #[command(flatten)]
    config: ConfigSource,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Reference sequence JSON.
    #[arg(long)]
    reference: PathBuf,

    /// Subject sequence JSON.
    #[arg(long)]
    subject: PathBuf,

    /// Subject video the subject sequence was extracted from.
    #[arg(long)]
    subject_video: PathBuf,

    /// Alignment JSON (`alignment_path`, optional `stages` and `low_score_frames`).
    #[arg(long)]
    alignment: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Export low-score frames as JPEG snapshots.
    #[arg(long)]
    save_lowest_scores: bool,

    /// Snapshot directory (default: `low_score_frames/` next to `--out`).
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Mark key-angle vertices on the subject skeleton.
    #[arg(long)]
    annotate: bool,

    #[command(flatten)]
    config: ConfigSource,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(flatten)]
    config: ConfigSource,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.cmd {
        Command::Extract(args) => cmd_extract(args),
        Command::Render(args) => cmd_render(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let mut landmarks = KeypointFileSource::open(&args.keypoints)?
        .with_min_detection_confidence(args.min_detection_confidence);

    let seq = SequenceExtractor::new(&cfg)
        .with_opts(ExtractOpts {
            stride: args.stride,
        })
        .extract_path(&args.video, &mut landmarks)
        .with_context(|| format!("extract '{}'", args.video.display()))?;
    seq.save_json(&args.out)?;

    eprintln!("wrote {} ({} frames)", args.out.display(), seq.len());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let reference = Sequence::load_json(&args.reference)?;
    let subject = Sequence::load_json(&args.subject)?;
    let alignment = AlignmentResult::from_json_file(&args.alignment)?;

    let summary = OverlayRenderer::new(&cfg)
        .with_opts(RenderOpts {
            save_lowest_scores: args.save_lowest_scores,
            snapshot_dir: args.snapshot_dir,
            annotate_subject_angles: args.annotate,
        })
        .render_to_file(
            &reference,
            &subject,
            &alignment,
            &alignment,
            &args.subject_video,
            &args.out,
        )
        .with_context(|| format!("render '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {} snapshots)",
        args.out.display(),
        summary.frames_written,
        summary.snapshots_written
    );
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = args.config.resolve()?;
    let json = serde_json::to_string_pretty(&cfg).context("serialize config")?;
    println!("{json}");
    Ok(())
}
