use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::Parser;

use vidmash_core::config::{DEFAULT_AUDIO_COUNT, DEFAULT_REPEAT_COUNT};
use vidmash_core::scan::scan_media;
use vidmash_core::{BatchConfig, MediaKind, VideoOutcome};
use vidmash_encode::{run_batch, FfmpegGateway};

#[derive(Parser, Debug)]
#[command(
    name = "vidmash",
    version,
    about = "Batch-merge videos with randomly ordered audio selections"
)]
struct Cli {
    /// Directory scanned for video and audio files.
    #[arg(long, default_value = ".")]
    source_dir: PathBuf,

    /// Directory receiving outputs and intermediates. Defaults to the
    /// source directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Name embedded in output filenames. Prompted for when omitted.
    #[arg(long)]
    user: Option<String>,

    /// Audio files to draw per video. Prompted for when omitted.
    #[arg(long)]
    audio_count: Option<usize>,

    /// Times the merged result is looped into the final artifact.
    /// Prompted for when omitted; 1 skips the repeat stage.
    #[arg(long)]
    repeat: Option<u32>,

    /// Load a JSON batch configuration instead of the flags above.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Never prompt; missing values fall back to their defaults.
    #[arg(long, default_value_t = false)]
    non_interactive: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    println!("========== video/audio batch merge ==========");

    let preset = match &cli.config {
        Some(path) => Some(
            BatchConfig::load_from_file(path)
                .with_context(|| format!("load config {}", path.display()))?,
        ),
        None => None,
    };
    let source_dir = preset
        .as_ref()
        .map(|c| c.source_dir.clone())
        .unwrap_or_else(|| cli.source_dir.clone());

    let videos = scan_media(&source_dir, MediaKind::Video)
        .with_context(|| format!("scan {}", source_dir.display()))?;
    if videos.is_empty() {
        eprintln!("No video files found in {}.", source_dir.display());
        return Ok(ExitCode::from(2));
    }
    println!("Found {} video files:", videos.len());
    for (i, video) in videos.iter().enumerate() {
        println!("{}. {}", i + 1, video.file_name());
    }

    let audio_pool = scan_media(&source_dir, MediaKind::Audio)
        .with_context(|| format!("scan {}", source_dir.display()))?;
    if audio_pool.is_empty() {
        eprintln!("No audio files found in {}.", source_dir.display());
        return Ok(ExitCode::from(2));
    }
    println!("Found {} audio files.", audio_pool.len());

    let config = match preset {
        Some(config) => config,
        None => gather_config(&cli, &source_dir, audio_pool.len())?,
    };
    config.validate()?;

    let gateway = FfmpegGateway::new();
    if !gateway.available() {
        bail!("ffmpeg was not found on PATH; install it (e.g. `sudo apt install ffmpeg`)");
    }

    let summary = run_batch(&videos, &audio_pool, &config, &gateway)?;

    println!();
    println!("===== Batch summary =====");
    for result in &summary.results {
        let name = result
            .video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &result.outcome {
            VideoOutcome::Completed { output } => {
                println!("ok    {name} -> {}", output.display());
            }
            VideoOutcome::Failed { stage, reason } => {
                println!("fail  {name} ({stage}: {reason})");
            }
        }
    }
    println!("{} succeeded, {} failed", summary.succeeded(), summary.failed());

    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Fill in whatever the flags left out, prompting unless told not to.
fn gather_config(cli: &Cli, source_dir: &Path, pool_size: usize) -> anyhow::Result<BatchConfig> {
    let username = match &cli.user {
        Some(user) => user.clone(),
        None if cli.non_interactive => bail!("--user is required with --non-interactive"),
        None => prompt("Enter your name (for output filename): ")?,
    };

    let audio_count = match cli.audio_count {
        Some(count) => count,
        None if cli.non_interactive => DEFAULT_AUDIO_COUNT,
        None => {
            let answer = prompt(&format!(
                "How many audio files to use? (1-{pool_size}, default {DEFAULT_AUDIO_COUNT}): "
            ))?;
            parse_or(&answer, DEFAULT_AUDIO_COUNT)
        }
    }
    .clamp(1, pool_size);

    let repeat_count = match cli.repeat {
        Some(count) => count.max(1),
        None if cli.non_interactive => 1,
        None => {
            let proceed = prompt("Loop the final result into a longer artifact? (y/n): ")?;
            if proceed.eq_ignore_ascii_case("y") {
                let answer = prompt(&format!(
                    "How many times to repeat the final video? (default {DEFAULT_REPEAT_COUNT}): "
                ))?;
                parse_or(&answer, DEFAULT_REPEAT_COUNT).max(1)
            } else {
                1
            }
        }
    };

    let output_dir = cli
        .out_dir
        .clone()
        .unwrap_or_else(|| source_dir.to_path_buf());

    Ok(BatchConfig::new(
        source_dir,
        output_dir,
        username,
        audio_count,
        repeat_count,
    ))
}

fn prompt(question: &str) -> anyhow::Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Lenient numeric parsing for prompt answers: empty or malformed input
/// falls back to the default.
fn parse_or<T: FromStr + Copy>(raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
