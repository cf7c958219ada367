use anyhow::{Context, Result};
use clap::Parser;
use polysub::config::Config;
use polysub::pipeline::{self, DubSource, PipelineOptions};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "polysub")]
#[command(version, about = "Multi-track subtitle composer for language learning")]
#[command(
    long_about = "Fetches original and dub-language subtitles for a video, translates the dub \
line-by-line, and merges all three tracks into one styled .ass file."
)]
struct Cli {
    /// Input video file
    video: PathBuf,

    /// Language of the dubbed audio track (e.g. hu, es)
    #[arg(short = 'd', long)]
    lang_dub: String,

    /// Original language of the video
    #[arg(short = 'g', long, default_value = "en")]
    lang_orig: String,

    /// Your native language, the translation target (e.g. EN-US, DE)
    #[arg(short = 'n', long, default_value = "EN-US")]
    lang_native: String,

    /// Output .ass file (defaults to the video name with a .polysub.ass suffix)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Audio stream index of the dub track, used if transcription is needed
    #[arg(long, default_value = "0")]
    audio_track: usize,

    /// Rewrite the dub track's timing from the original track, line by line
    #[arg(long)]
    borrow_timing: bool,

    /// Confirm or override the automatic subtitle selection
    #[arg(short, long)]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if !cli.video.exists() {
        anyhow::bail!("Input file not found: {}", cli.video.display());
    }

    let output = cli
        .output
        .unwrap_or_else(|| pipeline::default_output_path(&cli.video));

    // Load and validate configuration
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    info!("Video:     {}", cli.video.display());
    info!("Output:    {}", output.display());
    info!("Original:  {}", cli.lang_orig);
    info!("Dub:       {}", cli.lang_dub);
    info!("Native:    {}", cli.lang_native);

    let options = PipelineOptions {
        lang_orig: cli.lang_orig,
        lang_dub: cli.lang_dub,
        lang_native: cli.lang_native,
        audio_track: cli.audio_track,
        borrow_timing: cli.borrow_timing,
        interactive: cli.interactive,
        show_progress: true,
    };

    let result = pipeline::run(&cli.video, &output, &config, &options)
        .await
        .context("Merge failed")?;

    match result.dub_source {
        DubSource::Downloaded { ref release_name } => {
            info!("Dub track: downloaded ({})", release_name)
        }
        DubSource::Transcribed => info!("Dub track: transcribed from audio"),
    }
    if !result.original_found {
        info!("No original-language subtitles were found; output has two tracks");
    }
    info!(
        "Done: {} events written to {} in {:.1?}",
        result.events_written,
        result.output_path.display(),
        result.total_time
    );

    Ok(())
}
