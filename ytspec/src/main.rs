//! ytspec - Amplitude envelope ("spectrogram") generator
//!
//! Reads `<audio_dir>/<clip>.<extension>`, computes a per-slice loudness
//! envelope normalized to the clip peak, and emits it to one sink
//! (stdout, JSON file, HTTP POST or database).
//!
//! One clip per invocation. Exit status is 0 on success and non-zero on any
//! fatal error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use ytspec::Runner;
use ytspec_common::config::{
    ConfigOverrides, DecodeErrorPolicy, PipelineConfig, SinkKind, ENV_AUDIO_DIR, ENV_CONFIG,
    ENV_DATABASE_URL, ENV_HTTP_URL, ENV_RESOLUTION, ENV_SINK, ENV_VIDEO_ID,
};
use ytspec_common::output::OutputShape;

/// Command-line arguments for ytspec
#[derive(Parser, Debug)]
#[command(name = "ytspec")]
#[command(about = "Normalized amplitude envelope for one audio clip")]
#[command(version)]
struct Args {
    /// Clip file name or hash (extension is appended from config)
    #[arg(env = ENV_VIDEO_ID)]
    target: Option<String>,

    /// TOML config file
    #[arg(long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Directory containing the audio files
    #[arg(long, env = ENV_AUDIO_DIR)]
    audio_dir: Option<PathBuf>,

    /// Amplitude slices per second
    #[arg(long, env = ENV_RESOLUTION)]
    resolution: Option<u32>,

    /// stdout, json_file, http_post or database
    #[arg(long, env = ENV_SINK)]
    sink: Option<SinkKind>,

    /// flat or structured
    #[arg(long)]
    shape: Option<OutputShape>,

    /// abort or continue_with_empty
    #[arg(long)]
    on_decode_error: Option<DecodeErrorPolicy>,

    /// Endpoint for the http_post sink
    #[arg(long, env = ENV_HTTP_URL)]
    http_url: Option<String>,

    /// Connection URL for the database sink
    #[arg(long, env = ENV_DATABASE_URL)]
    database_url: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            audio_dir: self.audio_dir.clone(),
            resolution: self.resolution,
            sink: self.sink,
            shape: self.shape,
            on_decode_error: self.on_decode_error,
            http_url: self.http_url.clone(),
            database_url: self.database_url.clone(),
        }
    }
}

fn init_tracing(level: &str) {
    // RUST_LOG wins over the configured level; logs go to stderr so the
    // stdout sink's output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = PipelineConfig::load(args.config.as_deref(), args.overrides())
        .context("Failed to load configuration")?;

    init_tracing(&config.logging.level);

    info!(
        "Starting ytspec v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        audio_dir = %config.audio_dir.display(),
        resolution = config.resolution.get(),
        sink = ?config.output.sink,
        shape = ?config.output.shape,
        on_decode_error = ?config.on_decode_error,
        "Configuration resolved"
    );

    let runner = Runner::from_config(config)
        .await
        .context("Failed to initialize result sink")?;

    match runner.run(args.target.as_deref()).await {
        Ok(summary) => {
            info!(
                id = %summary.id,
                samples = summary.samples,
                emitted = summary.emitted,
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            error!("Failed to process clip: {}", e);
            Err(e.into())
        }
    }
}
