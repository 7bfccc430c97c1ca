//! Batch audio noise cleaner.
//!
//! Reads every audio file in the input directory, runs the chunked
//! noise-reduction pipeline, and writes `cleaned_*.wav` copies into the
//! output directory. One file's failure never stops the batch; the exit
//! status reports whether any file failed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use hush_core::{
    batch::{run_batch, BatchConfig, FileOutcome},
    engine::ReductionParams,
    pcm::DownmixPolicy,
    suppress::SpectralGate,
};

#[derive(Debug, Parser)]
#[command(name = "hush", version, about = "Remove background noise from a folder of audio files")]
struct Cli {
    /// Directory containing the source audio files (mp3/wav/flac/ogg/m4a).
    input_dir: PathBuf,

    /// Directory for the cleaned WAV copies (created if missing).
    output_dir: PathBuf,

    /// Target number of chunks per file.
    #[arg(long, default_value_t = 100)]
    chunks: usize,

    /// Suppression strength in [0.0, 1.0].
    #[arg(long, default_value_t = 0.8)]
    aggressiveness: f32,

    /// Worker threads for parallel file processing.
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Prefix for output file names.
    #[arg(long, default_value = "cleaned_")]
    prefix: String,

    /// Print the batch report as JSON instead of log lines.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hush=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let config = BatchConfig {
        params: ReductionParams {
            chunk_count: cli.chunks,
            aggressiveness: cli.aggressiveness,
        },
        downmix: DownmixPolicy::FirstChannel,
        workers: cli.workers,
        output_prefix: cli.prefix.clone(),
    };

    let gate = SpectralGate::new();
    let summary = match run_batch(&cli.input_dir, &cli.output_dir, &config, &gate) {
        Ok(summary) => summary,
        Err(e) => {
            error!("batch aborted: {e}");
            return ExitCode::from(2);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(report) => println!("{report}"),
            Err(e) => {
                error!("cannot serialize report: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        for outcome in &summary.outcomes {
            match outcome {
                FileOutcome::Success { input, output, samples } => {
                    info!(
                        "{} → {} ({samples} samples)",
                        input.display(),
                        output.display()
                    );
                }
                FileOutcome::Failure { input, reason } => {
                    warn!("{} failed: {reason}", input.display());
                }
            }
        }
        info!(
            "done: {} cleaned, {} failed",
            summary.succeeded, summary.failed
        );
    }

    if summary.has_failures() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
