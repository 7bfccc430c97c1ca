//! Batch orchestration: decode → reduce → encode, one outcome per file.
//!
//! ## Isolation
//!
//! Every file is processed independently. A failure is recorded as a
//! `FileOutcome::Failure` and the batch moves on; nothing short of a
//! misconfigured batch (bad parameters, unreadable input directory) aborts
//! the run.
//!
//! ## Staging
//!
//! Each output is first written to a per-file unique scratch file in the
//! output directory (`tempfile::NamedTempFile`), then persisted to its final
//! name. The scratch file is removed on every failure path; a failed removal
//! is logged and never masks the primary error. Unique scratch names make
//! parallel workers collision-free.

use std::path::{Path, PathBuf};
use std::thread;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::codec;
use crate::engine::{reduce_with_progress, ReductionParams};
use crate::error::{HushError, Result};
use crate::pcm::DownmixPolicy;
use crate::suppress::NoiseSuppressor;

/// Extensions the input scan recognizes as audio.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg", "m4a", "aac"];

/// Configuration for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Reduction parameters applied to every file.
    pub params: ReductionParams,
    /// Downmix policy for multi-channel inputs.
    pub downmix: DownmixPolicy,
    /// Worker thread count. 1 = sequential.
    pub workers: usize,
    /// Prepended to each input file stem to form the output name.
    pub output_prefix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            params: ReductionParams::default(),
            downmix: DownmixPolicy::FirstChannel,
            workers: 1,
            output_prefix: "cleaned_".into(),
        }
    }
}

/// Result of processing one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Success {
        input: PathBuf,
        output: PathBuf,
        samples: usize,
    },
    Failure {
        input: PathBuf,
        reason: String,
    },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Success { input, .. } | FileOutcome::Failure { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success { .. })
    }
}

/// Aggregate report for a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    fn from_outcomes(mut outcomes: Vec<FileOutcome>) -> Self {
        // Workers finish out of order; keep the report deterministic.
        outcomes.sort_by(|a, b| a.input().cmp(b.input()));
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// List the audio files directly inside `dir`, sorted by path.
///
/// Non-audio files and subdirectories are skipped. The scan is deliberately
/// non-recursive, matching the one-folder-in, one-folder-out contract.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_audio = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| AUDIO_EXTENSIONS.iter().any(|a| e.eq_ignore_ascii_case(a)))
            .unwrap_or(false);
        if is_audio {
            inputs.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-audio entry");
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Process every audio file in `input_dir`, writing cleaned WAV copies into
/// `output_dir`.
///
/// Returns a summary with one tagged outcome per input file. Per-file errors
/// are captured in the summary, not propagated.
///
/// # Errors
///
/// Only batch-level problems: invalid `config.params`, an unreadable input
/// directory, or failure to create the output directory.
pub fn run_batch<S>(
    input_dir: &Path,
    output_dir: &Path,
    config: &BatchConfig,
    suppressor: &S,
) -> Result<BatchSummary>
where
    S: NoiseSuppressor + ?Sized,
{
    config.params.validate()?;
    if config.workers == 0 {
        return Err(HushError::InvalidParameters(
            "worker count must be at least 1".into(),
        ));
    }
    std::fs::create_dir_all(output_dir)?;

    let inputs = discover_inputs(input_dir)?;
    info!(
        files = inputs.len(),
        workers = config.workers,
        "starting batch"
    );

    let outcomes = if config.workers == 1 {
        inputs
            .iter()
            .map(|input| process_one(input, output_dir, config, suppressor))
            .collect()
    } else {
        run_parallel(&inputs, output_dir, config, suppressor)
    };

    let summary = BatchSummary::from_outcomes(outcomes);
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch finished"
    );
    Ok(summary)
}

fn run_parallel<S>(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &BatchConfig,
    suppressor: &S,
) -> Vec<FileOutcome>
where
    S: NoiseSuppressor + ?Sized,
{
    let (tx, rx) = crossbeam_channel::unbounded::<&PathBuf>();
    for input in inputs {
        // Unbounded channel: send cannot fail while rx is alive
        let _ = tx.send(input);
    }
    drop(tx);

    let outcomes = Mutex::new(Vec::with_capacity(inputs.len()));
    thread::scope(|scope| {
        for _ in 0..config.workers.min(inputs.len().max(1)) {
            let rx = rx.clone();
            let outcomes = &outcomes;
            scope.spawn(move || {
                while let Ok(input) = rx.recv() {
                    let outcome = process_one(input, output_dir, config, suppressor);
                    outcomes.lock().push(outcome);
                }
            });
        }
    });
    outcomes.into_inner()
}

/// Run the full per-file pipeline, converting any error into a `Failure`.
fn process_one<S>(
    input: &Path,
    output_dir: &Path,
    config: &BatchConfig,
    suppressor: &S,
) -> FileOutcome
where
    S: NoiseSuppressor + ?Sized,
{
    info!(file = %input.display(), "processing");
    match clean_file(input, output_dir, config, suppressor) {
        Ok((output, samples)) => {
            info!(file = %input.display(), output = %output.display(), "cleaned");
            FileOutcome::Success {
                input: input.to_path_buf(),
                output,
                samples,
            }
        }
        Err(e) => {
            warn!(file = %input.display(), error = %e, "failed");
            FileOutcome::Failure {
                input: input.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

fn clean_file<S>(
    input: &Path,
    output_dir: &Path,
    config: &BatchConfig,
    suppressor: &S,
) -> Result<(PathBuf, usize)>
where
    S: NoiseSuppressor + ?Sized,
{
    let buffer = codec::decode(input, config.downmix)?;

    // Log roughly every 10% of chunks
    let mut last_logged = 0usize;
    let cleaned = reduce_with_progress(&buffer, &config.params, suppressor, |done, total| {
        let step = (total / 10).max(1);
        if done == total || done - last_logged >= step {
            last_logged = done;
            debug!(file = %input.display(), done, total, "reduction progress");
        }
    })?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| HushError::Codec(format!("unusable file name: {}", input.display())))?;
    let output = output_dir.join(format!("{}{stem}.wav", config.output_prefix));

    stage_output(output_dir, &output, |scratch| {
        codec::encode_wav(&cleaned, std::io::BufWriter::new(scratch.as_file_mut()))
    })?;
    Ok((output, cleaned.len()))
}

/// Run `write` against a per-file unique scratch file in `output_dir`, then
/// persist the scratch to `output`.
///
/// The scratch file does not survive any failure path: a failed write
/// removes it explicitly (a failed removal is logged, never masking the
/// write error), and a failed persist removes it when the handle inside the
/// persist error drops.
fn stage_output(
    output_dir: &Path,
    output: &Path,
    write: impl FnOnce(&mut NamedTempFile) -> Result<()>,
) -> Result<()> {
    let mut scratch = NamedTempFile::new_in(output_dir)?;
    match write(&mut scratch) {
        Ok(()) => {
            scratch.persist(output).map_err(|e| HushError::Io(e.error))?;
            Ok(())
        }
        Err(e) => {
            if let Err(close_err) = scratch.close() {
                let cleanup = HushError::Cleanup(close_err.to_string());
                warn!(error = %cleanup, "scratch file not removed");
            }
            Err(e)
        }
    }
}
