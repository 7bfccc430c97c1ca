//! # hush-core
//!
//! Batch noise-reduction engine SDK.
//!
//! ## Pipeline
//!
//! ```text
//! input file → codec::decode (downmix to mono) → PcmBuffer
//!                                                    │
//!                                       engine::reduce (chunked)
//!                                                    │
//!                                       NoiseSuppressor per chunk
//!                                                    │
//!                      codec::encode_wav → staged temp file → output path
//! ```
//!
//! Each file in a batch is processed independently; one bad file never
//! aborts the run. The engine guarantees the cleaned buffer has exactly
//! the same sample count as the input and that every sample stays inside
//! the 16-bit signed range.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod batch;
pub mod codec;
pub mod engine;
pub mod error;
pub mod pcm;
pub mod suppress;

// Convenience re-exports for downstream crates
pub use batch::{run_batch, BatchConfig, BatchSummary, FileOutcome};
pub use engine::{reduce, reduce_with_progress, ChunkPlan, ReductionParams};
pub use error::HushError;
pub use pcm::{DownmixPolicy, PcmBuffer};
pub use suppress::{NoiseSuppressor, SpectralGate};
