//! Chunked noise-reduction engine.
//!
//! ## Per-buffer flow
//!
//! ```text
//! 1. Validate ReductionParams
//! 2. ChunkPlan: fixed-stride spans, final span absorbs the remainder
//! 3. Per span (ascending offset): suppressor(chunk, rate, aggressiveness)
//! 4. Enforce the same-length contract on the suppressor result
//! 5. Quantize (round-to-nearest, clamp to i16) into the output buffer
//! 6. Notify the progress observer (chunks_done, chunks_total)
//! ```
//!
//! The output buffer always has exactly the input's sample count. The output
//! is pre-filled with zero silence so it is fully defined even mid-run; every
//! offset is overwritten before a successful return.

pub mod plan;

pub use plan::{ChunkPlan, Span};

use tracing::{debug, trace};

use crate::error::{HushError, Result};
use crate::pcm::PcmBuffer;
use crate::suppress::NoiseSuppressor;

/// Tuning knobs for one reduction pass.
#[derive(Debug, Clone, Copy)]
pub struct ReductionParams {
    /// Target number of equal-stride partitions. Default: 100.
    pub chunk_count: usize,
    /// Suppression strength in [0.0, 1.0]. Default: 0.8.
    pub aggressiveness: f32,
}

impl Default for ReductionParams {
    fn default() -> Self {
        Self {
            chunk_count: 100,
            aggressiveness: 0.8,
        }
    }
}

impl ReductionParams {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_count == 0 {
            return Err(HushError::InvalidParameters(
                "chunk count must be at least 1".into(),
            ));
        }
        if !self.aggressiveness.is_finite() || !(0.0..=1.0).contains(&self.aggressiveness) {
            return Err(HushError::InvalidParameters(format!(
                "aggressiveness must be in [0, 1], got {}",
                self.aggressiveness
            )));
        }
        Ok(())
    }
}

/// Round-to-nearest, then clamp into the representable i16 range.
///
/// Clamping (never wrapping) is load-bearing: a wrapped sample inverts sign
/// and shows up as a loud click in the cleaned audio.
#[inline]
fn quantize(sample: f32) -> i16 {
    sample.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Reduce noise in `buffer`, returning a new buffer of identical length.
///
/// See [`reduce_with_progress`] for the observable variant.
pub fn reduce<S>(buffer: &PcmBuffer, params: &ReductionParams, suppressor: &S) -> Result<PcmBuffer>
where
    S: NoiseSuppressor + ?Sized,
{
    reduce_with_progress(buffer, params, suppressor, |_, _| {})
}

/// Reduce noise in `buffer`, invoking `observer(chunks_done, chunks_total)`
/// after each completed chunk.
///
/// The observer is purely informational and never affects control flow.
///
/// # Errors
///
/// - `InvalidParameters` if `params` fail validation, or the non-empty
///   buffer is shorter than `params.chunk_count` (stride would be zero).
/// - `SuppressorContractViolation` if the suppressor returns a chunk of a
///   different length than its input. Partial output is discarded.
pub fn reduce_with_progress<S>(
    buffer: &PcmBuffer,
    params: &ReductionParams,
    suppressor: &S,
    mut observer: impl FnMut(usize, usize),
) -> Result<PcmBuffer>
where
    S: NoiseSuppressor + ?Sized,
{
    params.validate()?;

    // Degenerate success: nothing to chunk, suppressor never invoked.
    if buffer.is_empty() {
        return Ok(PcmBuffer::new(Vec::new(), buffer.sample_rate()));
    }

    let plan = ChunkPlan::new(buffer.len(), params.chunk_count)?;
    let total = plan.total();
    debug!(
        samples = buffer.len(),
        chunks = total,
        stride = plan.stride(),
        "starting chunked reduction"
    );

    let input = buffer.samples();
    // Zero-filled so the buffer is fully defined even under partial progress.
    let mut output = vec![0i16; input.len()];
    let mut scratch: Vec<f32> = Vec::with_capacity(plan.stride() * 2);

    for (done, span) in plan.enumerate() {
        scratch.clear();
        scratch.extend(input[span.offset..span.offset + span.len].iter().map(|&s| s as f32));

        let cleaned = suppressor.suppress(&scratch, buffer.sample_rate(), params.aggressiveness);
        if cleaned.len() != span.len {
            return Err(HushError::SuppressorContractViolation {
                expected: span.len,
                actual: cleaned.len(),
            });
        }

        for (dst, &src) in output[span.offset..span.offset + span.len]
            .iter_mut()
            .zip(cleaned.iter())
        {
            *dst = quantize(src);
        }

        trace!(chunk = done + 1, total, offset = span.offset, "chunk reduced");
        observer(done + 1, total);
    }

    Ok(PcmBuffer::new(output, buffer.sample_rate()))
}
