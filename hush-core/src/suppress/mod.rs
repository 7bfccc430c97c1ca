//! Noise suppression abstraction.
//!
//! `NoiseSuppressor` is the extensibility point of the engine: the chunked
//! reducer treats it as an opaque, pure primitive. The stock implementation
//! is [`SpectralGate`]; tests swap in trivial suppressors.

pub mod spectral;

pub use spectral::SpectralGate;

/// A pure noise-suppression primitive.
///
/// Samples are f32 values in the i16 numeric range ([-32768, 32767]).
/// Implementations must return exactly as many samples as they were given —
/// the engine enforces this and aborts the file on a mismatch. Results may
/// overshoot the i16 range; the engine quantizes and clamps.
///
/// Implementations take `&self` and hold no per-call mutable state, so one
/// suppressor may serve concurrent reductions.
pub trait NoiseSuppressor: Send + Sync {
    /// Attenuate noise in `samples`, returning a same-length vector.
    ///
    /// `aggressiveness` in [0.0, 1.0] scales the suppression depth:
    /// 0.0 leaves gated content untouched, 1.0 silences it.
    fn suppress(&self, samples: &[f32], sample_rate: u32, aggressiveness: f32) -> Vec<f32>;
}
