//! Spectral gating noise suppressor.
//!
//! ## Algorithm
//!
//! 1. STFT the chunk: Hann window, 1024-point FFT, 50% hop.
//! 2. Estimate a per-bin noise floor as the mean magnitude of the quietest
//!    ~10% of frames (minimum-statistics flavor).
//! 3. Gate: bins whose magnitude falls below `threshold_factor × floor` are
//!    scaled by `1 - aggressiveness`; louder bins pass unchanged.
//! 4. Inverse FFT, synthesis window, overlap-add, normalize by the summed
//!    window energy.
//!
//! Chunks shorter than one FFT frame fall back to a broadband RMS gate with
//! the same gain-floor rule. Output length always equals input length.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::NoiseSuppressor;

/// FFT frame length in samples.
const FFT_SIZE: usize = 1024;

/// Hop between consecutive frames (50% overlap).
const HOP: usize = FFT_SIZE / 2;

/// Fraction of frames (by energy, ascending) used for the noise floor.
const NOISE_QUANTILE: f32 = 0.10;

/// A bin must exceed this multiple of the noise floor to escape the gate.
///
/// The floor is the mean over the quietest frames, so typical noise bins
/// fluctuate well above it; the factor has to cover that spread or roughly
/// half the noise energy slips through the gate.
const THRESHOLD_FACTOR: f32 = 2.5;

/// RMS level (i16 domain) below which a short chunk is treated as noise.
const SHORT_CHUNK_GATE_RMS: f32 = 650.0;

/// Denominator guard for overlap-add normalization.
const WINDOW_SUM_EPS: f32 = 1e-6;

/// Stationary-noise suppressor built on short-time spectral gating.
pub struct SpectralGate {
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl SpectralGate {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(FFT_SIZE);
        let inverse = planner.plan_fft_inverse(FFT_SIZE);

        // Hann window
        let window = (0..FFT_SIZE)
            .map(|i| {
                let phase = std::f32::consts::TAU * i as f32 / FFT_SIZE as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        Self {
            forward,
            inverse,
            window,
        }
    }

    /// Broadband gate for chunks too short for an FFT frame.
    fn gate_short_chunk(samples: &[f32], aggressiveness: f32) -> Vec<f32> {
        let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
        let rms = (sum_sq / samples.len() as f32).sqrt();
        if rms >= SHORT_CHUNK_GATE_RMS {
            return samples.to_vec();
        }
        let gain = 1.0 - aggressiveness;
        samples.iter().map(|&s| s * gain).collect()
    }

    /// Windowed forward FFT of the frame starting at `start` in the padded
    /// signal (`HOP` leading zeros, zero-padded past the end of `samples`).
    ///
    /// The half-frame lead-in guarantees every real sample is covered by two
    /// overlapping Hann windows, so the overlap-add denominator never
    /// degenerates at the chunk edges.
    fn analyze(&self, samples: &[f32], start: usize) -> Vec<Complex<f32>> {
        let mut frame: Vec<Complex<f32>> = (0..FFT_SIZE)
            .map(|i| {
                let padded_idx = start + i;
                let sample = if padded_idx >= HOP {
                    samples.get(padded_idx - HOP).copied().unwrap_or(0.0)
                } else {
                    0.0
                };
                Complex::new(sample * self.window[i], 0.0)
            })
            .collect();
        self.forward.process(&mut frame);
        frame
    }

    /// Per-bin mean magnitude over the quietest frames.
    ///
    /// The first and last frame overlap the zero padding and would bias the
    /// floor low, so they are excluded when enough frames remain.
    fn noise_floor(spectra: &[Vec<Complex<f32>>]) -> Vec<f32> {
        let spectra = if spectra.len() > 3 {
            &spectra[1..spectra.len() - 1]
        } else {
            spectra
        };
        let mut by_energy: Vec<usize> = (0..spectra.len()).collect();
        by_energy.sort_by(|&a, &b| {
            let ea: f32 = spectra[a].iter().map(|c| c.norm_sqr()).sum();
            let eb: f32 = spectra[b].iter().map(|c| c.norm_sqr()).sum();
            ea.total_cmp(&eb)
        });

        let quiet = ((spectra.len() as f32 * NOISE_QUANTILE).ceil() as usize).max(1);
        let mut floor = vec![0.0f32; FFT_SIZE];
        for &idx in &by_energy[..quiet] {
            for (f, c) in floor.iter_mut().zip(spectra[idx].iter()) {
                *f += c.norm();
            }
        }
        for f in &mut floor {
            *f /= quiet as f32;
        }
        floor
    }
}

impl Default for SpectralGate {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSuppressor for SpectralGate {
    fn suppress(&self, samples: &[f32], _sample_rate: u32, aggressiveness: f32) -> Vec<f32> {
        if samples.is_empty() {
            return Vec::new();
        }
        if samples.len() < FFT_SIZE {
            return Self::gate_short_chunk(samples, aggressiveness);
        }

        // One extra frame for the half-frame lead-in
        let frame_count = samples.len().div_ceil(HOP) + 1;
        let spectra: Vec<Vec<Complex<f32>>> = (0..frame_count)
            .map(|f| self.analyze(samples, f * HOP))
            .collect();

        let floor = Self::noise_floor(&spectra);
        let gain_floor = 1.0 - aggressiveness;

        let padded_len = (frame_count - 1) * HOP + FFT_SIZE;
        let mut out = vec![0.0f32; padded_len];
        let mut window_sum = vec![0.0f32; padded_len];

        for (f, spectrum) in spectra.into_iter().enumerate() {
            let mut frame = spectrum;
            for (bin, c) in frame.iter_mut().enumerate() {
                if c.norm() < THRESHOLD_FACTOR * floor[bin] {
                    *c *= gain_floor;
                }
            }
            self.inverse.process(&mut frame);

            let start = f * HOP;
            for i in 0..FFT_SIZE {
                // rustfft's inverse is unnormalized
                let sample = frame[i].re / FFT_SIZE as f32;
                out[start + i] += sample * self.window[i];
                window_sum[start + i] += self.window[i] * self.window[i];
            }
        }

        // Strip the lead-in, normalize by the accumulated window energy
        let mut result = out[HOP..HOP + samples.len()].to_vec();
        for (i, sample) in result.iter_mut().enumerate() {
            if window_sum[HOP + i] > WINDOW_SUM_EPS {
                *sample /= window_sum[HOP + i];
            }
        }
        result
    }
}
