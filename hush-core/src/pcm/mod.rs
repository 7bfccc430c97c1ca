//! PCM sample buffer and the explicit downmix policy.
//!
//! A `PcmBuffer` is the unit of work for the reduction engine: a fixed-length
//! sequence of signed 16-bit samples at a known rate. Multi-channel sources
//! are downmixed at construction time — the policy is a named parameter, not
//! a hidden default.

/// How a multi-channel source is reduced to mono.
///
/// The only supported policy selects channel 0 outright. Averaging channels
/// is deliberately not offered: a perceptual mix changes the noise floor the
/// suppressor sees, and the batch tool promises channel-0 semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownmixPolicy {
    /// Keep channel 0, discard the rest.
    FirstChannel,
}

/// A mono block of i16 PCM samples at a known sample rate.
///
/// The sample count is fixed once constructed and samples are never
/// reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl PcmBuffer {
    /// Wrap an already-mono sample vector.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Build a mono buffer from interleaved multi-channel samples.
    ///
    /// `channels` is the channel count of the interleaved data. Extra
    /// trailing samples of a torn final frame are dropped.
    pub fn from_interleaved(
        interleaved: &[i16],
        sample_rate: u32,
        channels: u16,
        policy: DownmixPolicy,
    ) -> Self {
        if channels <= 1 {
            return Self::new(interleaved.to_vec(), sample_rate);
        }
        let samples = match policy {
            DownmixPolicy::FirstChannel => interleaved
                .chunks_exact(channels as usize)
                .map(|frame| frame[0])
                .collect(),
        };
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Consume the buffer and return the owned sample vector.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the duration of this buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
