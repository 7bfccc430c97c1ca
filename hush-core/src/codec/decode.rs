//! Symphonia-based decoding to a mono `PcmBuffer`.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{HushError, Result};
use crate::pcm::{DownmixPolicy, PcmBuffer};

/// Decode an audio file into a mono 16-bit `PcmBuffer`.
///
/// Multi-channel sources are downmixed according to `policy` (channel
/// selection, never averaging). All sample formats are converted to i16.
///
/// # Errors
///
/// `HushError::Codec` for unreadable files, unsupported containers or
/// codecs, and streams without a decodeable audio track.
pub fn decode(path: &Path, policy: DownmixPolicy) -> Result<PcmBuffer> {
    let src = File::open(path)
        .map_err(|e| HushError::Codec(format!("cannot open {}: {e}", path.display())))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_stream(mss, &hint, policy, &path.display().to_string())
}

fn decode_stream(
    mss: MediaSourceStream,
    hint: &Hint,
    policy: DownmixPolicy,
    source: &str,
) -> Result<PcmBuffer> {
    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| HushError::Codec(format!("unsupported format {source}: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| HushError::Codec(format!("no decodeable audio track in {source}")))?;
    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| HushError::Codec(format!("unknown sample rate in {source}")))?;

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(|e| HushError::Codec(format!("unsupported codec {source}: {e}")))?;

    // Only channel 0 is collected; the buffer is mono from the start.
    let DownmixPolicy::FirstChannel = policy;
    let mut samples: Vec<i16> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream presents as UnexpectedEof in Symphonia. Any
            // other read failure is a real error; breaking on it would
            // silently truncate the decoded audio.
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::IoError(e)) => {
                return Err(HushError::Codec(format!("read error in {source}: {e}")))
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(HushError::Codec(format!("demux error in {source}: {e}"))),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => extend_from_channel0(&mut samples, &decoded),
            // A corrupt packet is skipped; the stream may still recover
            Err(SymphoniaError::DecodeError(e)) => {
                debug!(source, "skipping corrupt packet: {e}");
            }
            Err(e) => return Err(HushError::Codec(format!("decode error in {source}: {e}"))),
        }
    }

    debug!(source, samples = samples.len(), sample_rate, "decoded");
    Ok(PcmBuffer::new(samples, sample_rate))
}

#[inline]
fn f32_to_i16(s: f32) -> i16 {
    (s * 32_768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

fn extend_from_channel0(samples: &mut Vec<i16>, decoded: &AudioBufferRef<'_>) {
    match decoded {
        AudioBufferRef::S16(buf) => samples.extend(buf.chan(0).iter().copied()),
        AudioBufferRef::F32(buf) => samples.extend(buf.chan(0).iter().map(|&s| f32_to_i16(s))),
        AudioBufferRef::F64(buf) => {
            samples.extend(buf.chan(0).iter().map(|&s| f32_to_i16(s as f32)))
        }
        AudioBufferRef::S32(buf) => samples.extend(buf.chan(0).iter().map(|&s| (s >> 16) as i16)),
        AudioBufferRef::S24(buf) => {
            samples.extend(buf.chan(0).iter().map(|&s| (s.inner() >> 8) as i16))
        }
        AudioBufferRef::S8(buf) => samples.extend(buf.chan(0).iter().map(|&s| (s as i16) << 8)),
        AudioBufferRef::U8(buf) => {
            samples.extend(buf.chan(0).iter().map(|&s| ((s as i16) - 128) << 8))
        }
        AudioBufferRef::U16(buf) => {
            samples.extend(buf.chan(0).iter().map(|&s| (s as i32 - 32_768) as i16))
        }
        AudioBufferRef::U24(buf) => samples.extend(
            buf.chan(0)
                .iter()
                .map(|&s| ((s.inner() as i32 - 8_388_608) >> 8) as i16),
        ),
        AudioBufferRef::U32(buf) => samples.extend(
            buf.chan(0)
                .iter()
                .map(|&s| ((s as i64 - 2_147_483_648) >> 16) as i16),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read, Seek, SeekFrom};
    use symphonia::core::io::MediaSource;

    /// In-memory source whose reads start failing once the cursor passes
    /// `fail_after` bytes.
    struct FailingReader {
        inner: Cursor<Vec<u8>>,
        fail_after: u64,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.inner.position() >= self.fail_after {
                return Err(io::Error::new(io::ErrorKind::Other, "device fault"));
            }
            self.inner.read(buf)
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    impl MediaSource for FailingReader {
        fn is_seekable(&self) -> bool {
            true
        }

        fn byte_len(&self) -> Option<u64> {
            Some(self.inner.get_ref().len() as u64)
        }
    }

    fn wav_bytes(samples: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..samples {
                writer.write_sample((i % 2000) as i16 - 1000).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn mid_stream_read_failure_is_a_codec_error_not_silent_truncation() {
        // Roughly 88 KB of valid WAV; the source dies at 40 KB, well past
        // the header but long before the end of the sample data.
        let bytes = wav_bytes(44_100);
        assert!(bytes.len() as u64 > 40_000);
        let src = FailingReader {
            inner: Cursor::new(bytes),
            fail_after: 40_000,
        };
        let mss = MediaSourceStream::new(Box::new(src), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("wav");

        match decode_stream(mss, &hint, DownmixPolicy::FirstChannel, "in-memory wav") {
            Err(HushError::Codec(msg)) => assert!(msg.contains("read error"), "{msg}"),
            other => panic!("expected a codec error, got {other:?}"),
        }
    }

    #[test]
    fn clean_end_of_stream_decodes_every_sample() {
        let bytes = wav_bytes(10_000);
        let src = FailingReader {
            inner: Cursor::new(bytes),
            fail_after: u64::MAX,
        };
        let mss = MediaSourceStream::new(Box::new(src), Default::default());
        let mut hint = Hint::new();
        hint.with_extension("wav");

        let buffer = decode_stream(mss, &hint, DownmixPolicy::FirstChannel, "in-memory wav")
            .unwrap();
        assert_eq!(buffer.len(), 10_000);
        assert_eq!(buffer.sample_rate(), 44_100);
    }
}
