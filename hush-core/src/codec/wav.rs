//! 16-bit mono WAV output via hound.

use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{HushError, Result};
use crate::pcm::PcmBuffer;

fn wav_spec(buffer: &PcmBuffer) -> hound::WavSpec {
    hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write `buffer` as 16-bit mono PCM WAV to `writer`.
pub fn encode_wav<W: Write + Seek>(buffer: &PcmBuffer, writer: W) -> Result<()> {
    let mut wav = hound::WavWriter::new(writer, wav_spec(buffer))
        .map_err(|e| HushError::Codec(format!("wav header: {e}")))?;
    for &sample in buffer.samples() {
        wav.write_sample(sample)
            .map_err(|e| HushError::Codec(format!("wav samples: {e}")))?;
    }
    wav.finalize()
        .map_err(|e| HushError::Codec(format!("wav finalize: {e}")))?;
    Ok(())
}

/// Write `buffer` as 16-bit mono PCM WAV to a new file at `path`.
pub fn encode_wav_file(buffer: &PcmBuffer, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    encode_wav(buffer, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip_through_hound() {
        let buffer = PcmBuffer::new(vec![0, 1, -1, 32_767, -32_768, 1234], 22_050);
        let mut cursor = Cursor::new(Vec::new());
        encode_wav(&buffer, &mut cursor).unwrap();

        cursor.set_position(0);
        let mut reader = hound::WavReader::new(cursor).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22_050);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, buffer.samples());
    }

    #[test]
    fn empty_buffer_is_a_valid_wav() {
        let buffer = PcmBuffer::new(Vec::new(), 44_100);
        let mut cursor = Cursor::new(Vec::new());
        encode_wav(&buffer, &mut cursor).unwrap();

        cursor.set_position(0);
        let reader = hound::WavReader::new(cursor).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
