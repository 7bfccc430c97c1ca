//! Codec adapter: compressed audio in, 16-bit PCM WAV out.
//!
//! Decoding goes through Symphonia (mp3/flac/ogg/m4a/wav); encoding is
//! always 16-bit mono WAV via hound. Codec failures are file-level errors —
//! the batch orchestrator isolates them to the file that caused them.

pub mod decode;
pub mod wav;

pub use decode::decode;
pub use wav::{encode_wav, encode_wav_file};
