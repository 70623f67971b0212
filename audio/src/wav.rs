//! WAV decoding via `hound`.

use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::{AudioError, Waveform};

/// Decodes the audio stored at a location into a [`Waveform`].
///
/// Locations are opaque strings; [`WavDecoder`] treats them as file paths.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use: enrollment decodes
/// samples in parallel.
pub trait Decoder: Send + Sync {
    /// Decodes the audio at `location`.
    fn decode(&self, location: &str) -> Result<Waveform, AudioError>;
}

/// A function that implements the Decoder trait.
pub struct DecodeFunc<F>(pub F);

impl<F> Decoder for DecodeFunc<F>
where
    F: Fn(&str) -> Result<Waveform, AudioError> + Send + Sync,
{
    fn decode(&self, location: &str) -> Result<Waveform, AudioError> {
        (self.0)(location)
    }
}

/// Decodes RIFF/WAVE files (integer PCM of any depth, or 32-bit float).
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl Decoder for WavDecoder {
    fn decode(&self, location: &str) -> Result<Waveform, AudioError> {
        read_wav(location)
    }
}

/// Reads a WAV file into a [`Waveform`].
///
/// Integer samples are scaled by `2^(bits-1)` into `[-1.0, 1.0)`.
pub fn read_wav(path: impl AsRef<Path>) -> Result<Waveform, AudioError> {
    let reader = WavReader::open(path)?;
    decode_wav(reader)
}

/// Decodes WAV data from any reader.
pub fn read_wav_from<R: Read>(reader: R) -> Result<Waveform, AudioError> {
    let reader = WavReader::new(reader)?;
    decode_wav(reader)
}

fn decode_wav<R: Read>(mut reader: WavReader<R>) -> Result<Waveform, AudioError> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(AudioError::InvalidFormat("wav header declares 0 channels".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::InvalidFormat(format!(
                    "unsupported bit depth {}",
                    spec.bits_per_sample
                )));
            }
            let max = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(Waveform::from_interleaved(
        spec.sample_rate,
        channels,
        &interleaved,
    ))
}
