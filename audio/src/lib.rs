//! Audio utilities for voice enrollment.
//!
//! This crate provides the signal-level pieces of the enrollment pipeline:
//!
//! - [`Waveform`]: decoded, de-interleaved f32 samples with their sample rate
//! - [`Decoder`] / [`WavDecoder`]: turn an audio location into a [`Waveform`]
//! - [`quality`]: frame RMS statistics and a heuristic SNR estimate
//!
//! # Example
//!
//! ```rust
//! use voxfuse_audio::{quality, QualityConfig, Waveform};
//!
//! // One second of a 440 Hz tone at 16 kHz.
//! let samples: Vec<f32> = (0..16000)
//!     .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 16000.0).sin() * 0.5)
//!     .collect();
//! let wave = Waveform::mono(16000, samples);
//!
//! assert!((wave.duration_secs() - 1.0).abs() < 1e-9);
//! let snr = quality::estimate_snr(&wave, &QualityConfig::default());
//! assert!((0.0..=60.0).contains(&snr));
//! ```

mod error;
pub mod quality;
mod waveform;
mod wav;

pub use error::AudioError;
pub use quality::{QualityConfig, estimate_snr};
pub use waveform::Waveform;
pub use wav::{DecodeFunc, Decoder, WavDecoder, read_wav, read_wav_from};
