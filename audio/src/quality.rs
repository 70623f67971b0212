//! Heuristic recording quality estimation.
//!
//! The SNR estimate compares the RMS energy of the whole signal against a
//! noise floor taken as a low percentile of short-frame RMS values. It is a
//! relative cleanliness score for weighting reference recordings, not a
//! calibrated acoustic measurement.
//!
//! # Algorithm
//!
//! ```text
//! mono      = mean over channels
//! rms_total = sqrt(mean(mono^2))           -> 0 dB if near zero
//! frames    = floor(len / frame_len)       -> short_signal_snr_db if < min_frames
//! floor     = percentile(frame_rms, p)     -> clean_floor_snr_db if near zero
//! snr       = 20 * log10(rms_total / floor), clamped to [0, max_snr_db]
//! ```

use serde::{Deserialize, Serialize};

use crate::Waveform;

/// Tunables for [`estimate_snr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Frame length in milliseconds (default: 20).
    pub frame_ms: f64,
    /// Minimum number of whole frames needed to estimate a noise floor (default: 10).
    pub min_frames: usize,
    /// Percentile of frame RMS values used as the noise floor (default: 10).
    pub noise_percentile: f64,
    /// RMS values below this are treated as silence (default: 1e-10).
    pub silence_rms: f64,
    /// Upper clamp for the estimate in dB (default: 60).
    pub max_snr_db: f32,
    /// Reported when the noise floor is silent but the signal is not (default: 40).
    pub clean_floor_snr_db: f32,
    /// Reported when the signal is too short for a noise-floor estimate (default: 20).
    pub short_signal_snr_db: f32,
    /// Reported when the audio cannot be decoded at all (default: 20).
    pub decode_failure_snr_db: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            frame_ms: 20.0,
            min_frames: 10,
            noise_percentile: 10.0,
            silence_rms: 1e-10,
            max_snr_db: 60.0,
            clean_floor_snr_db: 40.0,
            short_signal_snr_db: 20.0,
            decode_failure_snr_db: 20.0,
        }
    }
}

impl QualityConfig {
    /// Returns the frame length in samples for `sample_rate`, at least 1.
    pub fn frame_len(&self, sample_rate: u32) -> usize {
        ((sample_rate as f64 * self.frame_ms / 1000.0) as usize).max(1)
    }
}

/// Estimates the signal-to-noise ratio of a waveform in dB.
///
/// Always returns a value: 0 for empty or silent audio, a configured
/// fallback when there is too little audio or no measurable noise floor,
/// and otherwise the clamped estimate.
pub fn estimate_snr(wave: &Waveform, cfg: &QualityConfig) -> f32 {
    if wave.is_empty() || wave.sample_rate() == 0 {
        return 0.0;
    }

    let mono = wave.to_mono();
    let rms_total = rms(&mono);
    if !rms_total.is_finite() || rms_total < cfg.silence_rms {
        return 0.0;
    }

    let frame_len = cfg.frame_len(wave.sample_rate());
    let mut levels = frame_rms(&mono, frame_len);
    if levels.len() < cfg.min_frames.max(1) {
        return cfg.short_signal_snr_db;
    }

    let defaults = QualityConfig::default();
    let p = if cfg.noise_percentile.is_finite() {
        cfg.noise_percentile
    } else {
        defaults.noise_percentile
    };
    let noise_floor = percentile(&mut levels, p);
    if noise_floor < cfg.silence_rms {
        return cfg.clean_floor_snr_db;
    }

    let ceiling = if cfg.max_snr_db.is_finite() {
        cfg.max_snr_db.max(0.0)
    } else {
        defaults.max_snr_db
    };
    let snr = 20.0 * (rms_total / noise_floor).log10();
    (snr as f32).max(0.0).min(ceiling)
}

/// Root-mean-square of `samples`, accumulated in f64. 0 for an empty slice.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// RMS of each whole frame of `frame_len` samples. A trailing partial
/// frame is ignored.
pub fn frame_rms(samples: &[f32], frame_len: usize) -> Vec<f64> {
    if frame_len == 0 {
        return Vec::new();
    }
    samples.chunks_exact(frame_len).map(rms).collect()
}

/// Returns the `p`-th percentile (0..=100) of `values` using linear
/// interpolation between the closest ranks. Sorts `values` in place.
///
/// Returns 0 for an empty slice.
pub fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    values[lo] + (values[hi] - values[lo]) * frac
}
