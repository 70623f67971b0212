use serde::{Deserialize, Serialize};

use crate::sample::SampleRecord;

/// Controls how duration and quality combine into a sample weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Share of the weight driven by relative duration (default: 0.7).
    pub duration_share: f64,
    /// Share of the weight driven by quality (default: 0.3).
    pub quality_share: f64,
    /// Quality at or above this many dB earns the full quality share (default: 40).
    pub quality_ceiling_db: f32,
    /// Quality assumed for records without an estimate (default: 20).
    pub fallback_quality_db: f32,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            duration_share: 0.7,
            quality_share: 0.3,
            quality_ceiling_db: 40.0,
            fallback_quality_db: 20.0,
        }
    }
}

impl WeightConfig {
    /// Maps a quality estimate onto `[0, 1]`.
    pub fn quality_weight(&self, record: &SampleRecord) -> f64 {
        if self.quality_ceiling_db <= 0.0 {
            return 1.0;
        }
        let q = record.quality_or(self.fallback_quality_db) as f64;
        (q / self.quality_ceiling_db as f64).clamp(0.0, 1.0)
    }
}

/// Assigns each record a weight from its duration and quality, normalized
/// so the weights of the set sum to 1.
///
/// When the total duration is 0 every weight is set to 0; the fuser then
/// falls back to uniform weighting.
pub fn assign_weights(records: &mut [SampleRecord], cfg: &WeightConfig) {
    let total_duration: f64 = records.iter().map(|r| r.duration.max(0.0)).sum();
    if total_duration <= 0.0 {
        for r in records.iter_mut() {
            r.weight = 0.0;
        }
        return;
    }

    for r in records.iter_mut() {
        let duration_weight = r.duration.max(0.0) / total_duration;
        let quality_weight = cfg.quality_weight(r);
        r.weight =
            (cfg.duration_share * duration_weight + cfg.quality_share * quality_weight).max(0.0);
    }

    let total_weight: f64 = records.iter().map(|r| r.weight).sum();
    if total_weight > 0.0 {
        for r in records.iter_mut() {
            r.weight /= total_weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration: f64, quality: Option<f32>) -> SampleRecord {
        let mut r = SampleRecord::new("x.wav", None);
        r.duration = duration;
        r.quality_estimate = quality;
        r
    }

    #[test]
    fn three_sample_scenario() {
        let mut rs = vec![
            record(5.0, Some(10.0)),
            record(10.0, Some(30.0)),
            record(15.0, Some(35.0)),
        ];
        let cfg = WeightConfig::default();

        let qw: Vec<f64> = rs.iter().map(|r| cfg.quality_weight(r)).collect();
        assert!((qw[0] - 0.25).abs() < 1e-9);
        assert!((qw[1] - 0.75).abs() < 1e-9);
        assert!((qw[2] - 0.875).abs() < 1e-9);

        assign_weights(&mut rs, &cfg);

        let raw: [f64; 3] = [
            0.7 * (5.0 / 30.0) + 0.3 * 0.25,
            0.7 * (10.0 / 30.0) + 0.3 * 0.75,
            0.7 * (15.0 / 30.0) + 0.3 * 0.875,
        ];
        assert!((raw[0] - 0.191_666).abs() < 1e-4);
        assert!((raw[1] - 0.458_333).abs() < 1e-4);
        assert!((raw[2] - 0.6125).abs() < 1e-9);
        let raw_total: f64 = raw.iter().sum();
        for (r, raw) in rs.iter().zip(raw) {
            assert!((r.weight - raw / raw_total).abs() < 1e-9);
        }

        let sum: f64 = rs.iter().map(|r| r.weight).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(rs[0].weight < rs[1].weight && rs[1].weight < rs[2].weight);
    }

    #[test]
    fn missing_quality_uses_fallback() {
        let cfg = WeightConfig::default();
        assert!((cfg.quality_weight(&record(1.0, None)) - 0.5).abs() < 1e-9);
        assert_eq!(cfg.quality_weight(&record(1.0, Some(55.0))), 1.0);
        assert_eq!(cfg.quality_weight(&record(1.0, Some(0.0))), 0.0);
    }

    #[test]
    fn weights_sum_to_one() {
        let mut rs = vec![
            record(0.4, Some(60.0)),
            record(12.0, None),
            record(3.3, Some(2.0)),
            record(0.0, Some(20.0)),
        ];
        assign_weights(&mut rs, &WeightConfig::default());
        let sum: f64 = rs.iter().map(|r| r.weight).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(rs.iter().all(|r| r.weight >= 0.0));
    }

    #[test]
    fn zero_total_duration_zeroes_weights() {
        let mut rs = vec![record(0.0, Some(30.0)), record(0.0, None)];
        rs[0].weight = 0.9;
        assign_weights(&mut rs, &WeightConfig::default());
        assert!(rs.iter().all(|r| r.weight == 0.0));
    }

    #[test]
    fn custom_shares() {
        let cfg = WeightConfig {
            duration_share: 1.0,
            quality_share: 0.0,
            ..Default::default()
        };
        let mut rs = vec![record(1.0, Some(60.0)), record(3.0, Some(0.0))];
        assign_weights(&mut rs, &cfg);
        assert!((rs[0].weight - 0.25).abs() < 1e-9);
        assert!((rs[1].weight - 0.75).abs() < 1e-9);
    }
}
