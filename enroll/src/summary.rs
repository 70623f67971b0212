//! Human-readable reporting on a sample set.

use std::path::Path;

use crate::sample::SampleRecord;

/// Samples shorter than this many seconds draw a warning.
pub const MIN_RECOMMENDED_SECS: f64 = 3.0;
/// Quality estimates below this many dB draw a warning.
pub const LOW_QUALITY_DB: f32 = 15.0;
/// Longest/shortest duration ratio above which samples draw a warning.
pub const MAX_DURATION_RATIO: f64 = 5.0;

const SHORT_TOTAL_SECS: f64 = 10.0;
const LONG_TOTAL_SECS: f64 = 60.0;

fn display_name(record: &SampleRecord, index: usize) -> String {
    Path::new(&record.path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("Sample {}", index + 1))
}

fn nonzero_quality(record: &SampleRecord) -> Option<f32> {
    record.quality_estimate.filter(|&q| q != 0.0)
}

/// Formats one line per sample followed by the total duration and a
/// recommendation when the total is very short or very long.
pub fn format_samples_summary(records: &[SampleRecord]) -> String {
    if records.is_empty() {
        return "No samples".to_string();
    }

    let total: f64 = records.iter().map(|r| r.duration).sum();
    let mut lines = Vec::with_capacity(records.len() + 3);

    for (i, r) in records.iter().enumerate() {
        let mut line = format!("• {}: {:.1}s", display_name(r, i), r.duration);
        if r.is_primary {
            line.push_str(" ★");
        }
        if let Some(q) = nonzero_quality(r) {
            line.push_str(&format!(" SNR: {q:.0}dB"));
        }
        lines.push(line);
    }

    lines.push(format!("\nTotal: {:.1}s ({} samples)", total, records.len()));

    if total < SHORT_TOTAL_SECS {
        lines.push("⚠️ Consider adding more samples for better quality".to_string());
    } else if total > LONG_TOTAL_SECS {
        lines.push("⚠️ Total duration is long, consider removing some samples".to_string());
    }

    lines.join("\n")
}

/// Lists quality problems: short samples, low estimated quality, and a
/// large spread of durations across the set.
pub fn sample_warnings(records: &[SampleRecord]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (i, r) in records.iter().enumerate() {
        let name = display_name(r, i);
        if r.duration < MIN_RECOMMENDED_SECS {
            warnings.push(format!(
                "⚠️ {name}: Too short ({:.1}s). Min 3s recommended.",
                r.duration
            ));
        }
        if let Some(q) = nonzero_quality(r) {
            if q < LOW_QUALITY_DB {
                warnings.push(format!("⚠️ {name}: Low audio quality detected (SNR: {q:.0}dB)"));
            }
        }
    }

    if records.len() >= 2 {
        let max = records.iter().map(|r| r.duration).fold(f64::MIN, f64::max);
        let min = records.iter().map(|r| r.duration).fold(f64::MAX, f64::min);
        if max > MAX_DURATION_RATIO * min {
            warnings.push(
                "⚠️ Large duration variance between samples. Ensure all samples are from the same speaker."
                    .to_string(),
            );
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, duration: f64, quality: Option<f32>, primary: bool) -> SampleRecord {
        let mut r = SampleRecord::new(path, None);
        r.duration = duration;
        r.quality_estimate = quality;
        r.is_primary = primary;
        r
    }

    #[test]
    fn empty_summary() {
        assert_eq!(format_samples_summary(&[]), "No samples");
        assert!(sample_warnings(&[]).is_empty());
    }

    #[test]
    fn summary_lines() {
        let rs = vec![
            record("voices/alice/one.wav", 4.04, Some(31.6), true),
            record("two.wav", 3.0, None, false),
            record("", 2.0, Some(0.0), false),
        ];
        let s = format_samples_summary(&rs);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "• one.wav: 4.0s ★ SNR: 32dB");
        assert_eq!(lines[1], "• two.wav: 3.0s");
        assert_eq!(lines[2], "• Sample 3: 2.0s");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Total: 9.0s (3 samples)");
        assert_eq!(lines[5], "⚠️ Consider adding more samples for better quality");
    }

    #[test]
    fn summary_long_total() {
        let rs = vec![record("a.wav", 40.0, None, true), record("b.wav", 30.0, None, false)];
        assert!(
            format_samples_summary(&rs)
                .ends_with("⚠️ Total duration is long, consider removing some samples")
        );

        let rs = vec![record("a.wav", 20.0, None, true)];
        assert!(format_samples_summary(&rs).ends_with("Total: 20.0s (1 samples)"));
    }

    #[test]
    fn warnings_for_short_and_noisy() {
        let rs = vec![
            record("short.wav", 2.5, Some(30.0), true),
            record("noisy.wav", 5.0, Some(12.4), false),
            record("silent.wav", 5.0, Some(0.0), false),
        ];
        assert_eq!(
            sample_warnings(&rs),
            vec![
                "⚠️ short.wav: Too short (2.5s). Min 3s recommended.".to_string(),
                "⚠️ noisy.wav: Low audio quality detected (SNR: 12dB)".to_string(),
            ]
        );
    }

    #[test]
    fn warning_for_duration_spread() {
        let rs = vec![record("a.wav", 4.0, None, true), record("b.wav", 21.0, None, false)];
        let w = sample_warnings(&rs);
        assert_eq!(w.len(), 1);
        assert!(w[0].contains("Large duration variance"));

        let rs = vec![record("a.wav", 4.0, None, true), record("b.wav", 20.0, None, false)];
        assert!(sample_warnings(&rs).is_empty());
    }
}
