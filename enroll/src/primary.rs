//! Choosing which sample supplies the reference code and text.
//!
//! Selection happens twice. At analysis time the best-scoring sample
//! (preferring transcribed ones) becomes the sole primary. At assembly time
//! reference mode needs a transcript, so a transcribed sample is preferred
//! even over a primary without one.

use crate::sample::SampleRecord;

/// Marks the record maximizing `duration * quality` as the only primary.
///
/// Candidates are the records with a non-blank transcript, or all records
/// if none has one. Records without a quality estimate score with
/// `fallback_quality_db`. Ties keep the earliest record.
///
/// Returns the index of the new primary, or `None` for an empty set.
pub fn select_primary(records: &mut [SampleRecord], fallback_quality_db: f32) -> Option<usize> {
    let score = |r: &SampleRecord| r.duration * r.quality_or(fallback_quality_db) as f64;

    let transcribed: Vec<usize> = (0..records.len())
        .filter(|&i| records[i].has_transcript())
        .collect();
    let candidates: Vec<usize> = if transcribed.is_empty() {
        (0..records.len()).collect()
    } else {
        transcribed
    };

    let mut best: Option<(usize, f64)> = None;
    for i in candidates {
        let s = score(&records[i]);
        match best {
            Some((_, best_score)) if s <= best_score => {}
            _ => best = Some((i, s)),
        }
    }

    let (best_idx, _) = best?;
    for (i, r) in records.iter_mut().enumerate() {
        r.is_primary = i == best_idx;
    }
    Some(best_idx)
}

/// Picks the record whose reference fields seed the fused prompt.
///
/// Outside embedding-only mode the order of preference is: a primary with
/// a transcript, any record with a transcript, the primary, the first
/// record. In embedding-only mode transcripts are irrelevant and only the
/// last two steps apply.
///
/// Returns `None` only for an empty set.
pub fn select_reference(records: &[SampleRecord], embedding_only: bool) -> Option<usize> {
    if records.is_empty() {
        return None;
    }

    if !embedding_only {
        if let Some(i) = records
            .iter()
            .position(|r| r.is_primary && r.has_transcript())
        {
            return Some(i);
        }
        if let Some(i) = records.iter().position(|r| r.has_transcript()) {
            return Some(i);
        }
    }

    records.iter().position(|r| r.is_primary).or(Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(duration: f64, quality: Option<f32>, transcript: Option<&str>) -> SampleRecord {
        let mut r = SampleRecord::new("x.wav", transcript.map(String::from));
        r.duration = duration;
        r.quality_estimate = quality;
        r
    }

    #[test]
    fn better_transcribed_sample_takes_over() {
        let mut rs = vec![
            record(4.0, Some(20.0), Some("first")),
            record(8.0, Some(30.0), Some("second")),
        ];
        rs[0].is_primary = true;
        assert_eq!(select_primary(&mut rs, 20.0), Some(1));
        assert!(!rs[0].is_primary);
        assert!(rs[1].is_primary);
    }

    #[test]
    fn transcribed_samples_outrank_better_untranscribed() {
        let mut rs = vec![
            record(30.0, Some(50.0), None),
            record(2.0, Some(10.0), Some("hello")),
            record(1.0, Some(10.0), Some("   ")),
        ];
        assert_eq!(select_primary(&mut rs, 20.0), Some(1));
        assert_eq!(rs.iter().filter(|r| r.is_primary).count(), 1);
    }

    #[test]
    fn all_untranscribed_uses_best_score() {
        let mut rs = vec![
            record(5.0, None, None),
            record(4.0, Some(30.0), None),
            record(6.0, Some(10.0), None),
        ];
        // Scores: 100, 120, 60.
        assert_eq!(select_primary(&mut rs, 20.0), Some(1));
    }

    #[test]
    fn ties_keep_earliest() {
        let mut rs = vec![record(2.0, Some(10.0), None), record(1.0, Some(20.0), None)];
        assert_eq!(select_primary(&mut rs, 20.0), Some(0));

        let mut zeros = vec![record(0.0, Some(0.0), None), record(0.0, None, None)];
        assert_eq!(select_primary(&mut zeros, 20.0), Some(0));
    }

    #[test]
    fn empty_set() {
        assert_eq!(select_primary(&mut [], 20.0), None);
        assert_eq!(select_reference(&[], false), None);
    }

    #[test]
    fn reference_prefers_primary_with_transcript() {
        let mut rs = vec![
            record(1.0, None, Some("a")),
            record(1.0, None, Some("b")),
        ];
        rs[1].is_primary = true;
        assert_eq!(select_reference(&rs, false), Some(1));
    }

    #[test]
    fn reference_prefers_any_transcript_over_bare_primary() {
        let mut rs = vec![
            record(1.0, None, None),
            record(1.0, None, None),
            record(1.0, None, Some("text")),
        ];
        rs[0].is_primary = true;
        assert_eq!(select_reference(&rs, false), Some(2));
        assert_eq!(select_reference(&rs, true), Some(0));
    }

    #[test]
    fn reference_falls_back_to_first() {
        let rs = vec![record(1.0, None, None), record(1.0, None, None)];
        assert_eq!(select_reference(&rs, false), Some(0));
        assert_eq!(select_reference(&rs, true), Some(0));
    }
}
