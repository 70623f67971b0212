use rayon::prelude::*;
use tracing::{debug, warn};
use voxfuse_audio::{Decoder, QualityConfig, estimate_snr};

use crate::primary::select_primary;
use crate::sample::SampleRecord;
use crate::weighter::{WeightConfig, assign_weights};

/// Measures one sample: decodes it once, then derives duration and quality.
///
/// Never fails. Audio that cannot be decoded gets a duration of 0 and the
/// configured decode-failure quality.
pub fn measure_sample<D: Decoder + ?Sized>(
    decoder: &D,
    path: &str,
    transcript: Option<String>,
    cfg: &QualityConfig,
) -> SampleRecord {
    let mut record = SampleRecord::new(path, transcript);
    match decoder.decode(path) {
        Ok(wave) => {
            record.duration = wave.duration_secs();
            record.quality_estimate = Some(estimate_snr(&wave, cfg));
        }
        Err(e) => {
            warn!(path, error = %e, "enroll: cannot decode sample, using fallbacks");
            record.duration = 0.0;
            record.quality_estimate = Some(cfg.decode_failure_snr_db);
        }
    }
    debug!(
        path,
        duration = record.duration,
        quality = record.quality_estimate,
        "enroll: measured sample"
    );
    record
}

/// Analyzes a set of reference recordings.
///
/// `transcripts` is matched to `paths` by index; missing entries count as
/// no transcript and extra entries are ignored. Samples are measured in
/// parallel and returned in input order, weighted by [`assign_weights`],
/// with the best candidate marked primary by [`select_primary`].
///
/// Never fails: a bad file degrades its own record only.
pub fn analyze_samples<D, S>(
    decoder: &D,
    paths: &[S],
    transcripts: &[Option<String>],
    quality: &QualityConfig,
    weighting: &WeightConfig,
) -> Vec<SampleRecord>
where
    D: Decoder + ?Sized,
    S: AsRef<str> + Sync,
{
    let mut records: Vec<SampleRecord> = paths
        .par_iter()
        .enumerate()
        .map(|(i, path)| {
            let transcript = transcripts.get(i).cloned().flatten();
            let mut record = measure_sample(decoder, path.as_ref(), transcript, quality);
            record.is_primary = i == 0;
            record
        })
        .collect();

    assign_weights(&mut records, weighting);
    select_primary(&mut records, weighting.fallback_quality_db);
    records
}
