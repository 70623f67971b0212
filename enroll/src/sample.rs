use serde::{Deserialize, Serialize};

/// One reference recording and the metrics derived from it.
///
/// Records are created by [`crate::analyze_samples`], which fills in
/// `duration`, `quality_estimate`, `weight` and `is_primary`. After that
/// they are only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Location of the source audio. Opaque to this crate.
    pub path: String,

    /// Length in seconds. 0 when the audio could not be decoded.
    pub duration: f64,

    /// Text spoken in the recording, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    /// Heuristic SNR in dB, higher is cleaner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_estimate: Option<f32>,

    /// Whether this sample seeds the reference code/text of the prompt.
    #[serde(default)]
    pub is_primary: bool,

    /// Share of this sample in the fused embedding.
    #[serde(default)]
    pub weight: f64,
}

impl SampleRecord {
    /// Creates an unanalyzed record.
    pub fn new(path: impl Into<String>, transcript: Option<String>) -> Self {
        Self {
            path: path.into(),
            duration: 0.0,
            transcript,
            quality_estimate: None,
            is_primary: false,
            weight: 0.0,
        }
    }

    /// Returns the transcript if it contains anything besides whitespace.
    pub fn usable_transcript(&self) -> Option<&str> {
        self.transcript.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Returns true if the record carries a non-blank transcript.
    pub fn has_transcript(&self) -> bool {
        self.usable_transcript().is_some()
    }

    /// Returns the quality estimate, or `fallback` when none was computed.
    pub fn quality_or(&self, fallback: f32) -> f32 {
        self.quality_estimate.unwrap_or(fallback)
    }
}
