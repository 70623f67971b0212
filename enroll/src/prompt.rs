use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::EnrollError;
use crate::fuser::{FuseOptions, fuse};
use crate::primary::select_reference;
use crate::sample::SampleRecord;

/// Codec frames of a reference recording, one row of codebook indices per
/// frame. Produced and consumed by the synthesis model; opaque here.
pub type ReferenceCode = Vec<Vec<u32>>;

/// Voice-clone prompt for a single recording, as produced by the
/// synthesis model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptItem {
    /// Reference codec frames. Absent in embedding-only mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_code: Option<ReferenceCode>,

    /// Speaker embedding extracted from the recording.
    pub speaker_embedding: Vec<f32>,

    /// Transcript paired with `reference_code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_text: Option<String>,
}

/// The single prompt produced by an enrollment: a fused speaker embedding
/// plus, in reference mode, one sample's reference code and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedPrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_code: Option<ReferenceCode>,

    /// L2-normalized fusion of every sample's speaker embedding.
    pub fused_embedding: Vec<f32>,

    pub embedding_only_mode: bool,

    /// Always `!embedding_only_mode`.
    pub reference_mode_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_text: Option<String>,
}

/// A speech-synthesis model able to build a voice-clone prompt from one
/// reference recording.
///
/// Called once per sample; the model is never asked to batch.
pub trait VoiceCloneModel {
    fn create_voice_clone_prompt(
        &self,
        audio_path: &str,
        transcript: Option<&str>,
        embedding_only: bool,
    ) -> Result<PromptItem, EnrollError>;
}

impl<M: VoiceCloneModel + ?Sized> VoiceCloneModel for &M {
    fn create_voice_clone_prompt(
        &self,
        audio_path: &str,
        transcript: Option<&str>,
        embedding_only: bool,
    ) -> Result<PromptItem, EnrollError> {
        (**self).create_voice_clone_prompt(audio_path, transcript, embedding_only)
    }
}

/// Builds the fused prompt for a set of analyzed samples with default
/// fusion options.
pub fn build_fused_prompt<M: VoiceCloneModel + ?Sized>(
    model: &M,
    records: &[SampleRecord],
    embedding_only: bool,
) -> Result<Vec<FusedPrompt>, EnrollError> {
    build_fused_prompt_with(model, records, embedding_only, &FuseOptions::default())
}

/// Builds the fused prompt for a set of analyzed samples.
///
/// Asks `model` for one prompt item per record, fuses their speaker
/// embeddings using the record weights, and takes the reference code and
/// text from the record chosen by [`select_reference`].
///
/// Returns exactly one prompt. Fails if `records` is empty, if the model
/// fails on any sample, or if the embeddings cannot be fused.
pub fn build_fused_prompt_with<M: VoiceCloneModel + ?Sized>(
    model: &M,
    records: &[SampleRecord],
    embedding_only: bool,
    opts: &FuseOptions,
) -> Result<Vec<FusedPrompt>, EnrollError> {
    if records.is_empty() {
        return Err(EnrollError::NoSamples);
    }

    let items = records
        .iter()
        .map(|r| model.create_voice_clone_prompt(&r.path, r.transcript.as_deref(), embedding_only))
        .collect::<Result<Vec<_>, _>>()?;

    let weights: Vec<f64> = records.iter().map(|r| r.weight).collect();
    let embeddings: Vec<Vec<f32>> = items
        .iter()
        .map(|item| item.speaker_embedding.clone())
        .collect();
    let fusion = fuse(&embeddings, Some(weights.as_slice()), opts)?;
    debug!(
        samples = records.len(),
        kept = fusion.kept.len(),
        fell_back = fusion.fell_back,
        "enroll: fused speaker embeddings"
    );

    let reference = select_reference(records, embedding_only).ok_or(EnrollError::NoSamples)?;
    let item = &items[reference];

    Ok(vec![assemble(fusion.embedding, item, embedding_only)])
}

/// Combines a fused embedding with a reference sample's prompt item.
pub fn assemble(
    fused_embedding: Vec<f32>,
    reference: &PromptItem,
    embedding_only: bool,
) -> FusedPrompt {
    if embedding_only {
        FusedPrompt {
            reference_code: None,
            fused_embedding,
            embedding_only_mode: true,
            reference_mode_enabled: false,
            reference_text: None,
        }
    } else {
        FusedPrompt {
            reference_code: reference.reference_code.clone(),
            fused_embedding,
            embedding_only_mode: false,
            reference_mode_enabled: true,
            reference_text: reference.reference_text.clone(),
        }
    }
}
