//! Multi-sample voice enrollment.
//!
//! Several reference recordings of one speaker are combined into a single
//! voice-clone prompt whose speaker embedding is a weighted fusion of the
//! per-recording embeddings.
//!
//! # Architecture
//!
//! The pipeline runs in four stages:
//!
//! 1. [`analyze_samples`]: audio paths -> [`SampleRecord`]s with duration
//!    and an SNR-style quality estimate
//! 2. [`assign_weights`] / [`select_primary`]: duration + quality -> weights
//!    summing to 1, and one primary sample
//! 3. [`fuse`]: per-sample speaker embeddings -> L2-normalized weighted
//!    centroid, with outliers dropped by cosine similarity
//! 4. [`build_fused_prompt`]: fused embedding + one reference sample's
//!    codec frames and transcript -> [`FusedPrompt`]
//!
//! The speech-synthesis model that yields per-sample embeddings is an
//! external collaborator behind [`VoiceCloneModel`]. Loaded models can be
//! kept in a bounded [`ModelCache`].
//!
//! # Outlier Exclusion
//!
//! ```text
//! cos(e_i, centroid) >= threshold  -> kept
//! cos(e_i, centroid) <  threshold  -> excluded
//! nothing kept                     -> all kept (fallback)
//! ```
//!
//! [`Enroller`] bundles the stages with one set of parameters.

mod analyzer;
mod cache;
mod enroller;
mod error;
mod fuser;
mod primary;
mod prompt;
mod sample;
mod summary;
pub mod vector;
mod weighter;

pub use analyzer::{analyze_samples, measure_sample};
pub use cache::{Dtype, ModelCache, ModelCacheConfig, ModelCatalog, ModelLoader};
pub use enroller::{Enroller, Enrollment};
pub use error::EnrollError;
pub use fuser::{FuseOptions, Fusion, Precision, fuse, fuse_embeddings};
pub use primary::{select_primary, select_reference};
pub use prompt::{
    FusedPrompt, PromptItem, ReferenceCode, VoiceCloneModel, assemble, build_fused_prompt,
    build_fused_prompt_with,
};
pub use sample::SampleRecord;
pub use summary::{
    LOW_QUALITY_DB, MAX_DURATION_RATIO, MIN_RECOMMENDED_SECS, format_samples_summary,
    sample_warnings,
};
pub use vector::cosine_similarity;
pub use weighter::{WeightConfig, assign_weights};
