use serde::Serialize;
use voxfuse_audio::{Decoder, QualityConfig, WavDecoder};

use crate::EnrollError;
use crate::analyzer::analyze_samples;
use crate::fuser::{FuseOptions, Fusion, fuse};
use crate::prompt::{FusedPrompt, VoiceCloneModel, build_fused_prompt_with};
use crate::sample::SampleRecord;
use crate::summary::sample_warnings;
use crate::weighter::WeightConfig;

/// Result of a full enrollment run.
#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    /// Analyzed samples in input order.
    pub samples: Vec<SampleRecord>,
    /// The single fused prompt.
    pub prompt: FusedPrompt,
    /// Quality problems found while analyzing the samples.
    pub warnings: Vec<String>,
}

/// Runs the enrollment pipeline with one set of tuning parameters.
///
/// ```rust
/// use voxfuse_enroll::{Enroller, FuseOptions};
///
/// let enroller = Enroller::new().with_fusion(FuseOptions {
///     outlier_threshold: 0.8,
///     ..Default::default()
/// });
/// assert_eq!(enroller.fusion().outlier_threshold, 0.8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Enroller<D = WavDecoder> {
    decoder: D,
    quality: QualityConfig,
    weighting: WeightConfig,
    fusion: FuseOptions,
}

impl Enroller<WavDecoder> {
    /// Creates an enroller that reads WAV files with default parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Decoder> Enroller<D> {
    /// Creates an enroller with a custom decoder and default parameters.
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            quality: QualityConfig::default(),
            weighting: WeightConfig::default(),
            fusion: FuseOptions::default(),
        }
    }

    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_weighting(mut self, weighting: WeightConfig) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_fusion(mut self, fusion: FuseOptions) -> Self {
        self.fusion = fusion;
        self
    }

    pub fn quality(&self) -> &QualityConfig {
        &self.quality
    }

    pub fn weighting(&self) -> &WeightConfig {
        &self.weighting
    }

    pub fn fusion(&self) -> &FuseOptions {
        &self.fusion
    }

    /// Measures, weights and ranks the given recordings.
    pub fn analyze<S: AsRef<str> + Sync>(
        &self,
        paths: &[S],
        transcripts: &[Option<String>],
    ) -> Vec<SampleRecord> {
        analyze_samples(&self.decoder, paths, transcripts, &self.quality, &self.weighting)
    }

    /// Fuses precomputed embeddings with this enroller's fusion options.
    pub fn fuse(
        &self,
        embeddings: &[Vec<f32>],
        weights: Option<&[f64]>,
    ) -> Result<Fusion, EnrollError> {
        fuse(embeddings, weights, &self.fusion)
    }

    /// Builds the fused prompt for already analyzed samples.
    pub fn build_prompt<M: VoiceCloneModel + ?Sized>(
        &self,
        model: &M,
        records: &[SampleRecord],
        embedding_only: bool,
    ) -> Result<FusedPrompt, EnrollError> {
        build_fused_prompt_with(model, records, embedding_only, &self.fusion)?
            .pop()
            .ok_or(EnrollError::NoSamples)
    }

    /// Analyzes the recordings and builds their fused prompt.
    pub fn enroll<M: VoiceCloneModel + ?Sized, S: AsRef<str> + Sync>(
        &self,
        model: &M,
        paths: &[S],
        transcripts: &[Option<String>],
        embedding_only: bool,
    ) -> Result<Enrollment, EnrollError> {
        if paths.is_empty() {
            return Err(EnrollError::NoSamples);
        }
        let samples = self.analyze(paths, transcripts);
        let prompt = self.build_prompt(model, &samples, embedding_only)?;
        let warnings = sample_warnings(&samples);
        Ok(Enrollment {
            samples,
            prompt,
            warnings,
        })
    }
}
