use thiserror::Error;

/// Errors returned by enrollment operations.
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error("enroll: at least one audio sample is required")]
    NoSamples,

    #[error("enroll: at least one embedding is required")]
    NoEmbeddings,

    #[error("enroll: embedding {index} has dimension {got}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("enroll: {weights} weights given for {embeddings} embeddings")]
    WeightCountMismatch { embeddings: usize, weights: usize },

    #[error("enroll: model error: {0}")]
    Model(String),

    #[error("enroll: unknown model {name:?}, available: {available}")]
    UnknownModel { name: String, available: String },

    #[error("enroll: model checkpoint not found: {0}")]
    ModelNotFound(String),

    #[error("enroll: failed to load model {name:?}: {reason}")]
    ModelLoad { name: String, reason: String },
}

impl EnrollError {
    /// Returns true for errors caused by the caller's inputs rather than
    /// by a collaborator.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::NoSamples
                | Self::NoEmbeddings
                | Self::DimensionMismatch { .. }
                | Self::WeightCountMismatch { .. }
        )
    }
}
