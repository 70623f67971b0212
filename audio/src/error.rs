use thiserror::Error;

/// Errors returned by audio decoding.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio: io: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio: wav: {0}")]
    Wav(#[from] hound::Error),

    #[error("audio: invalid format: {0}")]
    InvalidFormat(String),
}
