use thiserror::Error;

/// All errors produced by hush-core.
#[derive(Debug, Error)]
pub enum HushError {
    #[error("invalid reduction parameters: {0}")]
    InvalidParameters(String),

    #[error("suppressor returned {actual} samples for a {expected}-sample chunk")]
    SuppressorContractViolation { expected: usize, actual: usize },

    #[error("codec error: {0}")]
    Codec(String),

    #[error("cleanup error: {0}")]
    Cleanup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HushError>;
