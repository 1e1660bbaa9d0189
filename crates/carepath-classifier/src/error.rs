use thiserror::Error;

/// Failures loading a model artifact. All of them are fatal for the
/// classifier: a model that fails here must not be served.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model shape: {0}")]
    Shape(String),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
