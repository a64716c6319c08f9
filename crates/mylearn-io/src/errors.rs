use thiserror::Error;

/// Failures while persisting or restoring a model.
#[derive(Debug, Error)]
pub enum ModelIoError {
    #[error("Unable to write model to {path}: {reason}")]
    UnableToWrite { path: String, reason: String },

    #[error("Unable to read model from {path}: {reason}")]
    UnableToRead { path: String, reason: String },

    #[error("Invalid model JSON: {0}")]
    Serde(#[from] serde_json::Error),
}
