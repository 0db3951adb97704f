use availstrip_classifier::ClassifierError;
use availstrip_engine::EngineError;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while processing a file
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Engine error (malformed nesting, boundary modeling gaps)
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Classifier construction error
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Report serialization error
    #[error("report serialization error: {0}")]
    Report(#[from] serde_json::Error),
}
