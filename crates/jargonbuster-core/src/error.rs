use thiserror::Error;

use crate::extract::ClientError;
use crate::pipeline::{StageError, StageId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Pipeline not found: {name}")]
    PipelineNotFound { name: String },

    #[error("Failed to build pipeline '{name}': {reason}")]
    PipelineBuild { name: String, reason: String },

    #[error("Pipeline '{pipeline}' failed in stage '{stage}': {source}")]
    StageFailed {
        pipeline: String,
        stage: String,
        #[source]
        source: StageError,
    },

    #[error("Can't extract text or metadata from '{source_label}': {reason}")]
    Extraction { source_label: String, reason: String },

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] ClientError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Execution of pipeline '{0}' was cancelled")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a stage failure with the pipeline and stage it happened in.
    pub fn stage(pipeline: &str, stage: StageId, source: StageError) -> Self {
        match source {
            StageError::Cancelled => Self::Cancelled(pipeline.to_string()),
            source => Self::StageFailed {
                pipeline: pipeline.to_string(),
                stage: stage.to_string(),
                source,
            },
        }
    }
}
