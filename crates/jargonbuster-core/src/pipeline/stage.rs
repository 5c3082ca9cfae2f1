use async_trait::async_trait;
use thiserror::Error;

use super::annotation::Annotation;
use super::settings::ActiveStages;
use super::stage_id::StageId;
use super::state::DocumentState;

#[derive(Debug, Clone, Error)]
pub enum StageError {
    /// A stage later stages depend on could not do its work.
    #[error("Structural failure: {0}")]
    Structural(String),
    /// An optional, externally backed stage failed.
    #[error("Enrichment failure: {0}")]
    Enrichment(String),
    #[error("Cancelled")]
    Cancelled,
}

/// What a stage's `apply` contributed to the document.
#[derive(Debug)]
pub enum Applied {
    /// Nothing attached; the stage acts as a marker.
    Unchanged,
    /// Attach a lazy annotation computed by `compute_annotation` on first read.
    Deferred,
    /// Attach an annotation computed eagerly during `apply`.
    Ready(Annotation),
}

/// Contract of an analysis stage.
///
/// `apply` runs in pipeline order and may rewrite the document text (only
/// the cleaner does). Expensive work belongs in `compute_annotation`, which
/// runs at most once per document and only when something reads it.
#[async_trait]
pub trait Stage: Send + Sync {
    fn id(&self) -> StageId;

    fn apply(
        &self,
        _state: &mut DocumentState,
        _active: &ActiveStages,
    ) -> Result<Applied, StageError> {
        Ok(Applied::Deferred)
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError>;
}
