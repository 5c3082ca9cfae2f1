use async_trait::async_trait;

use crate::pipeline::{ActiveStages, Annotation, Applied, DocumentState, Stage, StageError, StageId};

/// Marker stage: when active, the executor builds the full report.
pub struct ReportCollector;

#[async_trait]
impl Stage for ReportCollector {
    fn id(&self) -> StageId {
        StageId::ReportCollector
    }

    fn apply(&self, _state: &mut DocumentState, _active: &ActiveStages) -> Result<Applied, StageError> {
        Ok(Applied::Unchanged)
    }

    async fn compute_annotation(&self, _state: &DocumentState) -> Result<Annotation, StageError> {
        Ok(Annotation::Empty)
    }
}
