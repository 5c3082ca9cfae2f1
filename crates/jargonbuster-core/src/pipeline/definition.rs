use std::collections::HashSet;
use std::sync::Arc;

use super::resources::LanguageResources;
use super::stage::Stage;
use super::stage_id::StageId;
use crate::error::{Error, Result};

/// A named, ordered list of stages. Stage IDs are unique within a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDefinition {
    pub name: String,
    pub description: String,
    pub stages: Vec<StageId>,
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>, stages: Vec<StageId>) -> Result<Self> {
        let name = name.into();

        let mut seen = HashSet::new();
        if let Some(duplicate) = stages.iter().find(|id| !seen.insert(**id)) {
            return Err(Error::PipelineBuild {
                name,
                reason: format!("stage '{duplicate}' appears more than once"),
            });
        }

        Ok(Self {
            name,
            description: String::new(),
            stages,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A built pipeline: its stage chain plus the loaded language resources.
///
/// Immutable once built and shared read-only across executions.
pub struct Pipeline {
    name: String,
    stages: Vec<Arc<dyn Stage>>,
    resources: Arc<LanguageResources>,
}

impl Pipeline {
    pub fn new(
        definition: &PipelineDefinition,
        stages: Vec<Arc<dyn Stage>>,
        resources: Arc<LanguageResources>,
    ) -> Result<Self> {
        let built: Vec<StageId> = stages.iter().map(|s| s.id()).collect();
        if built != definition.stages {
            return Err(Error::PipelineBuild {
                name: definition.name.clone(),
                reason: format!(
                    "stage chain {built:?} doesn't match definition {:?}",
                    definition.stages
                ),
            });
        }

        Ok(Self {
            name: definition.name.clone(),
            stages,
            resources,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    pub fn resources(&self) -> &Arc<LanguageResources> {
        &self.resources
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_ids())
            .field("language_model", &self.resources.language_model)
            .finish()
    }
}
