//! Named analysis pipelines: stage contract, lazy per-document state,
//! settings resolution, the build-once cache and the executor.

mod annotation;
mod cache;
mod definition;
mod executor;
mod lazy;
mod registry;
mod resources;
mod settings;
mod stage;
mod stage_id;
mod state;
mod tokens;

pub use annotation::{
    Annotation, HealthEntities, HealthEntity, NamedEntity, PosTag, ReadabilityReport,
    ReadabilityScores, RougeScore, RougeScores, Sentence,
};
pub use cache::PipelineCache;
pub use definition::{Pipeline, PipelineDefinition};
pub use executor::{CancellationFlag, ExecutionOutput, StageExecutor};
pub use lazy::LazyCell;
pub use registry::{BuildOptions, PipelineFactory, PipelineRegistry};
pub use resources::{LanguageResources, DEFAULT_LANGUAGE_MODEL};
pub use settings::{ActiveStages, PipelineSettings, LANGUAGE_MODEL_KEY};
pub use stage::{Applied, Stage, StageError};
pub use stage_id::StageId;
pub use state::DocumentState;
pub use tokens::{tokenize, Token};
