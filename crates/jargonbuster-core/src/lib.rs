pub mod analyzer;
pub mod config;
pub mod error;
pub mod extract;
pub mod meta;
pub mod pipeline;
pub mod report;
pub mod stages;

pub use analyzer::{AnalysisRequest, AnalysisResponse, Analyzer};
pub use config::{Config, EnrichmentConfig, ExtractorConfig};
pub use error::{Error, Result};
pub use extract::{
    Backend, BackendError, ExtractionRequest, ExtractionResponse, ExtractionRouter, HttpClient,
};
pub use meta::{Meta, UNKNOWN};
pub use pipeline::{
    Annotation, CancellationFlag, Pipeline, PipelineCache, PipelineDefinition, PipelineRegistry,
    PipelineSettings, Stage, StageError, StageExecutor, StageId,
};
pub use stages::{default_registry, StageToolkit, DEFAULT_SUMMARIZER, LITE};
