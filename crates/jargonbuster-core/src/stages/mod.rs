//! Built-in analysis stages and the default pipeline registry.

mod cleaner;
mod familiar;
mod health;
mod ner;
mod parser;
mod readability;
mod report_collector;
mod rouge;
mod sentencizer;
mod story;
mod summarizer;
mod tagger;
mod text;

pub use cleaner::{clean_text, Cleaner};
pub use health::{group_entities, EnrichmentService, HealthAnalyzer, HttpHealthService};
pub use ner::{EntityRecognizer, Ner, PatternRecognizer};
pub use parser::{noun_chunks, Parser};
pub use readability::{readability, Readability};
pub use report_collector::ReportCollector;
pub use rouge::{rouge_l, rouge_n, rouge_scores, RougeScorer};
pub use sentencizer::Sentencizer;
pub use story::{compose_story, StoryGenerator};
pub use summarizer::{
    rank_sentences, summarize, Summarizer, DEFAULT_SUMMARY_SENTENCES, SUMMARY_SENTENCES_KEY,
    SUMMARY_WORD_LIMIT,
};
pub use tagger::{tag_tokens, Tagger};
pub use text::split_sentences;

use std::sync::Arc;
use tracing::warn;

use crate::config::EnrichmentConfig;
use crate::error::Result;
use crate::pipeline::{
    BuildOptions, LanguageResources, Pipeline, PipelineDefinition, PipelineFactory,
    PipelineRegistry, Stage, StageId,
};

pub const DEFAULT_SUMMARIZER: &str = "default-summarizer";
pub const LITE: &str = "lite";

const LITE_STAGES: [StageId; 6] = [
    StageId::Cleaner,
    StageId::Tagger,
    StageId::Sentencizer,
    StageId::Summarizer,
    StageId::Readability,
    StageId::ReportCollector,
];

/// Shared collaborators the built-in stages are constructed with.
#[derive(Clone)]
pub struct StageToolkit {
    recognizer: Arc<dyn EntityRecognizer>,
    enrichment: Option<Arc<dyn EnrichmentService>>,
}

impl Default for StageToolkit {
    fn default() -> Self {
        Self {
            recognizer: Arc::new(PatternRecognizer::new()),
            enrichment: None,
        }
    }
}

impl StageToolkit {
    /// Toolkit with the HTTP health service when one is configured.
    pub fn from_config(config: &EnrichmentConfig) -> Self {
        let enrichment = match HttpHealthService::from_config(config) {
            Ok(service) => service.map(|s| Arc::new(s) as Arc<dyn EnrichmentService>),
            Err(e) => {
                warn!("Health service unavailable: {}", e);
                None
            }
        };
        Self {
            enrichment,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    #[must_use]
    pub fn with_enrichment(mut self, service: Arc<dyn EnrichmentService>) -> Self {
        self.enrichment = Some(service);
        self
    }

    pub fn build_stage(&self, id: StageId) -> Arc<dyn Stage> {
        match id {
            StageId::Cleaner => Arc::new(Cleaner),
            StageId::Tagger => Arc::new(Tagger),
            StageId::Sentencizer => Arc::new(Sentencizer),
            StageId::Parser => Arc::new(Parser),
            StageId::Ner => Arc::new(Ner::new(Arc::clone(&self.recognizer))),
            StageId::Summarizer => Arc::new(Summarizer),
            StageId::RougeScorer => Arc::new(RougeScorer),
            StageId::HealthAnalyzer => Arc::new(HealthAnalyzer::new(self.enrichment.clone())),
            StageId::Readability => Arc::new(Readability),
            StageId::ReportCollector => Arc::new(ReportCollector),
            StageId::StoryGenerator => Arc::new(StoryGenerator),
        }
    }

    /// Factory building a definition's stages over freshly loaded resources.
    pub fn factory(&self) -> PipelineFactory {
        let toolkit = self.clone();
        Arc::new(move |definition: &PipelineDefinition, options: &BuildOptions| {
            let resources = Arc::new(LanguageResources::load(&options.language_model));
            let stages = definition
                .stages
                .iter()
                .map(|id| toolkit.build_stage(*id))
                .collect();
            Pipeline::new(definition, stages, resources)
        })
    }
}

/// The built-in pipelines: `default-summarizer` (aliases `default`, `quick`)
/// and `lite`.
pub fn default_registry(toolkit: &StageToolkit) -> Result<PipelineRegistry> {
    let full = PipelineDefinition::new(DEFAULT_SUMMARIZER, StageId::ALL.to_vec())?
        .with_description("Every built-in stage: cleaning, linguistics, summary, scores, report");
    let lite = PipelineDefinition::new(LITE, LITE_STAGES.to_vec())?
        .with_description("Cleaning, summary and readability without entity work");

    let mut registry = PipelineRegistry::new()
        .with_pipeline(full, toolkit.factory())
        .with_pipeline(lite, toolkit.factory());
    registry.alias("default", DEFAULT_SUMMARIZER)?;
    registry.alias("quick", DEFAULT_SUMMARIZER)?;

    Ok(registry)
}
