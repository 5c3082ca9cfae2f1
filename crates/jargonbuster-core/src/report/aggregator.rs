use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{info, warn};

use super::frequency::{most_common, pairs_value, TOP_K};
use crate::error::{Error, Result};
use crate::meta::{merged, prune_empty, standardize, Meta};
use crate::pipeline::{
    ActiveStages, Annotation, DocumentState, PosTag, StageError, StageId,
};

/// Entity labels that get their own list and frequency section.
pub const ENTITY_LABELS: &[&str] = &[
    "ORG",
    "PERSON",
    "GPE",
    "WORK_OF_ART",
    "PRODUCT",
    "EVENT",
    "FAC",
    "NORP",
];

/// Read an active stage's annotation, forcing its computation.
///
/// Inactive stages, empty annotations and failed enrichment all read as `None`.
async fn read<'a>(
    state: &'a DocumentState,
    active: &ActiveStages,
    id: StageId,
    pipeline: &str,
) -> Result<Option<&'a Annotation>> {
    if !active.contains(id) {
        return Ok(None);
    }

    match state.annotation(id).await {
        Ok(Some(annotation)) if !annotation.is_empty() => Ok(Some(annotation)),
        Ok(_) => Ok(None),
        Err(StageError::Enrichment(reason)) => {
            warn!("Leaving out '{}' section: {}", id, reason);
            Ok(None)
        }
        Err(e) => Err(Error::stage(pipeline, id, e)),
    }
}

/// Build the stage-derived report sections for one document.
pub async fn collect_sections(
    state: &DocumentState,
    active: &ActiveStages,
    pipeline: &str,
) -> Result<Meta> {
    info!("Collecting results from pipeline: {:?}", active.names());

    let mut report = Meta::new();
    report.insert("pipeline".into(), Value::from(active.names()));

    let tokens = state.tokens();
    let words: Vec<&str> = tokens
        .iter()
        .filter(|t| t.is_word())
        .map(|t| t.text.as_str())
        .collect();

    report.insert("num_token".into(), Value::from(tokens.len()));
    report.insert("num_words".into(), Value::from(words.len()));

    let num_sentences = match read(state, active, StageId::Sentencizer, pipeline).await? {
        Some(Annotation::Sentences(sentences)) => sentences.len(),
        _ => 0,
    };
    report.insert("num_sentences".into(), Value::from(num_sentences));

    if let Some(Annotation::NounChunks(chunks)) =
        read(state, active, StageId::Parser, pipeline).await?
    {
        report.insert("noun_chunks".into(), Value::from(chunks.clone()));
        report.insert("num_noun_chunks".into(), Value::from(chunks.len()));
        report.insert(
            "common_noun_chunks".into(),
            pairs_value(most_common(chunks.iter().cloned(), TOP_K)),
        );
    }

    report.insert(
        "common_words".into(),
        pairs_value(most_common(words.iter().copied(), TOP_K)),
    );

    if let Some(Annotation::Tags(tags)) = read(state, active, StageId::Tagger, pipeline).await? {
        let nouns = tokens
            .iter()
            .zip(tags)
            .filter(|(token, tag)| token.is_word() && **tag == PosTag::Noun)
            .map(|(token, _)| token.text.as_str());
        report.insert("common_nouns".into(), pairs_value(most_common(nouns, TOP_K)));
    }

    if let Some(Annotation::Entities(entities)) =
        read(state, active, StageId::Ner, pipeline).await?
    {
        let distinct: BTreeSet<(&str, &str)> = entities
            .iter()
            .map(|e| (e.text.as_str(), e.label.as_str()))
            .collect();
        report.insert(
            "named_entities".into(),
            Value::Array(
                distinct
                    .into_iter()
                    .map(|(text, label)| Value::from(vec![text, label]))
                    .collect(),
            ),
        );

        for label in ENTITY_LABELS {
            let texts: Vec<&str> = entities
                .iter()
                .filter(|e| e.label == *label)
                .map(|e| e.text.as_str())
                .collect();
            let sorted: BTreeSet<&str> = texts.iter().copied().collect();

            report.insert(
                (*label).to_string(),
                Value::from(sorted.into_iter().collect::<Vec<_>>()),
            );
            report.insert(
                format!("common_{label}"),
                pairs_value(most_common(texts, TOP_K)),
            );
        }
    }

    if let Some(Annotation::Summary(sentences)) =
        read(state, active, StageId::Summarizer, pipeline).await?
    {
        report.insert("summary_sentences".into(), Value::from(sentences.clone()));
        report.insert("summaryText".into(), Value::from(sentences.join("\n")));
    }

    if let Some(Annotation::Readability(scores)) =
        read(state, active, StageId::Readability, pipeline).await?
    {
        report.insert("readability".into(), serde_json::to_value(scores)?);
    }

    if let Some(Annotation::Rouge(scores)) =
        read(state, active, StageId::RougeScorer, pipeline).await?
    {
        let mut recall = Meta::new();
        recall.insert("rouge1".into(), Value::from(scores.rouge1.recall));
        recall.insert("rouge2".into(), Value::from(scores.rouge2.recall));
        recall.insert("rougeL".into(), Value::from(scores.rouge_l.recall));
        report.insert("summary_rouge_recall".into(), Value::Object(recall));
    }

    if let Some(Annotation::Health(health)) =
        read(state, active, StageId::HealthAnalyzer, pipeline).await?
    {
        report.insert(
            StageId::HealthAnalyzer.as_str().into(),
            serde_json::to_value(health)?,
        );
    }

    if let Some(Annotation::Story(story)) =
        read(state, active, StageId::StoryGenerator, pipeline).await?
    {
        report.insert("story".into(), Value::from(story.clone()));
    }

    prune_empty(&mut report);
    Ok(report)
}

/// Merge source metadata with the report, add the standardized document
/// fields and drop everything falsy.
pub fn finalize(source_meta: &Meta, report: Meta) -> Meta {
    let mut result = merged(source_meta, report);
    standardize(&mut result, source_meta);
    prune_empty(&mut result);
    result
}
