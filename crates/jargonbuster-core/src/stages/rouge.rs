use async_trait::async_trait;
use std::collections::HashMap;
use tracing::warn;

use super::text::lowercase_terms;
use crate::pipeline::{
    ActiveStages, Annotation, Applied, DocumentState, RougeScore, RougeScores, Stage, StageError,
    StageId,
};

fn score(overlap: usize, predicted: usize, target: usize) -> RougeScore {
    #[allow(clippy::cast_precision_loss)]
    let (overlap, predicted, target) = (overlap as f64, predicted as f64, target as f64);
    let precision = if predicted > 0.0 { overlap / predicted } else { 0.0 };
    let recall = if target > 0.0 { overlap / target } else { 0.0 };
    let f_measure = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    RougeScore {
        precision,
        recall,
        f_measure,
    }
}

fn ngram_counts(terms: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || terms.len() < n {
        return counts;
    }
    for gram in terms.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// ROUGE-N between a target and a prediction.
pub fn rouge_n(target: &[String], prediction: &[String], n: usize) -> RougeScore {
    let target_grams = ngram_counts(target, n);
    let predicted_grams = ngram_counts(prediction, n);

    let overlap: usize = predicted_grams
        .iter()
        .map(|(gram, count)| (*count).min(target_grams.get(gram).copied().unwrap_or(0)))
        .sum();

    score(
        overlap,
        predicted_grams.values().sum(),
        target_grams.values().sum(),
    )
}

fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut previous = vec![0; b.len() + 1];
    let mut current = vec![0; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            current[j + 1] = if x == y {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// ROUGE-L: longest common subsequence over the whole token sequences.
pub fn rouge_l(target: &[String], prediction: &[String]) -> RougeScore {
    score(lcs_length(target, prediction), prediction.len(), target.len())
}

/// Score a summary against the text it summarizes.
pub fn rouge_scores(text: &str, summary: &str) -> RougeScores {
    let target = lowercase_terms(text);
    let prediction = lowercase_terms(summary);
    RougeScores {
        rouge1: rouge_n(&target, &prediction, 1),
        rouge2: rouge_n(&target, &prediction, 2),
        rouge_l: rouge_l(&target, &prediction),
    }
}

/// ROUGE overlap between the document and its summary.
pub struct RougeScorer;

#[async_trait]
impl Stage for RougeScorer {
    fn id(&self) -> StageId {
        StageId::RougeScorer
    }

    fn apply(&self, _state: &mut DocumentState, active: &ActiveStages) -> Result<Applied, StageError> {
        if !active.contains(StageId::Summarizer) {
            warn!("ROUGE scoring needs the summarizer; skipping");
            return Ok(Applied::Ready(Annotation::Empty));
        }
        Ok(Applied::Deferred)
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        match state.annotation(StageId::Summarizer).await? {
            Some(Annotation::Summary(sentences)) if !sentences.is_empty() => Ok(Annotation::Rouge(
                rouge_scores(state.text(), &sentences.join(" ")),
            )),
            _ => Ok(Annotation::Empty),
        }
    }
}
