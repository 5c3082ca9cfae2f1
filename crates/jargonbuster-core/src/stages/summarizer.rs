//! Extractive summarization with TextRank.
//!
//! Sentences are graph nodes, edges are weighted by normalized word overlap,
//! and a weighted PageRank picks the most central ones.

use async_trait::async_trait;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Undirected;
use std::collections::HashSet;
use tracing::debug;

use super::sentencizer::document_sentences;
use super::text::lowercase_terms;
use crate::pipeline::{Annotation, DocumentState, LanguageResources, Stage, StageError, StageId};

/// Setting that caps the number of summary sentences.
pub const SUMMARY_SENTENCES_KEY: &str = "summary_sentences";
pub const DEFAULT_SUMMARY_SENTENCES: usize = 5;
/// Upper bound on the words in a summary.
pub const SUMMARY_WORD_LIMIT: usize = 200;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

fn content_terms(sentence: &str, resources: &LanguageResources) -> HashSet<String> {
    lowercase_terms(sentence)
        .into_iter()
        .filter(|term| !resources.is_stopword(term))
        .collect()
}

/// Overlap similarity from the TextRank paper.
fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let common = a.intersection(b).count();
    if common == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let denominator = (a.len() as f64).ln() + (b.len() as f64).ln();
    if denominator <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let common = common as f64;
    common / denominator
}

/// TextRank score of each sentence, in input order.
pub fn rank_sentences(sentences: &[String], resources: &LanguageResources) -> Vec<f64> {
    let terms: Vec<HashSet<String>> = sentences
        .iter()
        .map(|s| content_terms(s, resources))
        .collect();

    let mut graph: Graph<usize, f64, Undirected> = Graph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..sentences.len()).map(|i| graph.add_node(i)).collect();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let weight = similarity(&terms[i], &terms[j]);
            if weight > 0.0 {
                graph.add_edge(nodes[i], nodes[j], weight);
            }
        }
    }

    let strength: Vec<f64> = nodes
        .iter()
        .map(|&n| graph.edges(n).map(|e| *e.weight()).sum())
        .collect();

    let mut scores = vec![1.0; nodes.len()];
    for _ in 0..MAX_ITERATIONS {
        let next: Vec<f64> = nodes
            .iter()
            .map(|&node| {
                let incoming: f64 = graph
                    .edges(node)
                    .map(|edge| {
                        let other = if edge.source() == node {
                            edge.target()
                        } else {
                            edge.source()
                        };
                        let j = graph[other];
                        edge.weight() / strength[j] * scores[j]
                    })
                    .sum();
                (1.0 - DAMPING) + DAMPING * incoming
            })
            .collect();

        let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < TOLERANCE {
            break;
        }
    }

    scores
}

/// Pick central sentences up to the word limit, then keep the first
/// `max_sentences` of them in text order.
pub fn summarize(
    sentences: &[String],
    resources: &LanguageResources,
    max_sentences: usize,
) -> Vec<String> {
    if sentences.len() <= 1 {
        return sentences.iter().take(max_sentences).cloned().collect();
    }

    let scores = rank_sentences(sentences, resources);
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut selected = Vec::new();
    let mut words = 0;
    for index in order {
        let length = sentences[index].split_whitespace().count();
        if words + length > SUMMARY_WORD_LIMIT && !selected.is_empty() {
            break;
        }
        selected.push(index);
        words += length;
    }

    selected.sort_unstable();
    selected
        .into_iter()
        .take(max_sentences)
        .map(|i| sentences[i].clone())
        .collect()
}

/// TextRank summarizer stage.
pub struct Summarizer;

#[async_trait]
impl Stage for Summarizer {
    fn id(&self) -> StageId {
        StageId::Summarizer
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        let sentences = document_sentences(state).await?;
        let limit = state
            .settings()
            .get_usize(SUMMARY_SENTENCES_KEY)
            .unwrap_or(DEFAULT_SUMMARY_SENTENCES);

        let summary = summarize(&sentences, state.resources(), limit);
        debug!(
            "Summarized {} sentences into {}",
            sentences.len(),
            summary.len()
        );
        Ok(Annotation::Summary(summary))
    }
}
