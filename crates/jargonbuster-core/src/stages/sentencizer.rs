use async_trait::async_trait;

use super::text::split_sentences;
use crate::pipeline::{Annotation, DocumentState, Stage, StageError, StageId};

/// Sentence boundary detection over the current text.
pub struct Sentencizer;

#[async_trait]
impl Stage for Sentencizer {
    fn id(&self) -> StageId {
        StageId::Sentencizer
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        Ok(Annotation::Sentences(split_sentences(state.text())))
    }
}

/// Sentences of the document: the sentencizer's annotation when it ran,
/// otherwise a fresh split of the text.
pub(crate) async fn document_sentences(state: &DocumentState) -> Result<Vec<String>, StageError> {
    if let Some(Annotation::Sentences(sentences)) = state.annotation(StageId::Sentencizer).await? {
        return Ok(sentences.iter().map(|s| s.text.clone()).collect());
    }
    Ok(split_sentences(state.text())
        .into_iter()
        .map(|s| s.text)
        .collect())
}
