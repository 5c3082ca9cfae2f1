use std::collections::BTreeMap;
use std::sync::Arc;

use super::annotation::Annotation;
use super::lazy::LazyCell;
use super::resources::LanguageResources;
use super::settings::PipelineSettings;
use super::stage::{Applied, Stage, StageError};
use super::stage_id::StageId;
use super::tokens::{tokenize, Token};

enum Slot {
    Ready(Annotation),
    Deferred {
        stage: Arc<dyn Stage>,
        cell: LazyCell<Annotation>,
    },
}

/// Per-execution document: current text, its tokens and stage annotations.
///
/// Created fresh for every execution. Annotation slots are write-once.
pub struct DocumentState {
    text: String,
    tokens: Vec<Token>,
    settings: PipelineSettings,
    resources: Arc<LanguageResources>,
    annotations: BTreeMap<StageId, Slot>,
}

impl DocumentState {
    pub fn new(
        text: impl Into<String>,
        settings: PipelineSettings,
        resources: Arc<LanguageResources>,
    ) -> Self {
        let text = text.into();
        let tokens = tokenize(&text, &resources.stopwords);
        Self {
            text,
            tokens,
            settings,
            resources,
            annotations: BTreeMap::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn resources(&self) -> &LanguageResources {
        &self.resources
    }

    /// Replace the text and re-derive the tokens.
    ///
    /// Only allowed before any annotation exists, since annotations refer to
    /// the text they were computed from.
    pub fn replace_text(&mut self, text: String) -> Result<(), StageError> {
        if !self.annotations.is_empty() {
            return Err(StageError::Structural(
                "text can't change once stages have annotated it".to_string(),
            ));
        }
        self.tokens = tokenize(&text, &self.resources.stopwords);
        self.text = text;
        Ok(())
    }

    /// Record what `stage` contributed during `apply`.
    pub fn attach(&mut self, stage: Arc<dyn Stage>, applied: Applied) -> Result<(), StageError> {
        let id = stage.id();
        let slot = match applied {
            Applied::Unchanged => return Ok(()),
            Applied::Ready(annotation) => Slot::Ready(annotation),
            Applied::Deferred => Slot::Deferred {
                stage,
                cell: LazyCell::new(),
            },
        };

        if self.annotations.contains_key(&id) {
            return Err(StageError::Structural(format!(
                "annotation for '{id}' is already set"
            )));
        }
        self.annotations.insert(id, slot);
        Ok(())
    }

    pub fn has_annotation(&self, id: StageId) -> bool {
        self.annotations.contains_key(&id)
    }

    /// Whether a deferred annotation has been computed yet.
    pub fn is_computed(&self, id: StageId) -> bool {
        match self.annotations.get(&id) {
            Some(Slot::Ready(_)) => true,
            Some(Slot::Deferred { cell, .. }) => cell.is_computed(),
            None => false,
        }
    }

    /// Read a stage's annotation, computing it on first access.
    pub async fn annotation(&self, id: StageId) -> Result<Option<&Annotation>, StageError> {
        match self.annotations.get(&id) {
            None => Ok(None),
            Some(Slot::Ready(annotation)) => Ok(Some(annotation)),
            Some(Slot::Deferred { stage, cell }) => cell
                .get_or_try_compute(|| stage.compute_annotation(self))
                .await
                .map(Some),
        }
    }
}
