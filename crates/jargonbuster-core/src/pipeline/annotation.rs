use serde::{Deserialize, Serialize};

use crate::meta::Meta;

/// Coarse part-of-speech classes assigned by the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Noun,
    Propn,
    Verb,
    Adj,
    Adv,
    Det,
    Adp,
    Pron,
    Cconj,
    Num,
    Punct,
    X,
}

/// A sentence as a byte range of the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RougeScores {
    pub rouge1: RougeScore,
    pub rouge2: RougeScore,
    #[serde(rename = "rougeL")]
    pub rouge_l: RougeScore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityScores {
    pub dale_chall: f64,
    pub smog: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityReport {
    pub text: ReadabilityScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReadabilityScores>,
}

/// A domain entity returned by the health enrichment service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntity {
    pub text: String,
    pub category: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthEntities {
    pub diagnosis: Vec<HealthEntity>,
    pub symptoms: Vec<HealthEntity>,
    pub treatments: Vec<HealthEntity>,
    pub examinations: Vec<HealthEntity>,
}

impl HealthEntities {
    pub fn is_empty(&self) -> bool {
        self.diagnosis.is_empty()
            && self.symptoms.is_empty()
            && self.treatments.is_empty()
            && self.examinations.is_empty()
    }
}

/// The computed result a stage attaches to a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Cleaning(Meta),
    /// One tag per token of the state's token list.
    Tags(Vec<PosTag>),
    Sentences(Vec<Sentence>),
    NounChunks(Vec<String>),
    Entities(Vec<NamedEntity>),
    Summary(Vec<String>),
    Rouge(RougeScores),
    Readability(ReadabilityReport),
    Health(HealthEntities),
    Story(String),
    /// A degraded stage's placeholder; aggregation skips it.
    Empty,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Cleaning(meta) => meta.is_empty(),
            Self::Tags(tags) => tags.is_empty(),
            Self::Sentences(sentences) => sentences.is_empty(),
            Self::NounChunks(chunks) => chunks.is_empty(),
            Self::Entities(entities) => entities.is_empty(),
            Self::Summary(sentences) => sentences.is_empty(),
            Self::Rouge(_) | Self::Readability(_) => false,
            Self::Health(health) => health.is_empty(),
            Self::Story(story) => story.is_empty(),
            Self::Empty => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emptiness() {
        assert!(Annotation::Empty.is_empty());
        assert!(Annotation::Summary(Vec::new()).is_empty());
        assert!(Annotation::Health(HealthEntities::default()).is_empty());
        assert!(!Annotation::Rouge(RougeScores::default()).is_empty());
        assert!(!Annotation::Story("Once.".into()).is_empty());
    }

    #[test]
    fn test_rouge_serializes_rouge_l_name() {
        let json = serde_json::to_value(RougeScores::default()).unwrap();
        assert!(json.get("rougeL").is_some());
    }
}
