//! Dale-Chall and SMOG readability grades.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::familiar::FAMILIAR_WORDS;
use super::sentencizer::document_sentences;
use super::text::{alphabetic_words, syllables};
use crate::pipeline::{
    Annotation, DocumentState, LanguageResources, ReadabilityReport, ReadabilityScores, Stage,
    StageError, StageId,
};

static FAMILIAR: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| FAMILIAR_WORDS.iter().copied().collect());

const INFLECTIONS: &[&str] = &["ing", "ed", "es", "s", "ly", "er", "est"];

fn is_familiar(word: &str, resources: &LanguageResources) -> bool {
    let lower = word.to_lowercase();
    if FAMILIAR.contains(lower.as_str()) || resources.is_stopword(&lower) {
        return true;
    }
    INFLECTIONS.iter().any(|suffix| {
        lower
            .strip_suffix(suffix)
            .is_some_and(|base| FAMILIAR.contains(base) || FAMILIAR.contains(format!("{base}e").as_str()))
    })
}

/// Readability grades of a text with a known sentence count.
#[allow(clippy::cast_precision_loss)]
pub fn readability(text: &str, sentences: usize, resources: &LanguageResources) -> ReadabilityScores {
    let words = alphabetic_words(text);
    if words.is_empty() || sentences == 0 {
        return ReadabilityScores::default();
    }

    let word_count = words.len() as f64;
    let sentence_count = sentences as f64;

    let difficult = words.iter().filter(|w| !is_familiar(w, resources)).count() as f64;
    let difficult_percent = difficult / word_count * 100.0;
    let mut dale_chall = 0.1579 * difficult_percent + 0.0496 * (word_count / sentence_count);
    if difficult_percent > 5.0 {
        dale_chall += 3.6365;
    }

    let polysyllables = words.iter().filter(|w| syllables(w) >= 3).count() as f64;
    let smog = 1.0430 * (polysyllables * (30.0 / sentence_count)).sqrt() + 3.1291;

    ReadabilityScores { dale_chall, smog }
}

/// Readability of the text, and of the summary when one was produced.
pub struct Readability;

#[async_trait]
impl Stage for Readability {
    fn id(&self) -> StageId {
        StageId::Readability
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        let sentences = document_sentences(state).await?;
        let text = readability(state.text(), sentences.len(), state.resources());

        // only attached when the summarizer is part of this run
        let summary = match state.annotation(StageId::Summarizer).await? {
            Some(Annotation::Summary(summary)) if !summary.is_empty() => Some(readability(
                &summary.join(" "),
                summary.len(),
                state.resources(),
            )),
            _ => None,
        };

        Ok(Annotation::Readability(ReadabilityReport { text, summary }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_text_has_no_difficult_words() {
        let resources = LanguageResources::default();
        let scores = readability("The dog ran home. The cat sat.", 2, &resources);

        // 7 words over 2 sentences, all familiar
        assert!((scores.dale_chall - 0.0496 * 3.5).abs() < 1e-9);
        assert!((scores.smog - 3.1291).abs() < 1e-9);
    }

    #[test]
    fn test_jargon_raises_grades() {
        let resources = LanguageResources::default();
        let plain = readability("The knee hurts after a long walk.", 1, &resources);
        let jargon = readability(
            "Patellofemoral arthralgia exacerbates postambulatory discomfort.",
            1,
            &resources,
        );

        assert!(jargon.dale_chall > plain.dale_chall + 3.6365);
        assert!(jargon.smog > plain.smog);
    }

    #[test]
    fn test_inflections_count_as_familiar() {
        let resources = LanguageResources::default();
        assert!(is_familiar("walked", &resources));
        assert!(is_familiar("Doctors", &resources));
        assert!(is_familiar("hoping", &resources));
        assert!(!is_familiar("arthralgia", &resources));
    }

    #[test]
    fn test_empty_text() {
        let scores = readability("", 0, &LanguageResources::default());
        assert_eq!(scores, ReadabilityScores::default());
    }
}
