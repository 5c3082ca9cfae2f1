//! Single-edit spelling correction for OCR output.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const MIN_WORD_LEN: usize = 4;
const MAX_EDIT_DISTANCE: usize = 1;

/// Frequency-ranked dictionary lookup; an empty checker passes words through.
#[derive(Debug, Clone, Default)]
pub struct SpellChecker {
    frequencies: HashMap<String, u64>,
}

impl SpellChecker {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a `term count` per line dictionary. Malformed lines are skipped.
    pub fn from_frequency_list(contents: &str) -> Self {
        let frequencies = contents
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let term = parts.next()?;
                let count = parts.next().and_then(|c| c.parse().ok()).unwrap_or(1);
                Some((term.to_lowercase(), count))
            })
            .collect();

        Self { frequencies }
    }

    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let checker = Self::from_frequency_list(&contents);
        info!(
            "Loaded {} spelling terms from {}",
            checker.frequencies.len(),
            path.display()
        );
        Ok(checker)
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Correct one OCR token, keeping trailing punctuation and the original casing.
    pub fn correct_word(&self, word: &str) -> String {
        if self.is_empty() || word.chars().count() < MIN_WORD_LEN {
            return word.to_string();
        }

        let letters = word.chars().filter(|c| c.is_alphabetic()).count();
        if letters <= word.chars().count() - letters {
            return word.to_string();
        }

        let core = word.trim_end_matches(|c: char| !c.is_alphanumeric());
        let suffix = &word[core.len()..];
        let lowered = core.to_lowercase();

        if self.frequencies.contains_key(&lowered) {
            return word.to_string();
        }

        let Some(best) = self.best_candidate(&lowered) else {
            return word.to_string();
        };

        debug!("Spelling: '{}' -> '{}'", core, best);
        format!("{}{}", transfer_case(core, best), suffix)
    }

    /// Correct each whitespace-separated token of a line.
    pub fn correct_line(&self, line: &str) -> String {
        line.split_whitespace()
            .map(|w| self.correct_word(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn best_candidate(&self, lowered: &str) -> Option<&str> {
        let len = lowered.chars().count();
        self.frequencies
            .iter()
            .filter(|(term, _)| term.chars().count().abs_diff(len) <= MAX_EDIT_DISTANCE)
            .filter(|(term, _)| strsim::levenshtein(term, lowered) <= MAX_EDIT_DISTANCE)
            .max_by(|(a_term, a), (b_term, b)| a.cmp(b).then_with(|| b_term.cmp(a_term)))
            .map(|(term, _)| term.as_str())
    }
}

fn transfer_case(original: &str, replacement: &str) -> String {
    let mut chars = original.chars();
    let first_upper = chars.next().is_some_and(char::is_uppercase);
    let all_upper = original
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase);

    if all_upper && original.chars().filter(|c| c.is_alphabetic()).count() > 1 {
        return replacement.to_uppercase();
    }

    if first_upper {
        let mut out = String::with_capacity(replacement.len());
        let mut rest = replacement.chars();
        if let Some(first) = rest.next() {
            out.extend(first.to_uppercase());
        }
        out.extend(rest);
        return out;
    }

    replacement.to_string()
}
