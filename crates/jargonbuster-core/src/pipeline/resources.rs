use std::collections::HashSet;
use std::time::Instant;
use tracing::info;

pub const DEFAULT_LANGUAGE_MODEL: &str = "en";

const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "may", "me", "might", "more", "most", "must", "my", "myself", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "upon", "us", "very", "was",
    "we", "were", "what", "when", "where", "which", "while", "who", "whom", "whose", "why",
    "will", "with", "within", "without", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Language data shared read-only by every execution of a pipeline.
#[derive(Debug)]
pub struct LanguageResources {
    pub language_model: String,
    pub stopwords: HashSet<&'static str>,
}

impl LanguageResources {
    pub fn load(language_model: &str) -> Self {
        let started = Instant::now();
        let stopwords = ENGLISH_STOPWORDS.iter().copied().collect();

        info!(
            "Loaded language resources for '{}' in {:?}",
            language_model,
            started.elapsed()
        );

        Self {
            language_model: language_model.to_string(),
            stopwords,
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word.to_lowercase().as_str())
    }
}

impl Default for LanguageResources {
    fn default() -> Self {
        Self::load(DEFAULT_LANGUAGE_MODEL)
    }
}
