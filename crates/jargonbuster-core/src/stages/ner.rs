//! Named entity recognition.
//!
//! `EntityRecognizer` is the seam for recognition backends. The built-in
//! `PatternRecognizer` combines gazetteers with capitalization patterns and
//! labels entities with the usual OntoNotes categories.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::pipeline::{Annotation, DocumentState, NamedEntity, Stage, StageError, StageId};

/// Trait for pluggable entity recognizers.
pub trait EntityRecognizer: Send + Sync {
    fn recognizer_id(&self) -> &str;

    /// Entity mentions in text order, without overlaps.
    fn recognize(&self, text: &str) -> Vec<NamedEntity>;
}

#[derive(Debug, Clone)]
struct Rule {
    label: &'static str,
    pattern: Regex,
    group: usize,
}

const ORGANIZATION_ACRONYMS: &[&str] = &[
    "WHO", "CDC", "NIH", "FDA", "NHS", "EMA", "EU", "UN", "UNICEF", "NATO", "NASA", "FBI", "CIA",
    "IMF", "OECD", "BBC", "CNN", "IBM",
];

const PLACES: &[&str] = &[
    "United States", "United Kingdom", "Germany", "France", "Spain", "Italy", "Canada", "Mexico",
    "Brazil", "China", "Japan", "India", "Russia", "Australia", "Austria", "Switzerland",
    "Netherlands", "Belgium", "Sweden", "Norway", "Poland", "Ireland", "Scotland", "England",
    "Egypt", "Nigeria", "Kenya", "South Africa", "Argentina", "Turkey", "Greece", "Israel",
    "Iran", "Iraq", "Ukraine", "Korea", "Europe", "Africa", "Asia", "America", "London", "Paris",
    "Berlin", "Munich", "Hamburg", "Vienna", "Zurich", "Madrid", "Rome", "Amsterdam", "Brussels",
    "New York", "Los Angeles", "Chicago", "Boston", "San Francisco", "Washington", "Toronto",
    "Tokyo", "Beijing", "Shanghai", "Delhi", "Moscow", "Sydney", "Cairo", "Dublin", "Lisbon",
    "California", "Texas", "Florida", "Bavaria",
];

const NATIONALITIES: &[&str] = &[
    "American", "Americans", "British", "German", "Germans", "French", "Spanish", "Italian",
    "Italians", "Canadian", "Canadians", "Chinese", "Japanese", "Indian", "Indians", "Russian",
    "Russians", "European", "Europeans", "African", "Africans", "Asian", "Asians", "Christian",
    "Christians", "Muslim", "Muslims", "Jewish", "Hindu", "Buddhist", "Catholic", "Protestant",
    "Democrat", "Democrats", "Republican", "Republicans",
];

const PRODUCTS: &[&str] = &[
    "iPhone", "iPad", "MacBook", "Android", "Windows", "Kindle", "PlayStation", "Xbox", "Tylenol",
    "Advil", "Aspirin", "Prozac", "Viagra",
];

fn pattern_rule(label: &'static str, pattern: &str, group: usize) -> Rule {
    Rule {
        label,
        pattern: Regex::new(pattern).expect("entity pattern should compile"),
        group,
    }
}

fn gazetteer_rule(label: &'static str, terms: &[&str]) -> Rule {
    let mut sorted: Vec<&str> = terms.to_vec();
    // longest first, so "New York" wins over "York"
    sorted.sort_by_key(|term| std::cmp::Reverse(term.len()));
    let alternation = sorted
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    pattern_rule(label, &format!(r"\b(?:{alternation})\b"), 0)
}

static DEFAULT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        pattern_rule(
            "PERSON",
            r"(?:Dr\.|Prof\.|Mr\.|Mrs\.|Ms\.|Professor|President|Senator|Minister|Judge)\s+([A-Z][a-z]+(?:\s+[A-Z]\.)?(?:\s+[A-Z][a-z]+)?)",
            1,
        ),
        pattern_rule(
            "ORG",
            r"\b(?:[A-Z][A-Za-z&'-]+\s+){1,4}(?:Inc|Corp|Corporation|Company|Ltd|LLC|University|Institute|Hospital|Clinic|Association|Foundation|Agency|Organization|Organisation|Ministry|Council|Society|Center|Centre|Group|Bank)\b",
            0,
        ),
        pattern_rule(
            "ORG",
            r"\b(?:University|Institute|Ministry|Department|Bank) of [A-Z][a-z]+(?:\s+[A-Z][a-z]+)*",
            0,
        ),
        gazetteer_rule("ORG", ORGANIZATION_ACRONYMS),
        pattern_rule(
            "EVENT",
            r"\b(?:World War (?:II|I|One|Two)|(?:[A-Z][a-z]+\s+){1,3}(?:War|Olympics|Summit|Conference|Festival|Pandemic|Games|Championship))\b",
            0,
        ),
        pattern_rule(
            "FAC",
            r"\b(?:[A-Z][a-z]+\s+){1,3}(?:Airport|Bridge|Stadium|Tower|Station|Highway|Museum)\b",
            0,
        ),
        pattern_rule("WORK_OF_ART", r#""([A-Z][^"]{2,80})""#, 1),
        gazetteer_rule("GPE", PLACES),
        gazetteer_rule("NORP", NATIONALITIES),
        gazetteer_rule("PRODUCT", PRODUCTS),
    ]
});

/// Gazetteer and pattern based recognizer.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    rules: Vec<Rule>,
}

impl PatternRecognizer {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }

    /// Add a labelled pattern; whole matches become entities.
    pub fn with_pattern(mut self, label: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        self.rules.push(Rule {
            label,
            pattern: Regex::new(pattern)?,
            group: 0,
        });
        Ok(self)
    }

    fn candidates(&self, text: &str) -> Vec<NamedEntity> {
        let mut found = Vec::new();
        for rule in &self.rules {
            for captures in rule.pattern.captures_iter(text) {
                let Some(m) = captures.get(rule.group) else {
                    continue;
                };
                let (mut start, end) = (m.start(), m.end());
                if m.as_str().starts_with("The ") {
                    start += "The ".len();
                }
                if start < end {
                    found.push(NamedEntity {
                        text: text[start..end].to_string(),
                        label: rule.label.to_string(),
                        start,
                        end,
                    });
                }
            }
        }
        found
    }
}

impl Default for PatternRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn recognizer_id(&self) -> &str {
        "pattern"
    }

    fn recognize(&self, text: &str) -> Vec<NamedEntity> {
        let mut candidates = self.candidates(text);
        // stable: at an identical span the earlier rule wins
        candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut entities: Vec<NamedEntity> = Vec::new();
        for candidate in candidates {
            if entities.last().is_some_and(|last| candidate.start < last.end) {
                continue;
            }
            entities.push(candidate);
        }
        entities
    }
}

/// Named entity stage backed by an `EntityRecognizer`.
pub struct Ner {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl Ner {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }
}

#[async_trait]
impl Stage for Ner {
    fn id(&self) -> StageId {
        StageId::Ner
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        Ok(Annotation::Entities(self.recognizer.recognize(state.text())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(text: &str) -> Vec<(String, String)> {
        PatternRecognizer::new()
            .recognize(text)
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    fn pair(text: &str, label: &str) -> (String, String) {
        (text.to_string(), label.to_string())
    }

    #[test]
    fn test_recognizes_common_labels() {
        let entities =
            labelled("Dr. Jane Smith of the Mayo Clinic spoke in Berlin about World War II.");
        assert_eq!(
            entities,
            vec![
                pair("Jane Smith", "PERSON"),
                pair("Mayo Clinic", "ORG"),
                pair("Berlin", "GPE"),
                pair("World War II", "EVENT"),
            ]
        );
    }

    #[test]
    fn test_repeated_mentions_are_kept() {
        let entities = labelled("The WHO and the CDC agree. The WHO disagrees with Germans.");
        assert_eq!(
            entities,
            vec![
                pair("WHO", "ORG"),
                pair("CDC", "ORG"),
                pair("WHO", "ORG"),
                pair("Germans", "NORP"),
            ]
        );
    }

    #[test]
    fn test_longer_span_wins() {
        let entities = labelled("They moved to New York.");
        assert_eq!(entities, vec![pair("New York", "GPE")]);
    }

    #[test]
    fn test_leading_article_is_trimmed() {
        let entities = labelled("The Berlin Heart Institute opened.");
        assert_eq!(entities, vec![pair("Berlin Heart Institute", "ORG")]);
    }

    #[test]
    fn test_custom_pattern() {
        let recognizer = PatternRecognizer::new()
            .with_pattern("PRODUCT", r"\bWidget \d+\b")
            .unwrap();
        let entities = recognizer.recognize("Buy a Widget 3 today.");
        assert_eq!(entities[0].text, "Widget 3");
        assert_eq!(entities[0].label, "PRODUCT");
    }
}
