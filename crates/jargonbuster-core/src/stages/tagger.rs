use async_trait::async_trait;

use crate::pipeline::{Annotation, DocumentState, PosTag, Stage, StageError, StageId, Token};

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "another", "either", "neither", "all", "both",
];
const ADPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from", "up", "down", "over",
    "under", "around", "among", "without", "within", "across", "behind", "beyond", "near",
    "since", "toward", "towards", "upon", "via", "per",
];
const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "you", "your", "yours", "he", "him", "his", "she", "her", "hers",
    "it", "its", "we", "us", "our", "ours", "they", "them", "their", "theirs", "who", "whom",
    "whose", "which", "what", "myself", "yourself", "himself", "herself", "itself", "ourselves",
    "themselves", "someone", "something", "anyone", "anything", "everyone", "everything",
];
const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet", "so"];
const ADVERBS: &[&str] = &[
    "not", "very", "also", "often", "always", "never", "sometimes", "usually", "too", "here",
    "there", "now", "then", "still", "already", "soon", "again", "just", "even", "almost",
];
const VERBS: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "have", "has", "had", "do", "does",
    "did", "can", "could", "will", "would", "shall", "should", "may", "might", "must", "get",
    "gets", "got", "make", "makes", "made", "take", "takes", "took", "help", "helps", "cause",
    "causes", "include", "includes", "need", "needs", "see", "sees", "saw", "go", "goes", "went",
    "say", "says", "said", "use", "uses", "show", "shows", "find", "finds", "found", "give",
    "gives", "gave", "know", "knows", "knew", "become", "becomes", "became", "seem", "seems",
    "keep", "keeps", "let", "lets", "feel", "feels", "felt", "hurt", "hurts", "tell", "tells",
    "told", "work", "works", "affect", "affects", "reduce", "reduces", "treat", "treats",
];
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "al", "ic", "less", "ish", "ary",
];
const VERB_SUFFIXES: &[&str] = &["ing", "ed", "ize", "ise", "ify"];
const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ance", "ence", "ism", "ist", "ship", "hood", "ure",
];

fn ends_with_any(word: &str, suffixes: &[&str]) -> bool {
    suffixes
        .iter()
        .any(|suffix| word.len() > suffix.len() + 2 && word.ends_with(suffix))
}

/// Tag one token. `sentence_start` marks the first word of a sentence,
/// where capitalization says nothing about proper nouns.
pub fn tag_token(token: &Token, sentence_start: bool) -> PosTag {
    if token.is_punct {
        return PosTag::Punct;
    }
    if token.text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return PosTag::Num;
    }

    let lower = token.lower();
    let word = lower.as_str();

    if DETERMINERS.contains(&word) {
        return PosTag::Det;
    }
    if ADPOSITIONS.contains(&word) {
        return PosTag::Adp;
    }
    if PRONOUNS.contains(&word) {
        return PosTag::Pron;
    }
    if CONJUNCTIONS.contains(&word) {
        return PosTag::Cconj;
    }
    if ADVERBS.contains(&word) {
        return PosTag::Adv;
    }
    if VERBS.contains(&word) {
        return PosTag::Verb;
    }

    let capitalized = token.text.chars().next().is_some_and(char::is_uppercase);
    if capitalized && !sentence_start {
        return PosTag::Propn;
    }
    if !token.text.chars().any(char::is_alphabetic) {
        return PosTag::X;
    }

    if ends_with_any(word, NOUN_SUFFIXES) {
        PosTag::Noun
    } else if word.len() > 4 && word.ends_with("ly") {
        PosTag::Adv
    } else if ends_with_any(word, VERB_SUFFIXES) {
        PosTag::Verb
    } else if ends_with_any(word, ADJECTIVE_SUFFIXES) {
        PosTag::Adj
    } else {
        PosTag::Noun
    }
}

/// Tag a token stream, one tag per token.
pub fn tag_tokens(tokens: &[Token]) -> Vec<PosTag> {
    let mut sentence_start = true;
    tokens
        .iter()
        .map(|token| {
            let tag = tag_token(token, sentence_start);
            sentence_start = matches!(token.text.as_str(), "." | "!" | "?");
            tag
        })
        .collect()
}

/// Lexicon and suffix based part-of-speech tagger.
pub struct Tagger;

#[async_trait]
impl Stage for Tagger {
    fn id(&self) -> StageId {
        StageId::Tagger
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        Ok(Annotation::Tags(tag_tokens(state.tokens())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tokenize;
    use std::collections::HashSet;

    fn tags(text: &str) -> Vec<PosTag> {
        tag_tokens(&tokenize(text, &HashSet::new()))
    }

    #[test]
    fn test_tags_align_with_tokens() {
        assert_eq!(
            tags("The knee pain is chronic."),
            vec![
                PosTag::Det,
                PosTag::Noun,
                PosTag::Noun,
                PosTag::Verb,
                PosTag::Adj,
                PosTag::Punct
            ]
        );
    }

    #[test]
    fn test_capitalized_word_mid_sentence_is_proper_noun() {
        let tagged = tags("Patients in Berlin recovered quickly.");
        assert_eq!(tagged[0], PosTag::Noun);
        assert_eq!(tagged[2], PosTag::Propn);
        assert_eq!(tagged[3], PosTag::Verb);
        assert_eq!(tagged[4], PosTag::Adv);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tags("3 doses")[0], PosTag::Num);
    }
}
