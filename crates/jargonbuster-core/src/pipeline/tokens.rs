use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+(?:[-'’.]\w+)*|[^\w\s]").expect("token pattern should compile")
});

/// One token of a document's current text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub is_stop: bool,
    pub is_punct: bool,
}

impl Token {
    /// Counts towards word statistics: neither stop word nor punctuation.
    pub fn is_word(&self) -> bool {
        !self.is_stop && !self.is_punct
    }

    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }
}

/// Split text into word and punctuation tokens with byte offsets.
pub fn tokenize(text: &str, stopwords: &HashSet<&'static str>) -> Vec<Token> {
    TOKEN
        .find_iter(text)
        .map(|m| {
            let token = m.as_str();
            let is_punct = !token.chars().any(char::is_alphanumeric);
            Token {
                text: token.to_string(),
                start: m.start(),
                end: m.end(),
                is_stop: !is_punct && stopwords.contains(token.to_lowercase().as_str()),
                is_punct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_words_and_punctuation() {
        let stopwords: HashSet<&'static str> = ["this", "the"].into_iter().collect();
        let tokens = tokenize("This helps the well-known U.S. team!", &stopwords);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();

        assert_eq!(texts, vec!["This", "helps", "the", "well-known", "U.S", ".", "team", "!"]);
        assert!(tokens[0].is_stop);
        assert!(tokens[1].is_word());
        assert!(tokens[7].is_punct);
        assert_eq!(&"This helps the well-known U.S. team!"[tokens[3].start..tokens[3].end], "well-known");
    }
}
