//! Text helpers shared by the built-in stages.

use regex::Regex;
use std::sync::LazyLock;

use crate::pipeline::Sentence;

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?]+["'’”)\]]*\s+|\n[ \t]*\n\s*"#).expect("boundary pattern should compile")
});
static ALPHA_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z]+(?:['’-][A-Za-z]+)*").expect("word pattern should compile")
});
static ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("alnum pattern should compile"));

const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "vs.", "etc.", "e.g.", "i.e.",
    "inc.", "ltd.", "co.", "no.", "fig.", "approx.", "u.s.", "dept.", "ca.",
];

fn ends_with_abbreviation(candidate: &str) -> bool {
    let Some(last) = candidate.split_whitespace().next_back() else {
        return false;
    };
    let lowered = last.to_lowercase();
    if ABBREVIATIONS.contains(&lowered.as_str()) {
        return true;
    }
    // initials such as "J."
    let mut chars = last.chars();
    matches!((chars.next(), chars.next(), chars.next()), (Some(c), Some('.'), None) if c.is_uppercase())
}

fn push_trimmed(sentences: &mut Vec<Sentence>, text: &str, start: usize, end: usize) {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    sentences.push(Sentence {
        text: trimmed.to_string(),
        start: start + leading,
        end: start + leading + trimmed.len(),
    });
}

/// Rule-based sentence boundaries: terminal punctuation followed by a
/// plausible sentence start, or a blank line.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in BOUNDARY.find_iter(text) {
        let matched = m.as_str();
        let paragraph_break = matched.starts_with('\n');
        let end = if paragraph_break {
            m.start()
        } else {
            m.start() + matched.trim_end().len()
        };

        if !paragraph_break {
            let next = text[m.end()..].chars().next();
            let plausible_start = next.map_or(true, |c| {
                c.is_uppercase() || c.is_numeric() || "\"'“‘([".contains(c)
            });
            if !plausible_start || ends_with_abbreviation(&text[start..end]) {
                continue;
            }
        }

        push_trimmed(&mut sentences, text, start, end);
        start = m.end();
    }

    push_trimmed(&mut sentences, text, start, text.len());
    sentences
}

/// Alphabetic words, keeping inner apostrophes and hyphens.
pub fn alphabetic_words(text: &str) -> Vec<&str> {
    ALPHA_WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// Lowercased alphanumeric terms, as ROUGE tokenizes.
pub fn lowercase_terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    ALNUM
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Estimated syllable count: vowel groups, minus a silent final "e".
pub fn syllables(word: &str) -> usize {
    let lowered: Vec<char> = word.to_lowercase().chars().filter(char::is_ascii_alphabetic).collect();
    if lowered.is_empty() {
        return 0;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &lowered {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    let n = lowered.len();
    if n > 2 && lowered[n - 1] == 'e' && lowered[n - 2] != 'l' && !is_vowel(lowered[n - 2]) {
        count -= 1;
    }

    count.max(1)
}

/// Split text into pieces of at most `max_chars` characters.
pub fn chunk_chars(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// "a", "a and b", "a, b and c"
pub fn join_natural(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        split_sentences(text).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_split_basic() {
        assert_eq!(texts("Hello world. This helps."), vec!["Hello world.", "This helps."]);
    }

    #[test]
    fn test_split_keeps_abbreviations_and_initials() {
        assert_eq!(
            texts("Dr. Smith met J. Doe at 5 p.m. yesterday. It went well!"),
            vec!["Dr. Smith met J. Doe at 5 p.m. yesterday.", "It went well!"]
        );
    }

    #[test]
    fn test_split_on_blank_lines() {
        assert_eq!(texts("Heading\n\nBody text here"), vec!["Heading", "Body text here"]);
    }

    #[test]
    fn test_sentence_offsets() {
        let text = "  First one.  Second one.";
        for sentence in split_sentences(text) {
            assert_eq!(&text[sentence.start..sentence.end], sentence.text);
        }
    }

    #[test]
    fn test_syllables() {
        assert_eq!(syllables("cat"), 1);
        assert_eq!(syllables("table"), 2);
        assert_eq!(syllables("make"), 1);
        assert_eq!(syllables("dislocation"), 4);
        assert_eq!(syllables("rhythm"), 1);
    }

    #[test]
    fn test_chunk_chars_respects_char_boundaries() {
        let chunks = chunk_chars("añbñc", 2);
        assert_eq!(chunks, vec!["añ", "bñ", "c"]);
    }

    #[test]
    fn test_lowercase_terms() {
        assert_eq!(lowercase_terms("Don't PANIC, 42!"), vec!["don", "t", "panic", "42"]);
    }

    #[test]
    fn test_join_natural() {
        assert_eq!(join_natural(&["a", "b", "c"]), "a, b and c");
        assert_eq!(join_natural(&["a"]), "a");
    }
}
