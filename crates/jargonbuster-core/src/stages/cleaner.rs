use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

use crate::meta::Meta;
use crate::pipeline::{ActiveStages, Annotation, Applied, DocumentState, Stage, StageError, StageId};

static HYPHENATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w)-[ \t]*\r?\n[ \t]*(\w)").expect("hyphenation pattern should compile")
});
static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t\x0B\x0C\u{00A0}\u{2000}-\u{200A}\u{202F}\u{3000}]+")
        .expect("whitespace pattern should compile")
});
static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\r?\n\s*").expect("line break pattern should compile"));
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|ftp://|www\.)[^\s<>]+").expect("url pattern should compile")
});
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[\w.+-]+@[\w-]+(?:\.[\w-]+)+\b").expect("email pattern should compile")
});
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-])?(?:\(\d{3}\)\s?|\b\d{3}[\s.-])\d{3}[\s.-]\d{4}\b")
        .expect("phone pattern should compile")
});
static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)@\w+").expect("handle pattern should compile"));
static STRAY_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" \. ").expect("stray dot pattern should compile"));

const COLLAPSIBLE: &[char] = &['.', ',', ';', ':', '-', '_', ' '];

fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '“' | '”' | '„' | '‟' | '″' | '«' | '»' => '"',
            '‘' | '’' | '‚' | '‛' | '′' => '\'',
            other => other,
        })
        .collect()
}

fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous = None;
    for c in text.chars() {
        if previous == Some(c) && COLLAPSIBLE.contains(&c) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

/// Normalize and scrub raw document text.
///
/// Order matters: hyphenated line breaks are joined before line breaks are
/// flattened, and repeats are collapsed after removals leave gaps behind.
pub fn clean_text(text: &str) -> String {
    let text = normalize_quotes(text.trim());
    let text = HYPHENATED.replace_all(&text, "$1$2");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = URL.replace_all(&text, "");
    let text = EMAIL.replace_all(&text, "");
    let text = PHONE.replace_all(&text, "");
    let text = HANDLE.replace_all(&text, "$1");
    let text = LINE_BREAKS.replace_all(&text, " ");
    let text = collapse_repeats(&text);
    let text = STRAY_DOT.replace_all(&text, " ");
    text.trim().to_string()
}

/// Rewrites the document text; must run before any annotation exists.
pub struct Cleaner;

#[async_trait]
impl Stage for Cleaner {
    fn id(&self) -> StageId {
        StageId::Cleaner
    }

    fn apply(&self, state: &mut DocumentState, _active: &ActiveStages) -> Result<Applied, StageError> {
        let cleaned = clean_text(state.text());
        debug!(
            "Cleaned text: {} -> {} bytes",
            state.text().len(),
            cleaned.len()
        );
        state.replace_text(cleaned)?;

        let mut profile = Meta::new();
        profile.insert("cleaning-profile".into(), Value::from("default"));
        Ok(Applied::Ready(Annotation::Cleaning(profile)))
    }

    async fn compute_annotation(&self, _state: &DocumentState) -> Result<Annotation, StageError> {
        Ok(Annotation::Empty)
    }
}
