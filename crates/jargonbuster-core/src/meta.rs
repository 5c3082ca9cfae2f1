//! Loosely typed document metadata and the helpers that normalize it.
//!
//! Backends disagree on key names (`Content-Type` vs `content_type`, `title`
//! vs `dc:title`), so standardized report fields are resolved through
//! ordered alias lists rather than per-backend special cases.

use serde_json::{Map, Value};

/// String-keyed metadata as produced by backends and consumed by reports.
pub type Meta = Map<String, Value>;

/// Value used when none of the aliases of a standardized field is present.
pub const UNKNOWN: &str = "<unknown>";

pub const LANGUAGE_ALIASES: &[&str] = &["Language", "language", "lang", "meta_language"];
pub const CONTENT_TYPE_ALIASES: &[&str] = &["Content-Type", "content_type", "content-type"];
pub const PAGE_COUNT_ALIASES: &[&str] = &["xmpTPg:NPages", "page_count", "pages"];
pub const TITLE_ALIASES: &[&str] = &["title", "dc:title", "pdf:docinfo:title"];
pub const AUTHOR_ALIASES: &[&str] = &["author", "authors", "dc:creator", "meta:author", "Author"];

/// A report field resolved from source metadata through an alias list.
#[derive(Debug, Clone, Copy)]
pub struct StandardField {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Count,
}

pub const STANDARD_FIELDS: &[StandardField] = &[
    StandardField {
        name: "document_language",
        aliases: LANGUAGE_ALIASES,
        kind: FieldKind::Text,
    },
    StandardField {
        name: "document_type",
        aliases: CONTENT_TYPE_ALIASES,
        kind: FieldKind::Text,
    },
    StandardField {
        name: "document_num_pages",
        aliases: PAGE_COUNT_ALIASES,
        kind: FieldKind::Count,
    },
    StandardField {
        name: "document_title",
        aliases: TITLE_ALIASES,
        kind: FieldKind::Text,
    },
    StandardField {
        name: "document_author",
        aliases: AUTHOR_ALIASES,
        kind: FieldKind::Text,
    },
];

/// Returns the value of the first alias present in `meta`.
#[must_use]
pub fn find_first<'a>(meta: &'a Meta, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|alias| meta.get(*alias))
}

/// Like [`find_first`], but yields `default` when no alias matches.
#[must_use]
pub fn find_first_or(meta: &Meta, aliases: &[&str], default: Value) -> Value {
    find_first(meta, aliases).cloned().unwrap_or(default)
}

impl StandardField {
    /// Resolve this field against `meta`.
    ///
    /// Text fields fall back to [`UNKNOWN`], counts fall back to zero.
    #[must_use]
    pub fn resolve(&self, meta: &Meta) -> Value {
        match self.kind {
            FieldKind::Text => {
                let value = find_first_or(meta, self.aliases, Value::from(UNKNOWN));
                Value::String(display_value(&value))
            }
            FieldKind::Count => {
                let value = find_first_or(meta, self.aliases, Value::from(0));
                Value::from(as_count(&value))
            }
        }
    }
}

/// Insert every standardized field into `target`, resolving against `source`.
pub fn standardize(target: &mut Meta, source: &Meta) {
    for field in STANDARD_FIELDS {
        target.insert(field.name.to_string(), field.resolve(source));
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => UNKNOWN.to_string(),
        other => other.to_string(),
    }
}

fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Array(items) => items.first().map_or(0, as_count),
        _ => 0,
    }
}

/// Truthiness of a metadata value: null, false, zero and empty containers are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Drop every top-level entry whose value is falsy.
pub fn prune_empty(meta: &mut Meta) {
    meta.retain(|_, value| is_truthy(value));
}

/// Record a timing under `meta["timed"][key]`, creating the map when needed.
pub fn record_timing(meta: &mut Meta, key: &str, millis: u128) {
    let entry = meta
        .entry("timed")
        .or_insert_with(|| Value::Object(Map::new()));

    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }

    if let Value::Object(timed) = entry {
        timed.insert(key.to_string(), Value::from(u64::try_from(millis).unwrap_or(u64::MAX)));
    }
}

/// Shallow merge: keys of `overlay` replace keys of `base`.
#[must_use]
pub fn merged(base: &Meta, overlay: Meta) -> Meta {
    let mut out = base.clone();
    out.extend(overlay);
    out
}
