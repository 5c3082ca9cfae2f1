use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

use crate::meta::Meta;

/// A document source to extract text from: a URL or a local file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub config: Meta,
    /// Content type detected for this source, shared by every backend that asks.
    #[serde(skip)]
    pub(crate) detected_content_type: OnceCell<Option<String>>,
}

impl ExtractionRequest {
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            filename: Some(path.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Meta) -> Self {
        self.config = config;
        self
    }

    /// The URL, when the request is URL-based. A URL takes precedence over a filename.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// The local file, when the request is not URL-based.
    pub fn file(&self) -> Option<&Path> {
        if self.url().is_some() {
            return None;
        }
        self.filename.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.url().is_some() || self.file().is_some()
    }

    /// Human-readable source for logs and error messages.
    pub fn source_label(&self) -> String {
        if let Some(url) = self.url() {
            return url.to_string();
        }
        self.file()
            .map_or_else(|| "<no source>".to_string(), |p| p.display().to_string())
    }
}

/// Raw text plus metadata as produced by a backend.
///
/// Callers must check [`error`](Self::error) before trusting `text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub text: String,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_objects: Option<Vec<Meta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResponse {
    #[must_use]
    pub fn new(text: String, meta: Meta) -> Self {
        Self {
            text,
            meta,
            embedded_objects: None,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_embedded_objects(mut self, objects: Vec<Meta>) -> Self {
        self.embedded_objects = Some(objects);
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
