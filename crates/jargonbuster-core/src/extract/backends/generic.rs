use async_trait::async_trait;
use scraper::{Html, Node};
use serde_json::Value;
use tracing::{debug, info};

use super::read_source;
use crate::extract::backend::{Backend, BackendError, BackendResult};
use crate::extract::content_type::DocumentFormat;
use crate::extract::http::HttpClient;
use crate::extract::request::{ExtractionRequest, ExtractionResponse};
use crate::meta::Meta;

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

const TIKA_CONTENT_KEY: &str = "X-TIKA:content";

/// Catch-all backend: accepts every request.
///
/// With a document server configured the bytes are sent to its recursive
/// metadata endpoint; otherwise text-like formats are decoded locally.
pub struct GenericBackend {
    http: HttpClient,
    tika_url: Option<String>,
}

impl GenericBackend {
    pub fn new(http: HttpClient, tika_url: Option<String>) -> Self {
        Self {
            http,
            tika_url: tika_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    async fn extract_with_tika(
        &self,
        tika_url: &str,
        bytes: Vec<u8>,
    ) -> BackendResult<(String, Meta)> {
        let endpoint = format!("{tika_url}/rmeta/text");
        let builder = self
            .http
            .request(reqwest::Method::PUT, &endpoint)?
            .header(reqwest::header::ACCEPT, "application/json")
            .body(bytes);

        let response = self.http.execute(builder, &endpoint).await?;
        let parsed: Value = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        let Some(Value::Object(mut first)) = parsed.as_array().and_then(|a| a.first()).cloned()
        else {
            return Err(BackendError::InvalidResponse(
                "document server returned no metadata objects".to_string(),
            ));
        };

        let text = match first.remove(TIKA_CONTENT_KEY) {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };

        Ok((text, first))
    }

    fn extract_locally(
        bytes: &[u8],
        format: Option<DocumentFormat>,
    ) -> BackendResult<(String, Meta)> {
        let format = format
            .or_else(|| DocumentFormat::sniff(bytes))
            .ok_or_else(|| BackendError::Unsupported("undetectable binary content".to_string()))?;

        if !format.is_text_like() {
            return Err(BackendError::Unsupported(format!(
                "{} needs a document server",
                format.mime()
            )));
        }

        let raw = String::from_utf8_lossy(bytes);
        let text = if format == DocumentFormat::Html {
            strip_html(&raw)
        } else {
            raw.into_owned()
        };

        let mut meta = Meta::new();
        meta.insert("Content-Type".into(), Value::from(format.mime()));
        Ok((text, meta))
    }
}

/// Text content of an HTML document, with a line break at each block element.
pub(crate) fn strip_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    for node in document.root_element().descendants() {
        match node.value() {
            Node::Element(element) if BLOCK_ELEMENTS.contains(&element.name()) => {
                text.push('\n');
            }
            Node::Text(fragment) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
                });
                if !hidden {
                    text.push_str(fragment);
                }
            }
            _ => {}
        }
    }

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Backend for GenericBackend {
    fn name(&self) -> &'static str {
        "generic"
    }

    async fn can_handle(&self, _request: &ExtractionRequest) -> bool {
        true
    }

    async fn extract(&self, request: &ExtractionRequest) -> BackendResult<ExtractionResponse> {
        info!(
            "Extracting text via generic backend: '{}' ...",
            request.source_label()
        );

        let (bytes, reported) = read_source(request, &self.http).await?;
        let format = reported
            .as_deref()
            .and_then(DocumentFormat::from_mime)
            .or_else(|| request.file().and_then(DocumentFormat::from_path));

        let (text, mut meta) = match &self.tika_url {
            Some(tika_url) => self.extract_with_tika(tika_url, bytes).await?,
            None => Self::extract_locally(&bytes, format)?,
        };

        if !meta.contains_key("Content-Type") {
            if let Some(format) = format {
                meta.insert("Content-Type".into(), Value::from(format.mime()));
            }
        }
        meta.insert("source".into(), Value::from("document"));

        debug!("Generic backend produced {} chars", text.len());
        Ok(ExtractionResponse::new(text, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;

    fn backend() -> GenericBackend {
        let http = HttpClient::new(&ExtractorConfig::default()).unwrap();
        GenericBackend::new(http, None)
    }

    #[test]
    fn test_strip_html_drops_scripts_and_tags() {
        let html = "<html><head><script>var x = 1;</script></head>\
                    <body><p>Hello &amp; welcome</p><p>Second</p></body></html>";
        assert_eq!(strip_html(html), "Hello & welcome\nSecond");
    }

    #[test]
    fn test_strip_html_ignores_attributes_and_comments() {
        let html = r#"<p title="a>b">Knee pain</p><!-- note > x --><p>Rest &eacute; helps</p>"#;
        assert_eq!(strip_html(html), "Knee pain\nRest é helps");
    }

    #[test]
    fn test_strip_html_keeps_inline_text_together() {
        let html = "<div>Take <b>two</b> tablets<br>daily</div><noscript>enable js</noscript>";
        assert_eq!(strip_html(html), "Take two tablets\ndaily");
    }

    #[tokio::test]
    async fn test_accepts_everything() {
        assert!(backend().can_handle(&ExtractionRequest::default()).await);
    }

    #[tokio::test]
    async fn test_extracts_local_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, "Plain notes.").await.unwrap();

        let response = backend()
            .extract(&ExtractionRequest::from_file(&path))
            .await
            .unwrap();

        assert_eq!(response.text, "Plain notes.");
        assert_eq!(response.meta["source"], "document");
        assert_eq!(response.meta["Content-Type"], "text/plain");
    }

    #[tokio::test]
    async fn test_binary_without_server_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        tokio::fs::write(&path, b"%PDF-1.4 binary").await.unwrap();

        let result = backend().extract(&ExtractionRequest::from_file(&path)).await;
        assert!(matches!(result, Err(BackendError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = backend()
            .extract(&ExtractionRequest::from_file("/nonexistent/file.txt"))
            .await;
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
