use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use url::Url;

use crate::extract::backend::{Backend, BackendError, BackendResult};
use crate::extract::http::HttpClient;
use crate::extract::request::{ExtractionRequest, ExtractionResponse};
use crate::meta::{merged, Meta};

const PAGE_MARKER: &str = "wikipedia.org/wiki";

/// Encyclopedia pages, read through the MediaWiki query API as plain text.
pub struct WikipediaBackend {
    http: HttpClient,
}

impl WikipediaBackend {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Build the API query URL for a `…wikipedia.org/wiki/<Page>` URL.
    fn api_url(page_url: &str) -> BackendResult<Url> {
        let parsed = Url::parse(page_url)
            .map_err(|e| BackendError::Unsupported(format!("invalid page url: {e}")))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| BackendError::Unsupported("page url without host".to_string()))?;

        let page = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| BackendError::Unsupported(format!("no page name in {page_url}")))?;

        let title = decode_segment(page);

        let mut api = Url::parse(&format!("https://{host}/w/api.php"))
            .map_err(|e| BackendError::Unsupported(e.to_string()))?;
        api.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("prop", "extracts|info")
            .append_pair("explaintext", "1")
            .append_pair("inprop", "url")
            .append_pair("redirects", "1")
            .append_pair("format", "json")
            .append_pair("titles", &title);

        Ok(api)
    }

    fn parse_page(body: &Value) -> BackendResult<(String, Meta)> {
        let page = body
            .pointer("/query/pages")
            .and_then(Value::as_object)
            .and_then(|pages| pages.values().next())
            .ok_or_else(|| BackendError::InvalidResponse("no pages in response".to_string()))?;

        if page.get("missing").is_some() {
            let title = page.get("title").and_then(Value::as_str).unwrap_or("?");
            return Err(BackendError::Service(format!("page '{title}' does not exist")));
        }

        let text = page
            .get("extract")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let summary = text
            .split("\n\n")
            .map(str::trim)
            .find(|p| !p.is_empty())
            .unwrap_or_default()
            .to_string();

        let mut meta = Meta::new();
        meta.insert("source".into(), Value::from("wikipedia"));
        if let Some(url) = page.get("fullurl").and_then(Value::as_str) {
            meta.insert("source_url".into(), Value::from(url));
        }
        if let Some(title) = page.get("title").and_then(Value::as_str) {
            meta.insert("title".into(), Value::from(title));
        }
        meta.insert("summary".into(), Value::from(summary));

        Ok((text, meta))
    }
}

fn decode_segment(segment: &str) -> String {
    url::form_urlencoded::parse(format!("t={segment}").as_bytes())
        .next()
        .map_or_else(|| segment.to_string(), |(_, v)| v.into_owned())
}

#[async_trait]
impl Backend for WikipediaBackend {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn can_handle(&self, request: &ExtractionRequest) -> bool {
        request
            .url()
            .is_some_and(|u| u.to_lowercase().contains(PAGE_MARKER))
    }

    async fn extract(&self, request: &ExtractionRequest) -> BackendResult<ExtractionResponse> {
        let page_url = request
            .url()
            .ok_or_else(|| BackendError::Unsupported("wikipedia needs a url".to_string()))?;

        info!("Extracting text via Wikipedia API: {} ...", page_url);

        let api = Self::api_url(page_url)?;
        let body = self.http.get_json(api.as_str()).await?;
        let (text, meta) = Self::parse_page(&body)?;

        Ok(ExtractionResponse::new(text, merged(&request.meta, meta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use serde_json::json;

    #[tokio::test]
    async fn test_handles_only_wiki_page_urls() {
        let backend = WikipediaBackend::new(HttpClient::new(&ExtractorConfig::default()).unwrap());

        let page = ExtractionRequest::from_url("https://EN.Wikipedia.org/wiki/Patellar_dislocation");
        let search = ExtractionRequest::from_url("https://en.wikipedia.org/w/index.php?search=x");
        let file = ExtractionRequest::from_file("wikipedia.org/wiki/notes.txt");

        assert!(backend.can_handle(&page).await);
        assert!(!backend.can_handle(&search).await);
        assert!(!backend.can_handle(&file).await);
    }

    #[test]
    fn test_api_url_uses_last_path_segment() {
        let api =
            WikipediaBackend::api_url("https://de.wikipedia.org/wiki/Patellaluxation").unwrap();

        assert_eq!(api.host_str(), Some("de.wikipedia.org"));
        assert_eq!(api.path(), "/w/api.php");
        assert!(api
            .query_pairs()
            .any(|(k, v)| k == "titles" && v == "Patellaluxation"));
    }

    #[test]
    fn test_api_url_decodes_percent_escapes() {
        let api = WikipediaBackend::api_url("https://en.wikipedia.org/wiki/Caf%C3%A9").unwrap();
        assert!(api.query_pairs().any(|(k, v)| k == "titles" && v == "Café"));
    }

    #[test]
    fn test_parse_page() {
        let body = json!({
            "query": {"pages": {"42": {
                "title": "Patellar dislocation",
                "fullurl": "https://en.wikipedia.org/wiki/Patellar_dislocation",
                "extract": "A patellar dislocation is a knee injury.\n\nSymptoms include pain."
            }}}
        });

        let (text, meta) = WikipediaBackend::parse_page(&body).unwrap();
        assert!(text.starts_with("A patellar dislocation"));
        assert_eq!(meta["source"], "wikipedia");
        assert_eq!(meta["title"], "Patellar dislocation");
        assert_eq!(meta["summary"], "A patellar dislocation is a knee injury.");
    }

    #[test]
    fn test_parse_missing_page() {
        let body = json!({"query": {"pages": {"-1": {"title": "Nope", "missing": ""}}}});
        assert!(matches!(
            WikipediaBackend::parse_page(&body),
            Err(BackendError::Service(_))
        ));
    }
}
