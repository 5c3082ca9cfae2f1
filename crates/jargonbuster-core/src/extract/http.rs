use reqwest::header::{HeaderMap, CONTENT_TYPE, RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

use crate::config::ExtractorConfig;

const DEFAULT_USER_AGENT: &str = concat!("jargonbuster/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Shared HTTP client for backends and enrichment services.
///
/// Every request carries the configured timeouts; probes get their own,
/// shorter bound so `can_handle` never blocks for long.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    probe_timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &ExtractorConfig) -> ClientResult<Self> {
        Self::with_timeouts(
            config.connect_timeout(),
            config.request_timeout(),
            config.probe_timeout(),
            config.user_agent.as_deref(),
        )
    }

    pub fn with_timeouts(
        connect_timeout: Duration,
        request_timeout: Duration,
        probe_timeout: Duration,
        user_agent: Option<&str>,
    ) -> ClientResult<Self> {
        let inner = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()?;

        Ok(Self {
            inner,
            probe_timeout,
        })
    }

    fn validate_request(url: &str) -> ClientResult<Url> {
        let parsed = Url::parse(url)?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none() {
            return Err(ClientError::InvalidUrl("No host in URL".to_string()));
        }

        Ok(parsed)
    }

    async fn send(builder: RequestBuilder, url: &str) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    pub fn request(&self, method: reqwest::Method, url: &str) -> ClientResult<RequestBuilder> {
        let parsed = Self::validate_request(url)?;
        Ok(self.inner.request(method, parsed))
    }

    pub async fn get_bytes(&self, url: &str) -> ClientResult<(Vec<u8>, HeaderMap)> {
        let builder = self.request(reqwest::Method::GET, url)?;
        let response = Self::send(builder, url).await?;
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        Ok((bytes.to_vec(), headers))
    }

    pub async fn get_text(&self, url: &str) -> ClientResult<String> {
        let builder = self.request(reqwest::Method::GET, url)?;
        Ok(Self::send(builder, url).await?.text().await?)
    }

    pub async fn get_json(&self, url: &str) -> ClientResult<serde_json::Value> {
        let builder = self.request(reqwest::Method::GET, url)?;
        Ok(Self::send(builder, url).await?.json().await?)
    }

    /// Send a prepared request, failing on non-success status.
    pub async fn execute(&self, builder: RequestBuilder, url: &str) -> ClientResult<Response> {
        Self::send(builder, url).await
    }

    /// Determine a URL's content type with a bounded probe.
    ///
    /// Tries `HEAD` first; servers that reject it get a one-byte ranged `GET`.
    pub async fn probe_content_type(&self, url: &str) -> ClientResult<Option<String>> {
        let head = self
            .request(reqwest::Method::HEAD, url)?
            .timeout(self.probe_timeout);

        if let Ok(response) = Self::send(head, url).await {
            if let Some(content_type) = header_content_type(response.headers()) {
                return Ok(Some(content_type));
            }
        }

        let ranged = self
            .request(reqwest::Method::GET, url)?
            .header(RANGE, "bytes=0-0")
            .timeout(self.probe_timeout);
        let response = ranged.send().await?;

        Ok(header_content_type(response.headers()))
    }
}

fn header_content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_validate_accepts_http_and_https() {
        assert!(HttpClient::validate_request("http://localhost:8080/api").is_ok());
        assert!(HttpClient::validate_request("https://en.wikipedia.org/wiki/Cat").is_ok());
    }

    #[test]
    fn test_validate_rejects_invalid_url() {
        assert!(matches!(
            HttpClient::validate_request("not-a-url"),
            Err(ClientError::UrlParse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_file_scheme() {
        assert!(matches!(
            HttpClient::validate_request("file:///etc/passwd"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_header_content_type_strips_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Text/HTML; charset=utf-8"),
        );
        assert_eq!(header_content_type(&headers).as_deref(), Some("text/html"));
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(HttpClient::new(&ExtractorConfig::default()).is_ok());
    }
}
