//! Built-in extraction backends, most content-specific first.

mod cloud_ocr;
mod generic;
mod image_ocr;
mod web_article;
mod wikipedia;

pub use cloud_ocr::CloudOcrBackend;
pub use generic::GenericBackend;
pub use image_ocr::ImageOcrBackend;
pub use web_article::WebArticleBackend;
pub use wikipedia::WikipediaBackend;

use super::backend::BackendResult;
use super::http::HttpClient;
use super::request::ExtractionRequest;

/// Fetch the raw bytes of a request's source and the content type reported for them.
pub(crate) async fn read_source(
    request: &ExtractionRequest,
    http: &HttpClient,
) -> BackendResult<(Vec<u8>, Option<String>)> {
    if let Some(url) = request.url() {
        let (bytes, headers) = http.get_bytes(url).await?;
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_lowercase());
        return Ok((bytes, content_type));
    }

    let Some(path) = request.file() else {
        return Err(super::backend::BackendError::Unsupported(
            "request has neither url nor filename".to_string(),
        ));
    };

    let bytes = tokio::fs::read(path).await?;
    Ok((bytes, None))
}
