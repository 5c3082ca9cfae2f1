use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::http::HttpClient;
use super::request::ExtractionRequest;

const SNIFF_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Html,
    Pdf,
    Docx,
    Xlsx,
    Csv,
    Json,
    Xml,
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    Webp,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Some(Self::PlainText),
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" | "xhtml" => Some(Self::Html),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xml" => Some(Self::Xml),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim().to_lowercase();
        match essence.as_str() {
            "text/plain" => Some(Self::PlainText),
            "text/markdown" => Some(Self::Markdown),
            "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "application/pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Xlsx)
            }
            "text/csv" => Some(Self::Csv),
            "application/json" => Some(Self::Json),
            "application/xml" | "text/xml" => Some(Self::Xml),
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
        }
    }

    pub fn is_image(self) -> bool {
        matches!(
            self,
            Self::Png | Self::Jpeg | Self::Gif | Self::Bmp | Self::Tiff | Self::Webp
        )
    }

    /// Formats whose bytes are readable text without a document server.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            Self::PlainText | Self::Markdown | Self::Html | Self::Csv | Self::Json | Self::Xml
        )
    }

    /// Guess a format from leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let head = &bytes[..bytes.len().min(SNIFF_LEN)];

        if head.starts_with(b"%PDF-") {
            return Some(Self::Pdf);
        }
        if head.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Some(Self::Png);
        }
        if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if head.starts_with(b"BM") && head.len() > 14 {
            return Some(Self::Bmp);
        }
        if head.starts_with(b"II*\0") || head.starts_with(b"MM\0*") {
            return Some(Self::Tiff);
        }
        if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }

        let text = std::str::from_utf8(head).ok()?;
        let trimmed = text.trim_start().to_lowercase();
        if trimmed.starts_with("<!doctype html") || trimmed.starts_with("<html") {
            return Some(Self::Html);
        }
        if trimmed.starts_with("<?xml") {
            return Some(Self::Xml);
        }
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            return Some(Self::Json);
        }
        Some(Self::PlainText)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = url::Url::parse(url).ok()?;
        let last = parsed.path_segments()?.next_back()?;
        let ext = last.rsplit_once('.')?.1;
        Self::from_extension(ext)
    }
}

/// Detect the content type of a local file: extension first, then magic bytes.
pub async fn detect_file_content_type(path: &Path) -> Option<String> {
    if let Some(format) = DocumentFormat::from_path(path) {
        return Some(format.mime().to_string());
    }

    let mut file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            warn!("Can't open '{}' for sniffing: {}", path.display(), e);
            return None;
        }
    };

    let mut buffer = vec![0u8; SNIFF_LEN];
    let read = file.read(&mut buffer).await.ok()?;
    buffer.truncate(read);

    DocumentFormat::sniff(&buffer).map(|f| f.mime().to_string())
}

/// Detect the content type of a request's source.
///
/// URLs are probed over the network (bounded by the client's probe timeout),
/// falling back to the path extension when the probe fails. The result is
/// cached on the request, so one route probes a source at most once.
pub async fn detect_content_type(request: &ExtractionRequest, http: &HttpClient) -> Option<String> {
    request
        .detected_content_type
        .get_or_init(|| probe_source(request, http))
        .await
        .clone()
}

async fn probe_source(request: &ExtractionRequest, http: &HttpClient) -> Option<String> {
    if let Some(url) = request.url() {
        match http.probe_content_type(url).await {
            Ok(Some(content_type)) => {
                debug!("Detected '{}' as content type for: {}", content_type, url);
                return Some(content_type);
            }
            Ok(None) => {}
            Err(e) => warn!("Error detecting content type of '{}': {}", url, e),
        }
        return DocumentFormat::from_url(url).map(|f| f.mime().to_string());
    }

    let path = request.file()?;
    detect_file_content_type(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("JPG"), Some(DocumentFormat::Jpeg));
        assert_eq!(DocumentFormat::from_extension("unknown"), None);
    }

    #[test]
    fn test_format_from_mime_ignores_parameters() {
        assert_eq!(
            DocumentFormat::from_mime("text/html; charset=utf-8"),
            Some(DocumentFormat::Html)
        );
        assert_eq!(
            DocumentFormat::from_mime("image/png"),
            Some(DocumentFormat::Png)
        );
    }

    #[test]
    fn test_sniff_magic_bytes() {
        assert_eq!(DocumentFormat::sniff(b"%PDF-1.7\n"), Some(DocumentFormat::Pdf));
        assert_eq!(
            DocumentFormat::sniff(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
            Some(DocumentFormat::Png)
        );
        assert_eq!(
            DocumentFormat::sniff(b"  <!DOCTYPE html><html></html>"),
            Some(DocumentFormat::Html)
        );
        assert_eq!(
            DocumentFormat::sniff(b"just words"),
            Some(DocumentFormat::PlainText)
        );
        assert_eq!(DocumentFormat::sniff(&[0xC3, 0x28, 0x00]), None);
    }

    #[test]
    fn test_format_from_url_path() {
        assert_eq!(
            DocumentFormat::from_url("https://example.org/files/report.PDF?x=1"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(DocumentFormat::from_url("https://example.org/"), None);
    }

    #[tokio::test]
    async fn test_detect_file_without_extension_sniffs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan");
        tokio::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).await.unwrap();

        let detected = detect_file_content_type(&path).await;
        assert_eq!(detected.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_detection_is_cached_on_the_request() {
        let http = HttpClient::new(&crate::config::ExtractorConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan");
        tokio::fs::write(&path, b"%PDF-1.4 body").await.unwrap();
        let request = ExtractionRequest::from_file(&path);

        let first = detect_content_type(&request, &http).await;
        tokio::fs::remove_file(&path).await.unwrap();
        let second = detect_content_type(&request, &http).await;

        assert_eq!(first.as_deref(), Some("application/pdf"));
        assert_eq!(second, first);
    }
}
