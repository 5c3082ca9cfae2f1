use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::read_source;
use crate::config::ExtractorConfig;
use crate::extract::backend::{Backend, BackendError, BackendResult};
use crate::extract::content_type::{detect_content_type, DocumentFormat};
use crate::extract::http::HttpClient;
use crate::extract::request::{ExtractionRequest, ExtractionResponse};
use crate::meta::{merged, Meta};

const SERVICE: &str = "cloud_ocr";
const FILE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "bmp", "tiff", "png", "gif"];
const FAILED_STATUSES: &[&str] = &["ProcessingFailed", "NotEnoughCredits", "Deleted"];

#[derive(Debug, Clone)]
struct Credentials {
    base_url: String,
    app_id: String,
    password: Option<String>,
}

/// Job-based cloud OCR: submit the image, poll the task, download the text.
///
/// Polling stops after `max_polls` attempts spaced by `poll_interval`.
pub struct CloudOcrBackend {
    http: HttpClient,
    credentials: Option<Credentials>,
    poll_interval: Duration,
    max_polls: u32,
}

impl CloudOcrBackend {
    pub fn new(http: HttpClient, config: &ExtractorConfig) -> Self {
        let credentials = match (&config.ocr_url, &config.ocr_app_id) {
            (Some(url), Some(app_id)) => Some(Credentials {
                base_url: url.trim_end_matches('/').to_string(),
                app_id: app_id.clone(),
                password: config.ocr_password.clone(),
            }),
            _ => None,
        };

        Self {
            http,
            credentials,
            poll_interval: config.ocr_poll_interval(),
            max_polls: config.ocr_max_polls,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn submit(&self, creds: &Credentials, image: Vec<u8>) -> BackendResult<String> {
        let url = format!(
            "{}/v2/processImage?language=english,german&profile=textExtraction&exportformat=txt",
            creds.base_url
        );
        let builder = self
            .http
            .request(reqwest::Method::POST, &url)?
            .basic_auth(&creds.app_id, creds.password.as_deref())
            .body(image);

        let body: Value = self
            .http
            .execute(builder, &url)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        body.get("taskId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BackendError::InvalidResponse("no taskId in submit response".into()))
    }

    async fn wait_for_result(&self, creds: &Credentials, task_id: &str) -> BackendResult<String> {
        let url = format!("{}/v2/getTaskStatus?taskId={}", creds.base_url, task_id);

        for attempt in 1..=self.max_polls {
            tokio::time::sleep(self.poll_interval).await;

            let builder = self
                .http
                .request(reqwest::Method::GET, &url)?
                .basic_auth(&creds.app_id, creds.password.as_deref());
            let status: Value = self
                .http
                .execute(builder, &url)
                .await?
                .json()
                .await
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

            if let Some(download) = result_url(&status)? {
                debug!("OCR task {} finished after {} polls", task_id, attempt);
                return Ok(download);
            }
        }

        Err(BackendError::PollingExhausted {
            service: SERVICE,
            attempts: self.max_polls,
        })
    }
}

/// The first result URL of a task status, `None` while the task is running.
fn result_url(status: &Value) -> BackendResult<Option<String>> {
    if let Some(state) = status.get("status").and_then(Value::as_str) {
        if FAILED_STATUSES.contains(&state) {
            return Err(BackendError::Service(format!("OCR task ended with '{state}'")));
        }
    }

    Ok(status
        .get("resultUrls")
        .and_then(Value::as_array)
        .and_then(|urls| urls.first())
        .and_then(Value::as_str)
        .map(str::to_string))
}

#[async_trait]
impl Backend for CloudOcrBackend {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn can_handle(&self, request: &ExtractionRequest) -> bool {
        if !self.is_configured() {
            debug!("Cloud OCR has no credentials configured, skipping");
            return false;
        }

        if request.url().is_some() {
            return detect_content_type(request, &self.http)
                .await
                .is_some_and(|ct| ct.contains("image"));
        }

        request
            .file()
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .is_some_and(|e| FILE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
    }

    async fn extract(&self, request: &ExtractionRequest) -> BackendResult<ExtractionResponse> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(BackendError::NotConfigured(SERVICE))?;

        info!("Extracting text from image via cloud OCR: {} ...", request.source_label());

        let (image, content_type) = read_source(request, &self.http).await?;
        if let Some(ct) = content_type.as_deref() {
            if DocumentFormat::from_mime(ct).is_some_and(|f| !f.is_image()) {
                warn!("Cloud OCR received non-image content type '{}'", ct);
            }
        }

        let task_id = self.submit(creds, image).await?;
        let download = self.wait_for_result(creds, &task_id).await?;
        let text = self.http.get_text(&download).await?;

        let mut meta = Meta::new();
        meta.insert("source".into(), Value::from("image"));
        meta.insert("extractor".into(), Value::from(SERVICE));

        Ok(ExtractionResponse::new(text, merged(&request.meta, meta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured() -> ExtractorConfig {
        ExtractorConfig {
            ocr_url: Some("https://ocr.example.com/".into()),
            ocr_app_id: Some("app".into()),
            ocr_password: Some("secret".into()),
            ..ExtractorConfig::default()
        }
    }

    fn backend(config: &ExtractorConfig) -> CloudOcrBackend {
        CloudOcrBackend::new(HttpClient::new(config).unwrap(), config)
    }

    #[tokio::test]
    async fn test_unconfigured_declines() {
        let backend = backend(&ExtractorConfig::default());
        assert!(!backend.can_handle(&ExtractionRequest::from_file("scan.png")).await);
    }

    #[tokio::test]
    async fn test_handles_image_extensions() {
        let backend = backend(&configured());
        assert!(backend.is_configured());
        assert!(backend.can_handle(&ExtractionRequest::from_file("scan.PNG")).await);
        assert!(backend.can_handle(&ExtractionRequest::from_file("scan.tiff")).await);
        assert!(!backend.can_handle(&ExtractionRequest::from_file("scan.pdf")).await);
    }

    #[test]
    fn test_result_url_states() {
        assert_eq!(result_url(&json!({"status": "InProgress"})).unwrap(), None);
        assert_eq!(
            result_url(&json!({"status": "Completed", "resultUrls": ["https://r/1", "https://r/2"]}))
                .unwrap()
                .as_deref(),
            Some("https://r/1")
        );
        assert!(matches!(
            result_url(&json!({"status": "ProcessingFailed"})),
            Err(BackendError::Service(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_extract_fails() {
        let backend = backend(&ExtractorConfig::default());
        let result = backend.extract(&ExtractionRequest::from_file("scan.png")).await;
        assert!(matches!(result, Err(BackendError::NotConfigured(_))));
    }
}
