//! Request-level facade: extraction, pipeline lookup and execution.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{ExtractionRequest, ExtractionResponse, ExtractionRouter};
use crate::meta::{merged, Meta};
use crate::pipeline::{CancellationFlag, PipelineCache, PipelineSettings, StageExecutor};
use crate::stages::{default_registry, StageToolkit};

/// One analysis request: inline text, a URL or a local file.
///
/// When several sources are given, text wins over url, url over file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    pub text: Option<String>,
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub meta: Meta,
    pub settings: PipelineSettings,
}

impl AnalysisRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    fn extraction_request(&self) -> Option<ExtractionRequest> {
        let request = match (&self.url, &self.file) {
            (Some(url), _) => ExtractionRequest::from_url(url.clone()),
            (None, Some(file)) => ExtractionRequest::from_file(file.clone()),
            (None, None) => return None,
        };
        Some(request.with_meta(self.meta.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub text: String,
    pub meta: Meta,
}

/// Owns the extraction router, the pipeline cache and the executor.
pub struct Analyzer {
    router: ExtractionRouter,
    cache: PipelineCache,
    executor: StageExecutor,
}

impl Analyzer {
    pub fn new(router: ExtractionRouter, cache: PipelineCache) -> Self {
        Self {
            router,
            cache,
            executor: StageExecutor::new(),
        }
    }

    /// Default backends and built-in pipelines wired from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let router = ExtractionRouter::from_config(&config.extractor).await?;
        let toolkit = StageToolkit::from_config(&config.enrichment);
        let cache = PipelineCache::new(default_registry(&toolkit)?);
        Ok(Self::new(router, cache))
    }

    pub fn router(&self) -> &ExtractionRouter {
        &self.router
    }

    pub fn cache(&self) -> &PipelineCache {
        &self.cache
    }

    /// Run the extraction router alone.
    pub async fn extract(&self, request: &ExtractionRequest) -> ExtractionResponse {
        self.router.route(request).await
    }

    pub async fn analyze(&self, pipeline: &str, request: AnalysisRequest) -> Result<AnalysisResponse> {
        self.analyze_cancellable(pipeline, request, &CancellationFlag::new())
            .await
    }

    pub async fn analyze_cancellable(
        &self,
        pipeline: &str,
        request: AnalysisRequest,
        cancel: &CancellationFlag,
    ) -> Result<AnalysisResponse> {
        let pipeline = self
            .cache
            .create_with(pipeline, request.settings.language_model())
            .await?;

        let (text, meta) = match &request.text {
            Some(text) => (text.clone(), request.meta.clone()),
            None => {
                let Some(extraction) = request.extraction_request() else {
                    return Err(Error::InvalidRequest(
                        "one of text, url or file is required".to_string(),
                    ));
                };
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled(pipeline.name().to_string()));
                }

                let response = self.router.route(&extraction).await;
                if let Some(reason) = response.error {
                    warn!("Extraction failed for '{}': {}", extraction.source_label(), reason);
                    return Err(Error::Extraction {
                        source_label: extraction.source_label(),
                        reason,
                    });
                }
                info!(
                    "Extracted {} characters from '{}'",
                    response.text.chars().count(),
                    extraction.source_label()
                );
                (response.text, merged(&request.meta, response.meta))
            }
        };

        let output = self
            .executor
            .execute_cancellable(&pipeline, &text, &meta, request.settings, cancel)
            .await?;

        Ok(AnalysisResponse {
            text: output.text,
            meta: output.meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Backend, BackendError, BackendResult};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StaticBackend {
        text: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Backend for StaticBackend {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn can_handle(&self, _request: &ExtractionRequest) -> bool {
            true
        }

        async fn extract(&self, request: &ExtractionRequest) -> BackendResult<ExtractionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some(text) = self.text else {
                return Err(BackendError::Unsupported("nothing here".into()));
            };
            let mut meta = Meta::new();
            meta.insert("Content-Type".into(), Value::from("text/plain"));
            meta.insert("source".into(), Value::from(request.source_label()));
            Ok(ExtractionResponse::new(text.to_string(), meta))
        }
    }

    fn analyzer(text: Option<&'static str>) -> (Analyzer, Arc<StaticBackend>) {
        let backend = Arc::new(StaticBackend {
            text,
            calls: AtomicUsize::new(0),
        });
        let router = ExtractionRouter::new(backend.clone());
        let cache = PipelineCache::new(default_registry(&StageToolkit::default()).unwrap());
        (Analyzer::new(router, cache), backend)
    }

    #[tokio::test]
    async fn test_clean_only_text_round_trip() {
        let (analyzer, backend) = analyzer(None);
        let request = AnalysisRequest::from_text("Hello world. This helps.")
            .with_settings(PipelineSettings::default().enable(["cleaner"]));

        let response = analyzer.analyze("default", request).await.unwrap();

        assert_eq!(response.text, "Hello world. This helps.");
        assert_eq!(response.meta["pipeline"], json!(["cleaner"]));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_url_is_extracted_then_analyzed() {
        let (analyzer, backend) = analyzer(Some("Knee pain is common. Rest helps the knee."));
        let request = AnalysisRequest::from_url("https://example.org/knee");

        let response = analyzer.analyze("lite", request).await.unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.meta["document_type"], json!("text/plain"));
        assert_eq!(response.meta["source"], json!("https://example.org/knee"));
        assert!(response.meta["timed"].get("router").is_some());
        assert!(response.meta["timed"].get("executor").is_some());
        assert!(response.meta["summaryText"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_extraction_failure_is_a_request_error() {
        let (analyzer, _) = analyzer(None);
        let err = analyzer
            .analyze("lite", AnalysisRequest::from_url("https://example.org/empty"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Extraction { ref source_label, .. } if source_label == "https://example.org/empty"));
    }

    #[tokio::test]
    async fn test_unknown_pipeline() {
        let (analyzer, _) = analyzer(None);
        let err = analyzer
            .analyze("nope", AnalysisRequest::from_text("Text."))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PipelineNotFound { ref name } if name == "nope"));
    }

    #[tokio::test]
    async fn test_request_without_source_is_invalid() {
        let (analyzer, _) = analyzer(None);
        let err = analyzer
            .analyze("lite", AnalysisRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_request_shape_deserializes() {
        let request: AnalysisRequest = serde_json::from_value(json!({
            "url": "https://example.org",
            "meta": {"lang": "de"},
            "settings": {"cleanOnly": true, "summary_sentences": 3}
        }))
        .unwrap();

        assert_eq!(request.url.as_deref(), Some("https://example.org"));
        assert!(request.settings.clean_only);
        assert_eq!(request.settings.get_usize("summary_sentences"), Some(3));
    }
}
