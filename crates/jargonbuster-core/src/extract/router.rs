use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use super::backend::Backend;
use super::backends::{
    CloudOcrBackend, GenericBackend, ImageOcrBackend, WebArticleBackend, WikipediaBackend,
};
use super::http::{ClientError, HttpClient};
use super::request::{ExtractionRequest, ExtractionResponse};
use super::spellcheck::SpellChecker;
use crate::config::ExtractorConfig;
use crate::meta::record_timing;

/// Dispatches a request to the first backend that claims it.
///
/// A failing specialized backend falls back to the generic backend exactly
/// once; a failing generic backend is final. Routing never returns `Err`.
pub struct ExtractionRouter {
    backends: Vec<Arc<dyn Backend>>,
    generic: Arc<dyn Backend>,
    timeout: Duration,
}

impl ExtractionRouter {
    pub fn new(generic: Arc<dyn Backend>) -> Self {
        Self {
            backends: Vec::new(),
            generic,
            timeout: ExtractorConfig::default().extraction_timeout(),
        }
    }

    /// Append a specialized backend. Earlier backends take priority.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backends.push(backend);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The default chain: wikipedia, web article, cloud OCR, image OCR, generic.
    pub async fn from_config(config: &ExtractorConfig) -> Result<Self, ClientError> {
        let http = HttpClient::new(config)?;

        let spelling = match &config.spelling_dictionary {
            Some(path) => SpellChecker::load(path).await.unwrap_or_else(|e| {
                warn!("Can't load spelling dictionary {}: {}", path.display(), e);
                SpellChecker::empty()
            }),
            None => SpellChecker::empty(),
        };

        let generic = Arc::new(GenericBackend::new(http.clone(), config.tika_url.clone()));

        Ok(Self::new(generic)
            .with_backend(Arc::new(WikipediaBackend::new(http.clone())))
            .with_backend(Arc::new(WebArticleBackend::new(http.clone())))
            .with_backend(Arc::new(CloudOcrBackend::new(http.clone(), config)))
            .with_backend(Arc::new(ImageOcrBackend::new(
                http,
                config,
                Arc::new(spelling),
            )))
            .with_timeout(config.extraction_timeout()))
    }

    /// Backend names in priority order, generic last.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends
            .iter()
            .chain(std::iter::once(&self.generic))
            .map(|b| b.name())
            .collect()
    }

    pub async fn route(&self, request: &ExtractionRequest) -> ExtractionResponse {
        if !request.is_valid() {
            return ExtractionResponse::failure("Extraction request needs either a url or a filename");
        }

        let started = Instant::now();
        let mut response = match tokio::time::timeout(self.timeout, self.dispatch(request)).await {
            Ok(response) => response,
            Err(_) => {
                let msg = format!(
                    "Extraction of '{}' timed out after {}s",
                    request.source_label(),
                    self.timeout.as_secs()
                );
                error!("{}", msg);
                ExtractionResponse::failure(msg)
            }
        };

        record_timing(&mut response.meta, "router", started.elapsed().as_millis());
        response
    }

    async fn select(&self, request: &ExtractionRequest) -> Option<&Arc<dyn Backend>> {
        for backend in &self.backends {
            if backend.can_handle(request).await {
                return Some(backend);
            }
        }
        None
    }

    async fn dispatch(&self, request: &ExtractionRequest) -> ExtractionResponse {
        if let Some(backend) = self.select(request).await {
            info!(
                "Extracting '{}' via {} backend",
                request.source_label(),
                backend.name()
            );

            match run(backend.as_ref(), request).await {
                Ok(response) => return response,
                Err(reason) => warn!(
                    "Error using {} backend, falling back to {}: {}",
                    backend.name(),
                    self.generic.name(),
                    reason
                ),
            }
        } else {
            info!(
                "Extracting '{}' via {} backend",
                request.source_label(),
                self.generic.name()
            );
        }

        match run(self.generic.as_ref(), request).await {
            Ok(response) => response,
            Err(reason) => {
                let msg = format!(
                    "Error extracting text via {} backend: '{}'",
                    self.generic.name(),
                    reason
                );
                error!("{}", msg);
                ExtractionResponse::failure(msg)
            }
        }
    }
}

/// Run one backend, folding error responses into `Err`.
async fn run(backend: &dyn Backend, request: &ExtractionRequest) -> Result<ExtractionResponse, String> {
    match backend.extract(request).await {
        Ok(response) => match response.error {
            Some(reason) => Err(reason),
            None => Ok(response),
        },
        Err(e) => Err(e.to_string()),
    }
}
