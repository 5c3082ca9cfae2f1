//! Health entity enrichment through an external text analytics service.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use super::text::chunk_chars;
use crate::config::EnrichmentConfig;
use crate::extract::{ClientError, HttpClient};
use crate::pipeline::{
    ActiveStages, Annotation, Applied, DocumentState, HealthEntities, HealthEntity, Stage,
    StageError, StageId,
};

/// Remote service that finds health entities in text.
#[async_trait]
pub trait EnrichmentService: Send + Sync {
    fn service_id(&self) -> &str;

    /// Longest text accepted in one document.
    fn max_chunk_chars(&self) -> usize;

    /// Entities per input document, offsets relative to that document.
    async fn analyze(&self, documents: &[String]) -> Result<Vec<Vec<HealthEntity>>, StageError>;
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    documents: Vec<HealthDocument>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct HealthDocument {
    id: String,
    #[serde(default)]
    entities: Vec<HealthEntity>,
}

/// Text analytics for health over HTTP.
pub struct HttpHealthService {
    http: HttpClient,
    endpoint: String,
    key: Option<String>,
    language: String,
    max_chunk: usize,
}

impl HttpHealthService {
    const PATH: &'static str = "/text/analytics/v3.2-preview.1/entities/health";

    /// `None` when no endpoint is configured.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Option<Self>, ClientError> {
        let Some(endpoint) = config.health_endpoint.as_deref() else {
            return Ok(None);
        };
        let timeout = config.request_timeout();
        let http = HttpClient::with_timeouts(timeout, timeout, timeout, None)?;

        Ok(Some(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: config.health_key.clone(),
            language: config.health_language.clone(),
            max_chunk: config.health_max_chunk.max(1),
        }))
    }

    fn body(&self, documents: &[String]) -> serde_json::Value {
        let documents: Vec<serde_json::Value> = documents
            .iter()
            .enumerate()
            .map(|(i, text)| json!({"language": self.language, "id": i.to_string(), "text": text}))
            .collect();
        json!({ "documents": documents })
    }
}

#[async_trait]
impl EnrichmentService for HttpHealthService {
    fn service_id(&self) -> &str {
        "text_analytics_health"
    }

    fn max_chunk_chars(&self) -> usize {
        self.max_chunk
    }

    async fn analyze(&self, documents: &[String]) -> Result<Vec<Vec<HealthEntity>>, StageError> {
        let url = format!("{}{}", self.endpoint, Self::PATH);
        let enrichment = |e: ClientError| StageError::Enrichment(e.to_string());

        let mut builder = self
            .http
            .request(reqwest::Method::POST, &url)
            .map_err(enrichment)?
            .json(&self.body(documents));
        if let Some(key) = &self.key {
            builder = builder.header("Ocp-Apim-Subscription-Key", key);
        }

        let response: HealthResponse = self
            .http
            .execute(builder, &url)
            .await
            .map_err(enrichment)?
            .json()
            .await
            .map_err(|e| StageError::Enrichment(e.to_string()))?;

        if !response.errors.is_empty() {
            warn!("Health service reported {} document errors", response.errors.len());
        }

        let mut per_document = vec![Vec::new(); documents.len()];
        for document in response.documents {
            match document.id.parse::<usize>() {
                Ok(i) if i < per_document.len() => per_document[i] = document.entities,
                _ => warn!("Ignoring unknown document id '{}'", document.id),
            }
        }
        Ok(per_document)
    }
}

/// Shift chunk-relative offsets and sort entities by category.
pub fn group_entities(chunks: Vec<Vec<HealthEntity>>, max_chunk: usize) -> HealthEntities {
    let mut grouped = HealthEntities::default();
    for (i, entities) in chunks.into_iter().enumerate() {
        for mut entity in entities {
            entity.offset += i * max_chunk;
            match entity.category.as_str() {
                "Diagnosis" => grouped.diagnosis.push(entity),
                "SymptomOrSign" => grouped.symptoms.push(entity),
                "TreatmentName" => grouped.treatments.push(entity),
                "ExaminationName" => grouped.examinations.push(entity),
                _ => {}
            }
        }
    }
    grouped
}

/// Health entity stage; empty when no service is configured or it fails.
pub struct HealthAnalyzer {
    service: Option<Arc<dyn EnrichmentService>>,
}

impl HealthAnalyzer {
    pub fn new(service: Option<Arc<dyn EnrichmentService>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Stage for HealthAnalyzer {
    fn id(&self) -> StageId {
        StageId::HealthAnalyzer
    }

    fn apply(&self, _state: &mut DocumentState, _active: &ActiveStages) -> Result<Applied, StageError> {
        if self.service.is_none() {
            warn!("No endpoint for health analysis; section will be empty");
            return Ok(Applied::Ready(Annotation::Empty));
        }
        Ok(Applied::Deferred)
    }

    async fn compute_annotation(&self, state: &DocumentState) -> Result<Annotation, StageError> {
        let Some(service) = &self.service else {
            return Ok(Annotation::Empty);
        };

        let max_chunk = service.max_chunk_chars();
        let chunks = chunk_chars(state.text(), max_chunk);
        if chunks.is_empty() {
            return Ok(Annotation::Empty);
        }
        debug!(
            "Sending {} chunks to {}",
            chunks.len(),
            service.service_id()
        );

        match service.analyze(&chunks).await {
            Ok(results) => Ok(Annotation::Health(group_entities(results, max_chunk))),
            Err(StageError::Cancelled) => Err(StageError::Cancelled),
            Err(e) => {
                warn!("Health analysis failed: {}", e);
                Ok(Annotation::Empty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{LanguageResources, PipelineSettings};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeService {
        max_chunk: usize,
        fail: bool,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl FakeService {
        fn new(max_chunk: usize, fail: bool) -> Self {
            Self {
                max_chunk,
                fail,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EnrichmentService for FakeService {
        fn service_id(&self) -> &str {
            "fake"
        }

        fn max_chunk_chars(&self) -> usize {
            self.max_chunk
        }

        async fn analyze(&self, documents: &[String]) -> Result<Vec<Vec<HealthEntity>>, StageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().extend(documents.iter().cloned());
            if self.fail {
                return Err(StageError::Enrichment("service down".into()));
            }
            Ok(documents
                .iter()
                .map(|doc| {
                    doc.find("fever")
                        .map(|offset| HealthEntity {
                            text: "fever".into(),
                            category: "SymptomOrSign".into(),
                            offset,
                            length: 5,
                            confidence_score: Some(0.9),
                        })
                        .into_iter()
                        .collect()
                })
                .collect())
        }
    }

    fn state(text: &str) -> DocumentState {
        DocumentState::new(text, PipelineSettings::default(), Arc::new(LanguageResources::default()))
    }

    fn entity(category: &str, offset: usize) -> HealthEntity {
        HealthEntity {
            text: "x".into(),
            category: category.into(),
            offset,
            length: 1,
            confidence_score: None,
        }
    }

    #[test]
    fn test_group_entities_reoffsets_chunks() {
        let grouped = group_entities(
            vec![
                vec![entity("Diagnosis", 3)],
                vec![entity("TreatmentName", 1), entity("Other", 0)],
                vec![entity("ExaminationName", 2)],
            ],
            10,
        );

        assert_eq!(grouped.diagnosis[0].offset, 3);
        assert_eq!(grouped.treatments[0].offset, 11);
        assert_eq!(grouped.examinations[0].offset, 22);
        assert!(grouped.symptoms.is_empty());
    }

    #[tokio::test]
    async fn test_chunked_text_is_sent_in_one_call() {
        let service = Arc::new(FakeService::new(8, false));
        let stage = HealthAnalyzer::new(Some(service.clone()));
        let doc = state("a mild fever lasted");

        let annotation = stage.compute_annotation(&doc).await.unwrap();

        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *service.seen.lock().unwrap(),
            vec!["a mild f", "ever las", "ted"]
        );
        // the chunk boundary splits the word, so nothing is found
        assert!(annotation.is_empty());
    }

    #[tokio::test]
    async fn test_entities_get_document_offsets() {
        let service = Arc::new(FakeService::new(12, false));
        let stage = HealthAnalyzer::new(Some(service));
        let doc = state("no symptoms. fever today");

        let annotation = stage.compute_annotation(&doc).await.unwrap();

        let Annotation::Health(health) = annotation else {
            panic!("expected health annotation");
        };
        assert_eq!(health.symptoms[0].offset, 13);
        assert_eq!(&doc.text()[13..18], "fever");
    }

    #[tokio::test]
    async fn test_service_failure_degrades_to_empty() {
        let service = Arc::new(FakeService::new(100, true));
        let stage = HealthAnalyzer::new(Some(service));

        let annotation = stage.compute_annotation(&state("fever")).await.unwrap();
        assert!(annotation.is_empty());
    }

    #[test]
    fn test_unconfigured_stage_attaches_empty() {
        let mut doc = state("fever");
        let applied = HealthAnalyzer::new(None)
            .apply(&mut doc, &ActiveStages::default())
            .unwrap();
        assert!(matches!(applied, Applied::Ready(Annotation::Empty)));
    }

    #[test]
    fn test_unconfigured_service_is_none() {
        let service = HttpHealthService::from_config(&EnrichmentConfig::default()).unwrap();
        assert!(service.is_none());
    }

    #[test]
    fn test_request_body_numbers_documents() {
        let config = EnrichmentConfig {
            health_endpoint: Some("http://localhost:5000/".into()),
            ..EnrichmentConfig::default()
        };
        let service = HttpHealthService::from_config(&config).unwrap().unwrap();
        let body = service.body(&["one".into(), "two".into()]);

        assert_eq!(service.endpoint, "http://localhost:5000");
        assert_eq!(body["documents"][1], json!({"language": "en", "id": "1", "text": "two"}));
    }
}
