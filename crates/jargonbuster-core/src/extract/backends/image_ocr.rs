use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::extract::backend::{Backend, BackendError, BackendResult};
use crate::extract::content_type::detect_content_type;
use crate::extract::http::HttpClient;
use crate::extract::request::{ExtractionRequest, ExtractionResponse};
use crate::extract::spellcheck::SpellChecker;
use crate::meta::Meta;

const SERVICE: &str = "vision_ocr";
const SUBSCRIPTION_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrResult {
    language: Option<String>,
    text_angle: Option<f64>,
    orientation: Option<String>,
    #[serde(default)]
    regions: Vec<OcrRegion>,
}

#[derive(Debug, Deserialize)]
struct OcrRegion {
    #[serde(default)]
    lines: Vec<OcrLine>,
}

#[derive(Debug, Deserialize)]
struct OcrLine {
    #[serde(default)]
    words: Vec<OcrWord>,
}

#[derive(Debug, Deserialize)]
struct OcrWord {
    text: String,
}

impl OcrResult {
    /// Lines of spell-corrected words; regions separated by blank lines.
    fn text(&self, spelling: &SpellChecker) -> String {
        let mut out = String::new();
        for region in &self.regions {
            for line in &region.lines {
                let words: Vec<String> = line
                    .words
                    .iter()
                    .map(|w| {
                        let corrected = spelling.correct_word(&w.text);
                        if corrected != w.text {
                            debug!("auto-corrected word: {} -> {}", w.text, corrected);
                        }
                        corrected
                    })
                    .collect();
                out.push_str(&words.join(" "));
                out.push('\n');
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    fn meta(&self) -> Meta {
        let mut meta = Meta::new();
        meta.insert(
            "language".into(),
            self.language.clone().map_or(Value::Null, Value::from),
        );
        meta.insert(
            "text_angle".into(),
            self.text_angle.map_or(Value::Null, Value::from),
        );
        meta.insert(
            "orientation".into(),
            self.orientation.clone().map_or(Value::Null, Value::from),
        );
        meta.insert("source".into(), Value::from("image"));
        meta.insert("extractor".into(), Value::from(SERVICE));
        meta
    }
}

/// Synchronous printed-text recognition for images.
pub struct ImageOcrBackend {
    http: HttpClient,
    endpoint: Option<(String, String)>,
    spelling: Arc<SpellChecker>,
}

impl ImageOcrBackend {
    pub fn new(http: HttpClient, config: &ExtractorConfig, spelling: Arc<SpellChecker>) -> Self {
        let endpoint = match (&config.vision_endpoint, &config.vision_key) {
            (Some(endpoint), Some(key)) => {
                Some((endpoint.trim_end_matches('/').to_string(), key.clone()))
            }
            _ => None,
        };

        Self {
            http,
            endpoint,
            spelling,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

#[async_trait]
impl Backend for ImageOcrBackend {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn can_handle(&self, request: &ExtractionRequest) -> bool {
        if !self.is_configured() {
            debug!("Vision OCR endpoint not configured, skipping");
            return false;
        }

        detect_content_type(request, &self.http)
            .await
            .is_some_and(|ct| ct.contains("image"))
    }

    async fn extract(&self, request: &ExtractionRequest) -> BackendResult<ExtractionResponse> {
        let (endpoint, key) = self
            .endpoint
            .as_ref()
            .ok_or(BackendError::NotConfigured(SERVICE))?;

        info!("Extracting text from image via vision OCR: {} ...", request.source_label());

        let url = format!("{endpoint}/vision/v3.2/ocr?language=unk&detectOrientation=true");
        let builder = self
            .http
            .request(reqwest::Method::POST, &url)?
            .header(SUBSCRIPTION_HEADER, key);

        let builder = if let Some(image_url) = request.url() {
            builder.json(&json!({ "url": image_url }))
        } else {
            let path = request
                .file()
                .ok_or_else(|| BackendError::Unsupported("no image source".to_string()))?;
            let bytes = tokio::fs::read(path).await?;
            builder
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(bytes)
        };

        let result: OcrResult = self
            .http
            .execute(builder, &url)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(ExtractionResponse::new(
            result.text(&self.spelling),
            result.meta(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OcrResult {
        serde_json::from_value(json!({
            "language": "en",
            "textAngle": 0.0,
            "orientation": "Up",
            "regions": [
                {"lines": [
                    {"words": [{"text": "Patient"}, {"text": "hospltal,"}]},
                    {"words": [{"text": "room"}, {"text": "12"}]}
                ]},
                {"lines": [{"words": [{"text": "Discharged"}]}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_text_joins_regions_and_corrects_words() {
        let spelling = SpellChecker::from_frequency_list("hospital 10\npatient 10\n");
        assert_eq!(
            sample().text(&spelling),
            "Patient hospital,\nroom 12\n\nDischarged"
        );
    }

    #[test]
    fn test_meta_fields() {
        let meta = sample().meta();
        assert_eq!(meta["language"], "en");
        assert_eq!(meta["orientation"], "Up");
        assert_eq!(meta["source"], "image");
        assert_eq!(meta["extractor"], "vision_ocr");
    }

    #[tokio::test]
    async fn test_unconfigured_declines() {
        let config = ExtractorConfig::default();
        let backend = ImageOcrBackend::new(
            HttpClient::new(&config).unwrap(),
            &config,
            Arc::new(SpellChecker::empty()),
        );
        assert!(!backend.can_handle(&ExtractionRequest::from_file("scan.png")).await);
    }
}
