use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Process-wide configuration for extraction backends and enrichment services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            extractor: ExtractorConfig::from_env(),
            enrichment: EnrichmentConfig::from_env(),
        }
    }
}

/// Settings shared by the extraction backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
    /// Bound for content-type probes issued from `can_handle`
    pub probe_timeout_seconds: u64,
    /// Bound for a whole routed extraction, fallback included
    pub extraction_timeout_seconds: u64,
    pub user_agent: Option<String>,

    /// Document server used by the generic backend; local decoding when unset
    pub tika_url: Option<String>,

    pub vision_endpoint: Option<String>,
    pub vision_key: Option<String>,

    pub ocr_url: Option<String>,
    pub ocr_app_id: Option<String>,
    pub ocr_password: Option<String>,
    pub ocr_poll_interval_ms: u64,
    /// Upper bound on task status polls before the OCR job is abandoned
    pub ocr_max_polls: u32,

    /// Frequency dictionary (`term count` per line) for OCR spell correction
    pub spelling_dictionary: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 10,
            request_timeout_seconds: 15,
            probe_timeout_seconds: 5,
            extraction_timeout_seconds: 120,
            user_agent: None,
            tika_url: None,
            vision_endpoint: None,
            vision_key: None,
            ocr_url: None,
            ocr_app_id: None,
            ocr_password: None,
            ocr_poll_interval_ms: 1000,
            ocr_max_polls: 120,
            spelling_dictionary: None,
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            connect_timeout_seconds: env_parse(
                "JARGONBUSTER_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_seconds,
            ),
            request_timeout_seconds: env_parse(
                "JARGONBUSTER_HTTP_TIMEOUT_SECS",
                defaults.request_timeout_seconds,
            ),
            probe_timeout_seconds: env_parse(
                "JARGONBUSTER_PROBE_TIMEOUT_SECS",
                defaults.probe_timeout_seconds,
            ),
            extraction_timeout_seconds: env_parse(
                "JARGONBUSTER_EXTRACTION_TIMEOUT_SECS",
                defaults.extraction_timeout_seconds,
            ),
            user_agent: env_string("JARGONBUSTER_USER_AGENT"),
            tika_url: env_string("JARGONBUSTER_TIKA_URL"),
            vision_endpoint: env_string("JARGONBUSTER_VISION_ENDPOINT"),
            vision_key: env_string("JARGONBUSTER_VISION_KEY"),
            ocr_url: env_string("JARGONBUSTER_OCR_URL"),
            ocr_app_id: env_string("JARGONBUSTER_OCR_APP_ID"),
            ocr_password: env_string("JARGONBUSTER_OCR_PASSWORD"),
            ocr_poll_interval_ms: env_parse(
                "JARGONBUSTER_OCR_POLL_INTERVAL_MS",
                defaults.ocr_poll_interval_ms,
            ),
            ocr_max_polls: env_parse("JARGONBUSTER_OCR_MAX_POLLS", defaults.ocr_max_polls),
            spelling_dictionary: env_string("JARGONBUSTER_SPELLING_DICTIONARY").map(PathBuf::from),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_seconds)
    }

    pub fn ocr_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ocr_poll_interval_ms)
    }
}

/// Settings for externally backed enrichment stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub health_endpoint: Option<String>,
    pub health_key: Option<String>,
    /// Maximum characters per service call; longer text is chunked
    pub health_max_chunk: usize,
    pub health_language: String,
    pub request_timeout_seconds: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            health_endpoint: None,
            health_key: None,
            health_max_chunk: 5120,
            health_language: "en".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl EnrichmentConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            health_endpoint: env_string("JARGONBUSTER_HEALTH_ENDPOINT"),
            health_key: env_string("JARGONBUSTER_HEALTH_KEY"),
            health_max_chunk: env_parse("JARGONBUSTER_HEALTH_MAX_CHUNK", defaults.health_max_chunk)
                .max(1),
            health_language: env_string("JARGONBUSTER_HEALTH_LANGUAGE")
                .unwrap_or(defaults.health_language),
            request_timeout_seconds: env_parse(
                "JARGONBUSTER_HEALTH_TIMEOUT_SECS",
                defaults.request_timeout_seconds,
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_string(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
