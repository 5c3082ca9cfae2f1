use async_trait::async_trait;
use thiserror::Error;

use super::http::ClientError;
use super::request::{ExtractionRequest, ExtractionResponse};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Unsupported input: {0}")]
    Unsupported(String),
    #[error("Backend not configured: {0}")]
    NotConfigured(&'static str),
    #[error("HTTP error: {0}")]
    Client(#[from] ClientError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Service error: {0}")]
    Service(String),
    #[error("Gave up waiting for {service} after {attempts} polls")]
    PollingExhausted { service: &'static str, attempts: u32 },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Capability contract of an extraction backend.
///
/// `can_handle` must stay cheap: extension checks, sniffing, or at most a
/// bounded content-type probe. A failed extraction may either return `Err`
/// or an `Ok` response carrying `error`; the router treats both alike.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn can_handle(&self, request: &ExtractionRequest) -> bool;

    async fn extract(&self, request: &ExtractionRequest) -> BackendResult<ExtractionResponse>;
}
