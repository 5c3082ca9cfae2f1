//! Turning URLs and files of unknown format into raw text plus metadata.

mod backend;
pub mod backends;
mod content_type;
mod http;
mod request;
mod router;
mod spellcheck;

pub use backend::{Backend, BackendError, BackendResult};
pub use content_type::{detect_content_type, detect_file_content_type, DocumentFormat};
pub use http::{ClientError, ClientResult, HttpClient};
pub use request::{ExtractionRequest, ExtractionResponse};
pub use router::ExtractionRouter;
pub use spellcheck::SpellChecker;
