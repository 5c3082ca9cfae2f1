use anyhow::{bail, Result};

use jargonbuster_core::{Analyzer, ExtractionRequest};

/// Treat `source` as a URL when it has an http(s) scheme, else as a path.
pub fn request_for(source: &str) -> ExtractionRequest {
    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        ExtractionRequest::from_url(source)
    } else {
        ExtractionRequest::from_file(source)
    }
}

pub async fn run(analyzer: &Analyzer, source: &str) -> Result<()> {
    let response = analyzer.extract(&request_for(source)).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(error) = response.error {
        bail!("extraction failed: {error}");
    }
    Ok(())
}
