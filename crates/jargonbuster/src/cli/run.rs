use anyhow::Result;
use tracing::debug;

use super::{RunOptions, SourceArgs};
use jargonbuster_core::meta::Meta;
use jargonbuster_core::{AnalysisRequest, Analyzer, PipelineSettings};

pub fn settings_from(options: RunOptions) -> PipelineSettings {
    let mut settings = PipelineSettings::default();
    if !options.enable.is_empty() {
        settings = settings.enable(options.enable);
    }
    if !options.disable.is_empty() {
        settings = settings.disable(options.disable);
    }
    if options.clean_only {
        settings = settings.clean_only();
    }
    for (key, value) in options.settings {
        settings = settings.with(key, value);
    }
    settings
}

pub fn request_from(source: SourceArgs, options: RunOptions) -> AnalysisRequest {
    let meta: Meta = options.meta.iter().cloned().collect();
    AnalysisRequest {
        text: source.text,
        url: source.url,
        file: source.file,
        meta,
        settings: settings_from(options),
    }
}

pub async fn run(
    analyzer: &Analyzer,
    pipeline: &str,
    source: SourceArgs,
    options: RunOptions,
) -> Result<()> {
    let request = request_from(source, options);
    debug!("Running '{}' with settings {:?}", pipeline, request.settings);

    let response = analyzer.analyze(pipeline, request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
