pub mod extract;
pub mod pipelines;
pub mod run;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jgb",
    about = "Turn documents into plain-language analysis reports",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract text and metadata from a URL or file
    Extract {
        /// URL (http/https) or local file path
        source: String,
    },
    /// Run a pipeline over text, a URL or a file
    Run {
        /// Pipeline name or alias
        #[arg(default_value = "default")]
        pipeline: String,
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        options: RunOptions,
    },
    /// List pipelines, their aliases and stage order
    Pipelines,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Analyze this text directly
    #[arg(long)]
    pub text: Option<String>,
    /// Extract the document at this URL first
    #[arg(long)]
    pub url: Option<String>,
    /// Extract this local file first
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct RunOptions {
    /// Run only these stages (comma separated); wins over --disable
    #[arg(long, value_delimiter = ',')]
    pub enable: Vec<String>,
    /// Skip these stages (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub disable: Vec<String>,
    /// Only run the cleaner
    #[arg(long)]
    pub clean_only: bool,
    /// Stage setting passed through to the pipeline
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, Value)>,
    /// Source metadata entry
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub meta: Vec<(String, Value)>,
}

/// `key=value`; values that parse as JSON keep their type, others are strings.
pub fn parse_key_value(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value_types() {
        assert_eq!(
            parse_key_value("summary_sentences=3").unwrap(),
            ("summary_sentences".to_string(), Value::from(3))
        );
        assert_eq!(
            parse_key_value("language_model=en_core").unwrap(),
            ("language_model".to_string(), Value::from("en_core"))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_run_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["jgb", "run"]).is_err());
        assert!(Cli::try_parse_from(["jgb", "run", "--text", "a", "--url", "http://x"]).is_err());
        assert!(Cli::try_parse_from(["jgb", "run", "lite", "--text", "a"]).is_ok());
    }

    #[test]
    fn test_enable_splits_on_commas() {
        let cli = Cli::try_parse_from(["jgb", "run", "--text", "a", "--enable", "cleaner,tagger"])
            .unwrap();
        let Commands::Run {
            pipeline, options, ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(pipeline, "default");
        assert_eq!(options.enable, vec!["cleaner", "tagger"]);
    }
}
