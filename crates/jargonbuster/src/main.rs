use anyhow::Result;
use clap::Parser;

use jargonbuster::cli::{self, Cli, Commands};
use jargonbuster_core::{Analyzer, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let config = Config::from_env();

    match args.command {
        Commands::Pipelines => cli::pipelines::run(&config),
        Commands::Extract { source } => {
            let analyzer = Analyzer::from_config(&config).await?;
            cli::extract::run(&analyzer, &source).await
        }
        Commands::Run {
            pipeline,
            source,
            options,
        } => {
            let analyzer = Analyzer::from_config(&config).await?;
            cli::run::run(&analyzer, &pipeline, source, options).await
        }
    }
}
