use anyhow::Result;
use serde_json::json;

use jargonbuster_core::{default_registry, Config, StageToolkit};

pub fn run(config: &Config) -> Result<()> {
    let registry = default_registry(&StageToolkit::from_config(&config.enrichment))?;

    let listing: Vec<serde_json::Value> = registry
        .canonical_names()
        .filter_map(|name| {
            let definition = registry.definition(name)?;
            Some(json!({
                "name": name,
                "description": definition.description,
                "aliases": registry.aliases_of(name).collect::<Vec<_>>(),
                "stages": definition.stages.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }))
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}
