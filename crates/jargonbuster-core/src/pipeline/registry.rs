use std::collections::BTreeMap;
use std::sync::Arc;

use super::definition::{Pipeline, PipelineDefinition};
use super::resources::DEFAULT_LANGUAGE_MODEL;
use crate::error::{Error, Result};

/// Options applied when a pipeline is first built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub language_model: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            language_model: DEFAULT_LANGUAGE_MODEL.to_string(),
        }
    }
}

pub type PipelineFactory =
    Arc<dyn Fn(&PipelineDefinition, &BuildOptions) -> Result<Pipeline> + Send + Sync>;

struct Entry {
    definition: PipelineDefinition,
    factory: PipelineFactory,
}

/// Canonical pipeline names mapped to factories, plus an alias table.
#[derive(Default)]
pub struct PipelineRegistry {
    entries: BTreeMap<String, Entry>,
    aliases: BTreeMap<String, String>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: PipelineDefinition, factory: PipelineFactory) {
        self.entries.insert(
            definition.name.clone(),
            Entry {
                definition,
                factory,
            },
        );
    }

    #[must_use]
    pub fn with_pipeline(mut self, definition: PipelineDefinition, factory: PipelineFactory) -> Self {
        self.register(definition, factory);
        self
    }

    pub fn alias(&mut self, alias: impl Into<String>, canonical: &str) -> Result<()> {
        if !self.entries.contains_key(canonical) {
            return Err(Error::PipelineNotFound {
                name: canonical.to_string(),
            });
        }
        self.aliases.insert(alias.into(), canonical.to_string());
        Ok(())
    }

    /// Canonical name for a name or alias.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some((canonical, _)) = self.entries.get_key_value(name) {
            return Some(canonical.as_str());
        }
        self.aliases.get(name).map(String::as_str)
    }

    pub fn definition(&self, name: &str) -> Option<&PipelineDefinition> {
        let canonical = self.resolve(name)?;
        self.entries.get(canonical).map(|e| &e.definition)
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn aliases_of<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases
            .iter()
            .filter(move |(_, target)| target.as_str() == canonical)
            .map(|(alias, _)| alias.as_str())
    }

    /// Build a fresh pipeline. Callers wanting reuse go through the cache.
    pub fn build(&self, name: &str, options: &BuildOptions) -> Result<Pipeline> {
        let canonical = self.resolve(name).ok_or_else(|| Error::PipelineNotFound {
            name: name.to_string(),
        })?;
        let entry = self
            .entries
            .get(canonical)
            .ok_or_else(|| Error::PipelineNotFound {
                name: name.to_string(),
            })?;

        (entry.factory)(&entry.definition, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::resources::LanguageResources;
    use crate::pipeline::stage_id::StageId;

    fn empty_factory() -> PipelineFactory {
        Arc::new(|definition: &PipelineDefinition, options: &BuildOptions| {
            Pipeline::new(
                definition,
                Vec::new(),
                Arc::new(LanguageResources::load(&options.language_model)),
            )
        })
    }

    fn registry() -> PipelineRegistry {
        let mut registry = PipelineRegistry::new()
            .with_pipeline(PipelineDefinition::new("empty", Vec::new()).unwrap(), empty_factory());
        registry.alias("nothing", "empty").unwrap();
        registry
    }

    #[test]
    fn test_alias_resolution() {
        let registry = registry();
        assert_eq!(registry.resolve("nothing"), Some("empty"));
        assert_eq!(registry.resolve("empty"), Some("empty"));
        assert_eq!(registry.resolve("missing"), None);
        assert_eq!(registry.aliases_of("empty").collect::<Vec<_>>(), vec!["nothing"]);
    }

    #[test]
    fn test_alias_to_unknown_pipeline_fails() {
        let mut registry = registry();
        assert!(matches!(
            registry.alias("x", "missing"),
            Err(Error::PipelineNotFound { .. })
        ));
    }

    #[test]
    fn test_build_passes_language_model() {
        let options = BuildOptions {
            language_model: "de".into(),
        };
        let pipeline = registry().build("nothing", &options).unwrap();
        assert_eq!(pipeline.name(), "empty");
        assert_eq!(pipeline.resources().language_model, "de");
    }

    #[test]
    fn test_factory_must_match_definition() {
        let registry = PipelineRegistry::new().with_pipeline(
            PipelineDefinition::new("mismatch", vec![StageId::Cleaner]).unwrap(),
            empty_factory(),
        );
        assert!(matches!(
            registry.build("mismatch", &BuildOptions::default()),
            Err(Error::PipelineBuild { .. })
        ));
    }
}
