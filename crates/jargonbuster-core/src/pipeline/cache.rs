use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::info;

use super::definition::Pipeline;
use super::registry::{BuildOptions, PipelineRegistry};
use crate::error::{Error, Result};

type Slot = Arc<OnceCell<Arc<Pipeline>>>;

/// Process-lifetime cache of built pipelines, keyed by canonical name.
///
/// Each key is built at most once: concurrent first requests wait on the
/// same build. Builds run on their own task, so a caller that is dropped
/// mid-build does not abandon it. A failed build leaves the key empty so
/// the next request retries.
pub struct PipelineCache {
    registry: Arc<PipelineRegistry>,
    options: BuildOptions,
    slots: Mutex<HashMap<String, Slot>>,
    builds: Arc<AtomicUsize>,
}

impl PipelineCache {
    pub fn new(registry: PipelineRegistry) -> Self {
        Self::with_options(registry, BuildOptions::default())
    }

    pub fn with_options(registry: PipelineRegistry, options: BuildOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            options,
            slots: Mutex::new(HashMap::new()),
            builds: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn registry(&self) -> &PipelineRegistry {
        &self.registry
    }

    /// Number of pipeline constructions performed so far.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        let Some(canonical) = self.registry.resolve(name) else {
            return false;
        };
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(canonical)
            .is_some_and(|slot| slot.initialized())
    }

    /// Resolve `name` (or an alias) to its built pipeline, building it on first use.
    pub async fn create(&self, name: &str) -> Result<Arc<Pipeline>> {
        self.create_with(name, None).await
    }

    /// Like [`create`](Self::create); `language_model` only applies when this
    /// call performs the first build.
    pub async fn create_with(
        &self,
        name: &str,
        language_model: Option<&str>,
    ) -> Result<Arc<Pipeline>> {
        let canonical = self
            .registry
            .resolve(name)
            .ok_or_else(|| Error::PipelineNotFound {
                name: name.to_string(),
            })?
            .to_string();

        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(canonical.clone()).or_default().clone()
        };

        let mut options = self.options.clone();
        if let Some(model) = language_model {
            options.language_model = model.to_string();
        }

        if let Some(pipeline) = slot.get() {
            return Ok(Arc::clone(pipeline));
        }

        let registry = Arc::clone(&self.registry);
        let builds = Arc::clone(&self.builds);
        let name = canonical.clone();
        let task = tokio::spawn(async move {
            slot.get_or_try_init(|| build(registry, builds, name, options))
                .await
                .cloned()
        });

        task.await.map_err(|e| Error::PipelineBuild {
            name: canonical,
            reason: e.to_string(),
        })?
    }
}

async fn build(
    registry: Arc<PipelineRegistry>,
    builds: Arc<AtomicUsize>,
    canonical: String,
    options: BuildOptions,
) -> Result<Arc<Pipeline>> {
    info!(
        "Creating pipeline '{}' for language model '{}', please wait...",
        canonical, options.language_model
    );
    let started = Instant::now();

    builds.fetch_add(1, Ordering::SeqCst);
    let name = canonical.clone();
    let pipeline = tokio::task::spawn_blocking(move || registry.build(&name, &options))
        .await
        .map_err(|e| Error::PipelineBuild {
            name: canonical.clone(),
            reason: e.to_string(),
        })??;

    info!("Created pipeline '{}' in {:?}", canonical, started.elapsed());
    Ok(Arc::new(pipeline))
}
