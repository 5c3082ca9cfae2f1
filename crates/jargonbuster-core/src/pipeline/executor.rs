use chrono::Local;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::definition::Pipeline;
use super::settings::PipelineSettings;
use super::stage_id::StageId;
use super::state::DocumentState;
use crate::error::{Error, Result};
use crate::meta::{record_timing, Meta};
use crate::report::{collect_sections, finalize};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Cooperative cancellation, checked before each stage starts.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Final text and normalized report of one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutput {
    pub text: String,
    pub meta: Meta,
}

/// Runs documents through a pipeline's active stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageExecutor;

impl StageExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        text: &str,
        meta: &Meta,
        settings: PipelineSettings,
    ) -> Result<ExecutionOutput> {
        self.execute_cancellable(pipeline, text, meta, settings, &CancellationFlag::new())
            .await
    }

    pub async fn execute_cancellable(
        &self,
        pipeline: &Pipeline,
        text: &str,
        meta: &Meta,
        settings: PipelineSettings,
        cancel: &CancellationFlag,
    ) -> Result<ExecutionOutput> {
        let started_at = Local::now();
        let started = Instant::now();

        let active = settings.active_stages(&pipeline.stage_ids());
        info!(
            "Running pipeline '{}' with stages {:?}",
            pipeline.name(),
            active.names()
        );

        let mut state = DocumentState::new(text, settings, Arc::clone(pipeline.resources()));

        for stage in pipeline.stages() {
            let id = stage.id();
            if !active.contains(id) {
                continue;
            }
            if cancel.is_cancelled() {
                info!("Pipeline '{}' cancelled before stage '{}'", pipeline.name(), id);
                return Err(Error::Cancelled(pipeline.name().to_string()));
            }

            let stage_started = Instant::now();
            let applied = stage
                .apply(&mut state, &active)
                .map_err(|e| Error::stage(pipeline.name(), id, e))?;
            state
                .attach(Arc::clone(stage), applied)
                .map_err(|e| Error::stage(pipeline.name(), id, e))?;
            debug!("Stage '{}' applied in {:?}", id, stage_started.elapsed());
        }

        let mut report = if active.contains(StageId::ReportCollector) {
            collect_sections(&state, &active, pipeline.name()).await?
        } else {
            let mut minimal = Meta::new();
            minimal.insert("pipeline".into(), Value::from(active.names()));
            minimal
        };

        let finished_at = Local::now();
        let runtime_ms = started.elapsed().as_millis();

        report.insert(
            "execution_id".into(),
            Value::from(Uuid::new_v4().simple().to_string()),
        );
        report.insert(
            "pipeline_started".into(),
            Value::from(started_at.format(TIMESTAMP_FORMAT).to_string()),
        );
        report.insert(
            "pipeline_finished".into(),
            Value::from(finished_at.format(TIMESTAMP_FORMAT).to_string()),
        );
        report.insert(
            "pipeline_runtime_ms".into(),
            Value::from(u64::try_from(runtime_ms).unwrap_or(u64::MAX)),
        );

        let mut result = finalize(meta, report);
        record_timing(&mut result, "executor", runtime_ms);

        Ok(ExecutionOutput {
            text: state.text().to_string(),
            meta: result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{
        ActiveStages, Annotation, Applied, LanguageResources, PipelineDefinition, Stage,
        StageError,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct Recording {
        id: StageId,
        log: Arc<Mutex<Vec<StageId>>>,
        computed: AtomicUsize,
        fail_apply: bool,
        cancel_after: Option<CancellationFlag>,
    }

    impl Recording {
        fn new(id: StageId, log: &Arc<Mutex<Vec<StageId>>>) -> Self {
            Self {
                id,
                log: Arc::clone(log),
                computed: AtomicUsize::new(0),
                fail_apply: false,
                cancel_after: None,
            }
        }
    }

    #[async_trait]
    impl Stage for Recording {
        fn id(&self) -> StageId {
            self.id
        }

        fn apply(
            &self,
            _state: &mut DocumentState,
            _active: &ActiveStages,
        ) -> std::result::Result<Applied, StageError> {
            self.log.lock().unwrap().push(self.id);
            if let Some(flag) = &self.cancel_after {
                flag.cancel();
            }
            if self.fail_apply {
                return Err(StageError::Structural("tokenizer exploded".into()));
            }
            Ok(Applied::Deferred)
        }

        async fn compute_annotation(
            &self,
            _state: &DocumentState,
        ) -> std::result::Result<Annotation, StageError> {
            self.computed.fetch_add(1, Ordering::SeqCst);
            Ok(Annotation::Summary(vec!["Summary sentence.".into()]))
        }
    }

    fn pipeline(stages: Vec<Arc<dyn Stage>>) -> Pipeline {
        let ids = stages.iter().map(|s| s.id()).collect();
        let definition = PipelineDefinition::new("test", ids).unwrap();
        Pipeline::new(&definition, stages, Arc::new(LanguageResources::default())).unwrap()
    }

    #[tokio::test]
    async fn test_stages_run_in_pipeline_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline(vec![
            Arc::new(Recording::new(StageId::Cleaner, &log)),
            Arc::new(Recording::new(StageId::Tagger, &log)),
            Arc::new(Recording::new(StageId::Ner, &log)),
        ]);
        let settings = PipelineSettings::default().enable(["ner", "cleaner"]);

        let output = StageExecutor::new()
            .execute(&pipeline, "Text.", &Meta::new(), settings)
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec![StageId::Cleaner, StageId::Ner]);
        assert_eq!(output.meta["pipeline"], json!(["cleaner", "ner"]));
    }

    #[tokio::test]
    async fn test_minimal_report_without_collector() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline(vec![Arc::new(Recording::new(StageId::Summarizer, &log))]);
        let mut meta = Meta::new();
        meta.insert("lang".into(), json!("de"));

        let output = StageExecutor::new()
            .execute(&pipeline, "Text.", &meta, PipelineSettings::default())
            .await
            .unwrap();

        for key in ["execution_id", "pipeline_started", "pipeline_finished", "timed"] {
            assert!(output.meta.contains_key(key), "missing {key}");
        }
        assert_eq!(output.meta["document_language"], "de");
        assert!(output.meta.get("summaryText").is_none());
        assert_eq!(output.meta["execution_id"].as_str().unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_collector_reads_lazy_annotation_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let summarizer = Arc::new(Recording::new(StageId::Summarizer, &log));
        let lazy_stage: Arc<dyn Stage> = summarizer.clone();
        let pipeline = pipeline(vec![
            lazy_stage,
            Arc::new(Recording::new(StageId::ReportCollector, &log)),
        ]);

        let output = StageExecutor::new()
            .execute(&pipeline, "Text.", &Meta::new(), PipelineSettings::default())
            .await
            .unwrap();

        assert_eq!(output.meta["summaryText"], "Summary sentence.");
        assert_eq!(summarizer.computed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_structural_failure_aborts() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut failing = Recording::new(StageId::Tagger, &log);
        failing.fail_apply = true;
        let pipeline = pipeline(vec![
            Arc::new(failing),
            Arc::new(Recording::new(StageId::Ner, &log)),
        ]);

        let err = StageExecutor::new()
            .execute(&pipeline, "Text.", &Meta::new(), PipelineSettings::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::StageFailed { ref pipeline, ref stage, .. } if pipeline == "test" && stage == "tagger"
        ));
        assert_eq!(*log.lock().unwrap(), vec![StageId::Tagger]);
    }

    #[tokio::test]
    async fn test_cancellation_stops_before_next_stage() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationFlag::new();
        let mut first = Recording::new(StageId::Cleaner, &log);
        first.cancel_after = Some(cancel.clone());
        let pipeline = pipeline(vec![
            Arc::new(first),
            Arc::new(Recording::new(StageId::Tagger, &log)),
        ]);

        let err = StageExecutor::new()
            .execute_cancellable(
                &pipeline,
                "Text.",
                &Meta::new(),
                PipelineSettings::default(),
                &cancel,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled(name) if name == "test"));
        assert_eq!(*log.lock().unwrap(), vec![StageId::Cleaner]);
    }
}
