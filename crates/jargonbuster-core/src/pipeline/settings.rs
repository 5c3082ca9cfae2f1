use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use super::stage_id::StageId;
use crate::meta::Meta;

pub const LANGUAGE_MODEL_KEY: &str = "language_model";

/// Per-request execution settings.
///
/// `enable` wins over `disable` entirely; `clean_only` is shorthand for
/// `enable = ["cleaner"]`. Unrecognized keys are kept in `extra` and handed
/// to stages untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<Vec<String>>,
    #[serde(default, alias = "cleanOnly")]
    pub clean_only: bool,
    #[serde(flatten)]
    pub extra: Meta,
}

impl PipelineSettings {
    #[must_use]
    pub fn enable<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enable = Some(stages.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn disable<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disable = Some(stages.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn clean_only(mut self) -> Self {
        self.clean_only = true;
        self
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        let value = self.extra.get(key)?;
        value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .and_then(|n| usize::try_from(n).ok())
    }

    pub fn language_model(&self) -> Option<&str> {
        self.extra.get(LANGUAGE_MODEL_KEY).and_then(Value::as_str)
    }

    /// Resolve the active subset of `order`, keeping pipeline order.
    pub fn active_stages(&self, order: &[StageId]) -> ActiveStages {
        let cleaner_only = [StageId::Cleaner.as_str().to_string()];

        let enable = if self.clean_only {
            Some(&cleaner_only[..])
        } else {
            self.enable.as_deref().filter(|e| !e.is_empty())
        };

        let stages = if let Some(enable) = enable {
            let wanted = parse_names(enable);
            order.iter().copied().filter(|id| wanted.contains(id)).collect()
        } else if let Some(disable) = self.disable.as_deref() {
            let unwanted = parse_names(disable);
            order
                .iter()
                .copied()
                .filter(|id| !unwanted.contains(id))
                .collect()
        } else {
            order.to_vec()
        };

        ActiveStages { stages }
    }
}

fn parse_names(names: &[String]) -> HashSet<StageId> {
    names
        .iter()
        .filter_map(|name| match name.parse::<StageId>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("Ignoring unknown stage name '{}' in settings", name);
                None
            }
        })
        .collect()
}

/// The stages selected for one execution, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveStages {
    stages: Vec<StageId>,
}

impl ActiveStages {
    pub fn all(order: &[StageId]) -> Self {
        Self {
            stages: order.to_vec(),
        }
    }

    pub fn contains(&self, id: StageId) -> bool {
        self.stages.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = StageId> + '_ {
        self.stages.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(StageId::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
