//! Declarative pipeline description: an ordered list of op keys with their
//! parameters. Parameters stay untyped JSON until the registry reads them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub steps: Vec<StepSpec>,
}

/// One step: `{ op: take, n: 2 }` → `op = "take"`, `params = {"n": 2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub op: String,
    #[serde(flatten)]
    pub params: Map<String, Json>,
}

impl StepSpec {
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            params: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn params_json(&self) -> Json {
        Json::Object(self.params.clone())
    }
}

impl PipelineSpec {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ops(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.op.as_str())
    }
}
