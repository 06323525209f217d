//! Minimal YAML → `PipelineSpec` parser for *linear* pipelines.
//!
//! Example:
//! ```yaml
//! config:
//!   fusion: true
//!   collect_stats: true
//! steps:
//!   - { op: filter, expr: "% 2 == 0" }
//!   - { op: map, expr: "* 10" }
//!   - { op: take, n: 2 }
//! ```

use serde::{Deserialize, Serialize};

use pipefuse_core::config::EngineConfig;

use crate::error::PlanError;
use crate::logical::{PipelineSpec, StepSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pipeline {
    #[serde(default)]
    config: Option<PipelineConfig>,
    #[serde(default)]
    steps: Vec<StepSpec>,
}

/// Engine overrides carried by a pipeline file. Unset fields leave the
/// engine's (env-derived) values alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub fusion: Option<bool>,
    pub collect_stats: Option<bool>,
    pub max_steps: Option<usize>,
}

impl PipelineConfig {
    pub fn apply(&self, cfg: &mut EngineConfig) {
        if let Some(f) = self.fusion {
            cfg.fusion_enabled = f;
        }
        if let Some(c) = self.collect_stats {
            cfg.collect_stats = c;
        }
        if let Some(m) = self.max_steps {
            cfg.max_steps = m;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedPipeline {
    pub spec: PipelineSpec,
    pub config: PipelineConfig,
}

pub fn parse_yaml_pipeline(yaml_src: &str) -> Result<ParsedPipeline, PlanError> {
    let doc: Pipeline = serde_yaml::from_str(yaml_src)?;
    if doc.steps.is_empty() {
        return Err(PlanError::Empty);
    }
    Ok(ParsedPipeline {
        spec: PipelineSpec { steps: doc.steps },
        config: doc.config.unwrap_or_default(),
    })
}
