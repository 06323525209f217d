//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fuse contiguous fusible steps. When off, every step runs its eager form;
    /// results must be identical either way.
    pub fusion_enabled: bool,

    /// Accumulate `RunStats` while executing.
    pub collect_stats: bool,

    /// Pipelines longer than this are rejected before execution.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fusion_enabled: true,
            collect_stats: true,
            max_steps: 1024,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `PIPEFUSE_FUSION`: `true`/`false`
    /// - `PIPEFUSE_COLLECT_STATS`: `true`/`false`
    /// - `PIPEFUSE_MAX_STEPS`: maximum pipeline length
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("PIPEFUSE_FUSION") {
            if let Some(v) = parse_flag(&s) {
                cfg.fusion_enabled = v;
            }
        }

        if let Ok(s) = std::env::var("PIPEFUSE_COLLECT_STATS") {
            if let Some(v) = parse_flag(&s) {
                cfg.collect_stats = v;
            }
        }

        if let Ok(s) = std::env::var("PIPEFUSE_MAX_STEPS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_steps = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(Error::Config("max_steps must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
