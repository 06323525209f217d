//! Per-run record produced by `Engine::run_report`.
//!
//! Two runs with equal `plan_hash` and `config_hash` executed the same step
//! shapes under the same settings; closures inside steps are not hashed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::Hash256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(pub Uuid);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub id: ManifestId,

    /// Digest of the steps and their data arguments (`hash::hash_steps`).
    pub plan_hash: Hash256,

    /// Digest of the `EngineConfig` in effect.
    pub config_hash: Hash256,

    /// `pipefuse-core` crate version.
    pub engine_version: String,

    /// Wall-clock bounds of the run, in Unix milliseconds.
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl RunManifest {
    /// Open a manifest; `finished_ms` equals `started_ms` until `finish`.
    pub fn new(plan_hash: Hash256, config_hash: Hash256, started_ms: u64) -> Self {
        Self {
            id: ManifestId(Uuid::new_v4()),
            plan_hash,
            config_hash,
            engine_version: crate::VERSION.to_string(),
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(mut self, finished_ms: u64) -> Self {
        self.finished_ms = finished_ms;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}
