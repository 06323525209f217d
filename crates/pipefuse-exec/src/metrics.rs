//! Run statistics and tracing hooks.
//!
//! Wire `emit_span` to a subscriber in the binary layer; it is a no-op unless
//! the `tracing` feature is enabled.

use serde::{Deserialize, Serialize};

/// Counters for one top-level run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Steps applied through their eager form.
    pub eager_steps: u64,
    /// Fused traversals started.
    pub fused_runs: u64,
    /// Steps executed inside fused traversals.
    pub fused_steps: u64,
    /// Source elements pulled by fused traversals.
    pub pulled: u64,
    /// Elements accumulated by fused traversals.
    pub emitted: u64,
    /// Fused traversals that stopped before the end of their source.
    pub short_circuits: u64,
}

impl RunStats {
    pub fn merge(&mut self, other: &RunStats) {
        self.eager_steps += other.eager_steps;
        self.fused_runs += other.fused_runs;
        self.fused_steps += other.fused_steps;
        self.pulled += other.pulled;
        self.emitted += other.emitted;
        self.short_circuits += other.short_circuits;
    }
}

#[cfg(feature = "tracing")]
pub fn emit_span(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::span!(tracing::Level::TRACE, "pipefuse", event);
    let _enter = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn emit_span(_event: &str, _key_values: &[(&str, String)]) { /* no-op */
}
