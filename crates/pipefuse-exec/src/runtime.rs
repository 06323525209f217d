//! Runtime: execute a step list against a value, fusing contiguous fusible
//! steps into single traversals.
//!
//! Behavior:
//! - Eager steps, and any step whose input is not a sequence, run their eager
//!   `apply`.
//! - A maximal run of fusible steps (ending after a terminal step) becomes one
//!   pass over the input, with a fresh evaluator per step.
//! - Expanded values flow through the rest of the run before the next source
//!   element is pulled.
//! - The first `terminate` anywhere in the chain stops the whole traversal,
//!   after the current element's contribution has been accumulated.
//! - Errors from user transforms abort the run with no partial output.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use pipefuse_core::config::EngineConfig;
use pipefuse_core::error::{Error, Result};
use pipefuse_core::eval::{Emit, Evaluation, Evaluator};
use pipefuse_core::hash::{hash_serde, hash_steps};
use pipefuse_core::manifest::RunManifest;
use pipefuse_core::step::{run_len, Step};
use pipefuse_core::value::{Shape, Value};

use crate::metrics::{emit_span, RunStats};

/// Whether a traversal may keep pulling source elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Output of `Engine::run_report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub output: Value,
    pub stats: RunStats,
    pub manifest: RunManifest,
}

/// Engine owns the config and the statistics of its most recent run.
#[derive(Debug, Default)]
pub struct Engine {
    cfg: EngineConfig,
    stats: RunStats,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            stats: RunStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Statistics of the last `run` (zeroed if `collect_stats` is off).
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Execute `steps` against `initial` and return the final value.
    pub fn run(&mut self, initial: Value, steps: &[Step]) -> Result<Value> {
        self.stats = RunStats::default();
        self.cfg.validate()?;
        if steps.len() > self.cfg.max_steps {
            return Err(Error::Config(format!(
                "pipeline has {} steps, limit is {}",
                steps.len(),
                self.cfg.max_steps
            )));
        }

        let mut stats = RunStats::default();
        let mut value = initial;
        let mut i = 0;

        while i < steps.len() {
            let step = &steps[i];
            let len = self.fusible_span(steps, i);

            if len == 0 {
                value = step.apply(value)?;
                stats.eager_steps += 1;

                #[cfg(feature = "tracing")]
                tracing::trace!(index = i, step = step.name(), "applied eager step");

                i += 1;
                continue;
            }

            value = match value.into_shape() {
                Shape::Sequence(items) => {
                    let run = &steps[i..i + len];
                    let out = execute_run(run, items, &mut stats)?;

                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        start = i,
                        len,
                        terminal = run[len - 1].is_terminal(),
                        pulled = stats.pulled,
                        emitted = stats.emitted,
                        short_circuits = stats.short_circuits,
                        "executed fused run"
                    );

                    i += len;
                    out
                }
                Shape::Scalar(v) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(index = i, step = step.name(), "scalar input, applying eagerly");

                    stats.eager_steps += 1;
                    i += 1;
                    step.apply(v)?
                }
            };
        }

        if self.cfg.collect_stats {
            emit_span(
                "run",
                &[
                    ("steps", steps.len().to_string()),
                    ("fused_runs", stats.fused_runs.to_string()),
                    ("pulled", stats.pulled.to_string()),
                ],
            );
            self.stats = stats;
        }
        Ok(value)
    }

    /// `run`, plus statistics and a manifest.
    pub fn run_report(&mut self, initial: Value, steps: &[Step]) -> Result<RunReport> {
        let manifest = RunManifest::new(hash_steps(steps), hash_serde(&self.cfg)?, now_millis());
        let output = self.run(initial, steps)?;
        Ok(RunReport {
            output,
            stats: self.stats,
            manifest: manifest.finish(now_millis()),
        })
    }

    /// Length of the run to fuse at `start`; zero means "apply eagerly".
    ///
    /// With fusion disabled, steps still run one at a time, but a lazy-only
    /// step has no eager form and becomes a single-step run.
    fn fusible_span(&self, steps: &[Step], start: usize) -> usize {
        let len = run_len(steps, start);
        if len == 0 || self.cfg.fusion_enabled {
            return len;
        }
        match &steps[start] {
            Step::Fusible { apply: None, .. } => 1,
            _ => 0,
        }
    }
}

/// Run `steps` with a default engine.
pub fn pipe(initial: Value, steps: &[Step]) -> Result<Value> {
    Engine::default().run(initial, steps)
}

/// Traverse `items` once through the evaluators of `run`.
///
/// `run` must be a non-empty list of fusible steps.
pub(crate) fn execute_run(run: &[Step], items: Vec<Value>, stats: &mut RunStats) -> Result<Value> {
    let mut chain = run
        .iter()
        .map(|step| {
            step.new_evaluator()
                .unwrap_or_else(|| Err(Error::NotASequence { step: step.name() }))
        })
        .collect::<Result<Vec<Box<dyn Evaluator>>>>()?;

    let mut acc = Vec::new();
    let mut pulled = 0u64;
    let mut stopped = false;

    for (index, item) in items.iter().enumerate() {
        pulled += 1;
        if process_element(item.clone(), index, &items, &mut chain, &mut acc)? == Flow::Stop {
            stopped = index + 1 < items.len();
            break;
        }
    }

    stats.merge(&RunStats {
        fused_runs: 1,
        fused_steps: run.len() as u64,
        pulled,
        emitted: acc.len() as u64,
        short_circuits: u64::from(stopped),
        ..Default::default()
    });

    let terminal = run.last().map(Step::is_terminal).unwrap_or(false);
    if terminal {
        Ok(acc.into_iter().next().unwrap_or(Value::Null))
    } else {
        Ok(Value::List(acc))
    }
}

/// Push one element through `chain`, appending whatever reaches the end of
/// it to `acc`.
///
/// A `skip` ends the element's journey. Each emitted value re-enters at the
/// next evaluator. Returns `Flow::Stop` when any evaluator reached for this
/// element asked to terminate.
pub fn process_element(
    item: Value,
    index: usize,
    source: &[Value],
    chain: &mut [Box<dyn Evaluator>],
    acc: &mut Vec<Value>,
) -> Result<Flow> {
    let Some((head, rest)) = chain.split_first_mut() else {
        acc.push(item);
        return Ok(Flow::Continue);
    };

    let Evaluation { emit, terminate } = head.evaluate(item, index, source)?;

    match emit {
        Emit::Skip => {}
        Emit::One(v) => {
            if process_element(v, index, source, rest, acc)? == Flow::Stop {
                return Ok(Flow::Stop);
            }
        }
        Emit::Many(values) => {
            for v in values {
                if process_element(v, index, source, rest, acc)? == Flow::Stop {
                    return Ok(Flow::Stop);
                }
            }
        }
    }

    Ok(if terminate { Flow::Stop } else { Flow::Continue })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
