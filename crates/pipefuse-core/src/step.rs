//! Pipeline steps.
//!
//! A step is either eager-only or fusible. Fusible steps carry the factory
//! that builds their per-run `Evaluator` and the trailing arguments it closes
//! over; lazy-only steps have no eager `apply` at all.

use std::fmt;
use std::sync::Arc;

use crate::arg::Arg;
use crate::error::{Error, Result};
use crate::eval::{Evaluator, EvaluatorFactory};
use crate::value::Value;

pub type ApplyFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
pub enum Step {
    Eager {
        name: &'static str,
        apply: ApplyFn,
    },
    Fusible {
        name: &'static str,
        apply: Option<ApplyFn>,
        factory: EvaluatorFactory,
        args: Arc<[Arg]>,
        /// Collapses the run's output to at most one value and ends the run.
        terminal: bool,
    },
}

impl Step {
    /// Plain eager step from a closure.
    pub fn eager<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Step::Eager {
            name,
            apply: Arc::new(f),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Eager { name, .. } | Step::Fusible { name, .. } => *name,
        }
    }

    pub fn is_fusible(&self) -> bool {
        matches!(self, Step::Fusible { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Fusible { terminal: true, .. })
    }

    /// Run the eager form against a whole value.
    pub fn apply(&self, value: Value) -> Result<Value> {
        match self {
            Step::Eager { apply, .. }
            | Step::Fusible {
                apply: Some(apply), ..
            } => apply(value),
            Step::Fusible {
                name, apply: None, ..
            } => Err(Error::NotASequence { step: *name }),
        }
    }

    /// Build a fresh evaluator for one run. `None` for eager steps.
    pub fn new_evaluator(&self) -> Option<Result<Box<dyn Evaluator>>> {
        match self {
            Step::Eager { .. } => None,
            Step::Fusible { factory, args, .. } => Some(factory(&args[..])),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Eager { name, .. } => f.debug_struct("Eager").field("name", name).finish(),
            Step::Fusible {
                name,
                apply,
                args,
                terminal,
                ..
            } => f
                .debug_struct("Fusible")
                .field("name", name)
                .field("lazy_only", &apply.is_none())
                .field("args", args)
                .field("terminal", terminal)
                .finish(),
        }
    }
}

/// Number of steps in the fused run starting at `start`.
///
/// Zero when `steps[start]` is eager or out of range. A terminal step is
/// included and ends the run.
pub fn run_len(steps: &[Step], start: usize) -> usize {
    let mut len = 0;
    for step in steps.iter().skip(start) {
        if !step.is_fusible() {
            break;
        }
        len += 1;
        if step.is_terminal() {
            break;
        }
    }
    len
}
