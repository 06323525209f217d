//! Per-element evaluation protocol used by fused runs.
//!
//! An `Evaluator` is stateful and single-use: the fuser builds a fresh one
//! from its `EvaluatorFactory` every time it starts a run, and drops it when
//! the run's output has been produced.

use std::sync::Arc;

use crate::arg::Arg;
use crate::error::Result;
use crate::value::Value;

/// What an evaluator produced for one input element.
#[derive(Debug, Clone, PartialEq)]
pub enum Emit {
    Skip,
    One(Value),
    Many(Vec<Value>),
}

/// Evaluator answer for one element: an emission plus an optional stop signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub emit: Emit,
    /// Upstream must not pull another source element after this one.
    pub terminate: bool,
}

impl Evaluation {
    pub fn skip() -> Self {
        Self {
            emit: Emit::Skip,
            terminate: false,
        }
    }

    pub fn one(value: Value) -> Self {
        Self {
            emit: Emit::One(value),
            terminate: false,
        }
    }

    pub fn many(values: Vec<Value>) -> Self {
        Self {
            emit: Emit::Many(values),
            terminate: false,
        }
    }

    /// Skip this element and stop the traversal.
    pub fn done() -> Self {
        Self::skip().terminating()
    }

    pub fn terminating(mut self) -> Self {
        self.terminate = true;
        self
    }

    pub fn terminate_if(mut self, cond: bool) -> Self {
        self.terminate |= cond;
        self
    }
}

/// Element-at-a-time logic for one step of a fused run.
///
/// `index` and `source` describe the element's position in the sequence the
/// run is traversing, not in this evaluator's own input. Evaluators that care
/// about their own input position count it themselves.
pub trait Evaluator {
    fn evaluate(&mut self, item: Value, index: usize, source: &[Value]) -> Result<Evaluation>;
}

/// Builds a fresh evaluator from a step's captured trailing arguments.
pub type EvaluatorFactory = Arc<dyn Fn(&[Arg]) -> Result<Box<dyn Evaluator>> + Send + Sync>;

/// Adapter so plain closures can serve as evaluators.
pub struct FnEvaluator<F>(pub F);

impl<F> Evaluator for FnEvaluator<F>
where
    F: FnMut(Value, usize, &[Value]) -> Result<Evaluation>,
{
    fn evaluate(&mut self, item: Value, index: usize, source: &[Value]) -> Result<Evaluation> {
        (self.0)(item, index, source)
    }
}
