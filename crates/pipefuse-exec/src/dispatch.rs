//! Arity dispatcher: call a function now, or curry it into a pipeline step.
//!
//! A `Func` of arity `n` takes its data as the first positional argument.
//! Supplying all `n` arguments invokes it; supplying `n - 1` yields a `Step`
//! awaiting the data; anything else is an `ArityMismatch`.

use std::fmt;
use std::sync::Arc;

use pipefuse_core::arg::Arg;
use pipefuse_core::error::{Error, Result};
use pipefuse_core::eval::{Evaluator, EvaluatorFactory};
use pipefuse_core::step::{ApplyFn, Step};
use pipefuse_core::value::{Shape, Value};

use crate::metrics::RunStats;
use crate::runtime::execute_run;

/// Eager body: `(data, trailing args) -> result`.
pub type Body = Arc<dyn Fn(Value, &[Arg]) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
pub struct Func {
    name: &'static str,
    arity: usize,
    form: Form,
    terminal: bool,
}

#[derive(Clone)]
enum Form {
    Eager {
        body: Body,
        evaluator: Option<EvaluatorFactory>,
    },
    LazyOnly {
        factory: EvaluatorFactory,
    },
}

/// Outcome of `dispatch`.
#[derive(Debug)]
pub enum Dispatched {
    Value(Value),
    Step(Step),
}

impl Dispatched {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Dispatched::Value(v) => Some(v),
            Dispatched::Step(_) => None,
        }
    }

    pub fn into_step(self) -> Option<Step> {
        match self {
            Dispatched::Step(s) => Some(s),
            Dispatched::Value(_) => None,
        }
    }
}

impl Func {
    /// Function with an eager body.
    pub fn new<F>(name: &'static str, arity: usize, body: F) -> Self
    where
        F: Fn(Value, &[Arg]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name,
            arity,
            form: Form::Eager {
                body: Arc::new(body),
                evaluator: None,
            },
            terminal: false,
        }
    }

    /// Lazy-only function: its eager form is a single-step fused run.
    pub fn lazy<F>(name: &'static str, arity: usize, factory: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Box<dyn Evaluator>> + Send + Sync + 'static,
    {
        Self {
            name,
            arity,
            form: Form::LazyOnly {
                factory: Arc::new(factory),
            },
            terminal: false,
        }
    }

    /// Attach an evaluator factory so curried forms are fusible.
    pub fn with_evaluator<F>(mut self, factory: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Box<dyn Evaluator>> + Send + Sync + 'static,
    {
        let factory: EvaluatorFactory = Arc::new(factory);
        match &mut self.form {
            Form::Eager { evaluator, .. } => *evaluator = Some(factory),
            Form::LazyOnly { factory: slot } => *slot = factory,
        }
        self
    }

    /// Mark curried forms as terminal: at most one result for the run.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_lazy_only(&self) -> bool {
        matches!(self.form, Form::LazyOnly { .. })
    }

    pub fn call(&self, args: Vec<Arg>) -> Result<Dispatched> {
        dispatch(self, args)
    }

    fn invoke(&self, data: Value, params: &[Arg]) -> Result<Value> {
        match &self.form {
            Form::Eager { body, .. } => body(data, params),
            Form::LazyOnly { .. } => {
                let step = self.curry(params.to_vec());
                match data.into_shape() {
                    Shape::Sequence(items) => {
                        execute_run(std::slice::from_ref(&step), items, &mut RunStats::default())
                    }
                    Shape::Scalar(_) => Err(Error::NotASequence { step: self.name }),
                }
            }
        }
    }

    fn curry(&self, params: Vec<Arg>) -> Step {
        let args: Arc<[Arg]> = params.into();

        match &self.form {
            Form::Eager {
                body,
                evaluator: None,
            } => Step::Eager {
                name: self.name,
                apply: bind(body, &args),
            },
            Form::Eager {
                body,
                evaluator: Some(factory),
            } => Step::Fusible {
                name: self.name,
                apply: Some(bind(body, &args)),
                factory: Arc::clone(factory),
                args,
                terminal: self.terminal,
            },
            Form::LazyOnly { factory } => Step::Fusible {
                name: self.name,
                apply: None,
                factory: Arc::clone(factory),
                args,
                terminal: self.terminal,
            },
        }
    }
}

/// Close `body` over its trailing arguments: `g(x) == body(x, args)`.
fn bind(body: &Body, args: &Arc<[Arg]>) -> ApplyFn {
    let body = Arc::clone(body);
    let args = Arc::clone(args);
    Arc::new(move |data: Value| body(data, &args))
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("lazy_only", &self.is_lazy_only())
            .field(
                "fusible",
                &!matches!(self.form, Form::Eager { evaluator: None, .. }),
            )
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// Invoke `func` with `args`, or curry it when exactly the data is missing.
pub fn dispatch(func: &Func, mut args: Vec<Arg>) -> Result<Dispatched> {
    let supplied = args.len();

    if func.arity >= 1 && supplied == func.arity {
        let data = args.remove(0).into_value(func.name)?;
        return func.invoke(data, &args).map(Dispatched::Value);
    }

    if func.arity >= 1 && supplied + 1 == func.arity {
        return Ok(Dispatched::Step(func.curry(args)));
    }

    Err(Error::ArityMismatch {
        name: func.name,
        arity: func.arity,
        supplied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipefuse_core::eval::{Evaluation, FnEvaluator};

    fn add() -> Func {
        Func::new("add", 2, |data: Value, args: &[Arg]| {
            let addend = match &args[0] {
                Arg::Value(v) => v.as_i64().unwrap_or_default(),
                _ => return Err(Error::transform("addend must be a number")),
            };
            Ok(Value::I64(data.as_i64().unwrap_or_default() + addend))
        })
    }

    #[test]
    fn full_arity_invokes_immediately() {
        let out = dispatch(&add(), vec![Arg::from(5), Arg::from(10)]).unwrap();
        assert_eq!(out.into_value(), Some(Value::I64(15)));
    }

    #[test]
    fn one_missing_curries_on_the_first_argument() {
        let step = dispatch(&add(), vec![Arg::from(5)])
            .unwrap()
            .into_step()
            .unwrap();
        assert!(!step.is_fusible());
        assert_eq!(step.apply(Value::I64(10)).unwrap(), Value::I64(15));
    }

    #[test]
    fn other_counts_are_arity_mismatches() {
        for n in [0usize, 3, 4] {
            let args = (0..n).map(|i| Arg::from(i as i64)).collect();
            assert_eq!(
                dispatch(&add(), args).unwrap_err(),
                Error::ArityMismatch {
                    name: "add",
                    arity: 2,
                    supplied: n,
                }
            );
        }
    }

    #[test]
    fn zero_arity_never_dispatches() {
        let f = Func::new("nullary", 0, |data: Value, _args: &[Arg]| Ok(data));
        assert!(matches!(
            dispatch(&f, vec![]),
            Err(Error::ArityMismatch { supplied: 0, .. })
        ));
    }

    #[test]
    fn evaluator_makes_curried_form_fusible() {
        let f = add().with_evaluator(|_args: &[Arg]| {
            let ev: Box<dyn Evaluator> = Box::new(FnEvaluator(
                |v: Value, _i: usize, _s: &[Value]| Ok(Evaluation::one(v)),
            ));
            Ok(ev)
        });
        let step = f.call(vec![Arg::from(1)]).unwrap().into_step().unwrap();
        assert!(step.is_fusible());
        assert!(!step.is_terminal());
        assert_eq!(step.apply(Value::I64(1)).unwrap(), Value::I64(2));
    }

    #[test]
    fn data_position_rejects_closures() {
        let err = dispatch(
            &add(),
            vec![Arg::predicate(|_v: &Value| Ok(true)), Arg::from(1)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "add", .. }));
    }
}
