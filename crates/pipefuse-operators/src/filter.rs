//! `filter` / `reject`: keep or drop elements by predicate.

use once_cell::sync::Lazy;

use pipefuse_core::arg::{Arg, Params, Predicate};
use pipefuse_core::error::Result;
use pipefuse_core::eval::{Evaluation, Evaluator};
use pipefuse_core::value::Value;
use pipefuse_exec::dispatch::{dispatch, Dispatched, Func};

use crate::{boxed, items};

static FILTER: Lazy<Func> = Lazy::new(|| keep_when("filter", true));
static REJECT: Lazy<Func> = Lazy::new(|| keep_when("reject", false));

/// `filter(data, pred)` or curried `filter(pred)`.
pub fn filter(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&FILTER, args)
}

/// `reject(data, pred)` or curried `reject(pred)`.
pub fn reject(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&REJECT, args)
}

fn keep_when(name: &'static str, keep: bool) -> Func {
    Func::new(name, 2, move |data: Value, args: &[Arg]| {
        let pred = Params::new(name, args).predicate(0)?;
        let mut out = Vec::new();
        for item in items(name, data)? {
            if pred(&item)? == keep {
                out.push(item);
            }
        }
        Ok(Value::List(out))
    })
    .with_evaluator(move |args: &[Arg]| {
        boxed(FilterEval {
            pred: Params::new(name, args).predicate(0)?,
            keep,
        })
    })
}

struct FilterEval {
    pred: Predicate,
    keep: bool,
}

impl Evaluator for FilterEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        if (self.pred)(&item)? == self.keep {
            Ok(Evaluation::one(item))
        } else {
            Ok(Evaluation::skip())
        }
    }
}
