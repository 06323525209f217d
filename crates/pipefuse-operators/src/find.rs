//! Terminal lookups: `find` and `first`.
//!
//! Curried forms end their fused run and collapse it to a single value
//! (`Null` when nothing matched).

use once_cell::sync::Lazy;

use pipefuse_core::arg::{Arg, Params, Predicate};
use pipefuse_core::error::Result;
use pipefuse_core::eval::{Evaluation, Evaluator};
use pipefuse_core::value::Value;
use pipefuse_exec::dispatch::{dispatch, Dispatched, Func};

use crate::{boxed, items};

static FIND: Lazy<Func> = Lazy::new(|| {
    Func::new("find", 2, |data: Value, args: &[Arg]| {
        let pred = Params::new("find", args).predicate(0)?;
        for item in items("find", data)? {
            if pred(&item)? {
                return Ok(item);
            }
        }
        Ok(Value::Null)
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(FindEval {
            pred: Some(Params::new("find", args).predicate(0)?),
        })
    })
    .terminal()
});

static FIRST: Lazy<Func> = Lazy::new(|| {
    Func::new("first", 1, |data: Value, _args: &[Arg]| {
        Ok(items("first", data)?
            .into_iter()
            .next()
            .unwrap_or(Value::Null))
    })
    .with_evaluator(|_args: &[Arg]| boxed(FindEval { pred: None }))
    .terminal()
});

/// First element satisfying the predicate.
pub fn find(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&FIND, args)
}

pub fn first(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&FIRST, args)
}

/// `pred: None` matches anything.
struct FindEval {
    pred: Option<Predicate>,
}

impl Evaluator for FindEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        let hit = match &self.pred {
            Some(pred) => pred(&item)?,
            None => true,
        };
        if hit {
            Ok(Evaluation::one(item).terminating())
        } else {
            Ok(Evaluation::skip())
        }
    }
}
