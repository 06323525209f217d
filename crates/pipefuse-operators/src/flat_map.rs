//! `flat_map` / `flatten`: one input, zero or more outputs.
//!
//! A list result is spliced into the output; any other value is emitted as a
//! single element. Flattening is one level deep.

use once_cell::sync::Lazy;

use pipefuse_core::arg::{Arg, Mapper, Params};
use pipefuse_core::error::Result;
use pipefuse_core::eval::{Evaluation, Evaluator};
use pipefuse_core::value::Value;
use pipefuse_exec::dispatch::{dispatch, Dispatched, Func};

use crate::{boxed, items};

static FLAT_MAP: Lazy<Func> = Lazy::new(|| {
    Func::new("flat_map", 2, |data: Value, args: &[Arg]| {
        let f = Params::new("flat_map", args).mapper(0)?;
        let mut out = Vec::new();
        for item in items("flat_map", data)? {
            splice(&mut out, f(&item)?);
        }
        Ok(Value::List(out))
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(FlatMapEval {
            f: Some(Params::new("flat_map", args).mapper(0)?),
        })
    })
});

static FLATTEN: Lazy<Func> = Lazy::new(|| {
    Func::new("flatten", 1, |data: Value, _args: &[Arg]| {
        let mut out = Vec::new();
        for item in items("flatten", data)? {
            splice(&mut out, item);
        }
        Ok(Value::List(out))
    })
    .with_evaluator(|_args: &[Arg]| boxed(FlatMapEval { f: None }))
});

pub fn flat_map(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&FLAT_MAP, args)
}

/// `flatten(data)`, or `flatten()` curried.
pub fn flatten(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&FLATTEN, args)
}

fn splice(out: &mut Vec<Value>, v: Value) {
    match v {
        Value::List(inner) => out.extend(inner),
        other => out.push(other),
    }
}

/// `f: None` flattens the element itself.
struct FlatMapEval {
    f: Option<Mapper>,
}

impl Evaluator for FlatMapEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        let produced = match &self.f {
            Some(f) => f(&item)?,
            None => item,
        };
        Ok(match produced {
            Value::List(values) => Evaluation::many(values),
            other => Evaluation::one(other),
        })
    }
}
