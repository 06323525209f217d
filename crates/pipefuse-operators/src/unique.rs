//! `unique` / `unique_by`: de-duplication, first occurrence wins.
//!
//! Both are lazy-only: the eager form is a single-step fused run.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use pipefuse_core::arg::{Arg, Mapper, Params};
use pipefuse_core::error::Result;
use pipefuse_core::eval::{Evaluation, Evaluator};
use pipefuse_core::value::Value;
use pipefuse_exec::dispatch::{dispatch, Dispatched, Func};

use crate::boxed;

static UNIQUE: Lazy<Func> = Lazy::new(|| {
    Func::lazy("unique", 1, |_args: &[Arg]| {
        boxed(UniqueEval {
            key: None,
            seen: HashSet::new(),
        })
    })
});

static UNIQUE_BY: Lazy<Func> = Lazy::new(|| {
    Func::lazy("unique_by", 2, |args: &[Arg]| {
        boxed(UniqueEval {
            key: Some(Params::new("unique_by", args).mapper(0)?),
            seen: HashSet::new(),
        })
    })
});

pub fn unique(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&UNIQUE, args)
}

/// Keeps the first element for each distinct key.
pub fn unique_by(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&UNIQUE_BY, args)
}

struct UniqueEval {
    key: Option<Mapper>,
    seen: HashSet<[u8; 32]>,
}

impl Evaluator for UniqueEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        let fingerprint = match &self.key {
            Some(key) => key(&item)?.fingerprint(),
            None => item.fingerprint(),
        };
        if self.seen.insert(fingerprint) {
            Ok(Evaluation::one(item))
        } else {
            Ok(Evaluation::skip())
        }
    }
}
