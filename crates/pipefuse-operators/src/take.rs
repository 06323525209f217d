//! `take` / `take_while` / `drop` / `drop_while`.
//!
//! `take` and `take_while` terminate the traversal as soon as they cannot
//! produce anything more.

use once_cell::sync::Lazy;

use pipefuse_core::arg::{Arg, Params, Predicate};
use pipefuse_core::error::Result;
use pipefuse_core::eval::{Evaluation, Evaluator};
use pipefuse_core::value::Value;
use pipefuse_exec::dispatch::{dispatch, Dispatched, Func};

use crate::{boxed, items};

static TAKE: Lazy<Func> = Lazy::new(|| {
    Func::new("take", 2, |data: Value, args: &[Arg]| {
        let n = Params::new("take", args).count(0)?;
        let items = items("take", data)?;
        Ok(Value::List(items.into_iter().take(n).collect()))
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(TakeEval {
            remaining: Params::new("take", args).count(0)?,
        })
    })
});

static TAKE_WHILE: Lazy<Func> = Lazy::new(|| {
    Func::new("take_while", 2, |data: Value, args: &[Arg]| {
        let pred = Params::new("take_while", args).predicate(0)?;
        let mut out = Vec::new();
        for item in items("take_while", data)? {
            if !pred(&item)? {
                break;
            }
            out.push(item);
        }
        Ok(Value::List(out))
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(TakeWhileEval {
            pred: Params::new("take_while", args).predicate(0)?,
        })
    })
});

static DROP: Lazy<Func> = Lazy::new(|| {
    Func::new("drop", 2, |data: Value, args: &[Arg]| {
        let n = Params::new("drop", args).count(0)?;
        let items = items("drop", data)?;
        Ok(Value::List(items.into_iter().skip(n).collect()))
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(DropEval {
            left: Params::new("drop", args).count(0)?,
        })
    })
});

static DROP_WHILE: Lazy<Func> = Lazy::new(|| {
    Func::new("drop_while", 2, |data: Value, args: &[Arg]| {
        let pred = Params::new("drop_while", args).predicate(0)?;
        let mut out = Vec::new();
        let mut dropping = true;
        for item in items("drop_while", data)? {
            if dropping && pred(&item)? {
                continue;
            }
            dropping = false;
            out.push(item);
        }
        Ok(Value::List(out))
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(DropWhileEval {
            pred: Params::new("drop_while", args).predicate(0)?,
            dropping: true,
        })
    })
});

/// First `n` elements.
pub fn take(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&TAKE, args)
}

/// Longest prefix whose elements satisfy the predicate.
pub fn take_while(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&TAKE_WHILE, args)
}

/// All but the first `n` elements.
pub fn drop(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&DROP, args)
}

pub fn drop_while(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&DROP_WHILE, args)
}

struct TakeEval {
    remaining: usize,
}

impl Evaluator for TakeEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        if self.remaining == 0 {
            return Ok(Evaluation::done());
        }
        self.remaining -= 1;
        Ok(Evaluation::one(item).terminate_if(self.remaining == 0))
    }
}

struct TakeWhileEval {
    pred: Predicate,
}

impl Evaluator for TakeWhileEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        if (self.pred)(&item)? {
            Ok(Evaluation::one(item))
        } else {
            Ok(Evaluation::done())
        }
    }
}

struct DropEval {
    left: usize,
}

impl Evaluator for DropEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        if self.left > 0 {
            self.left -= 1;
            return Ok(Evaluation::skip());
        }
        Ok(Evaluation::one(item))
    }
}

struct DropWhileEval {
    pred: Predicate,
    dropping: bool,
}

impl Evaluator for DropWhileEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        if self.dropping && (self.pred)(&item)? {
            return Ok(Evaluation::skip());
        }
        self.dropping = false;
        Ok(Evaluation::one(item))
    }
}
