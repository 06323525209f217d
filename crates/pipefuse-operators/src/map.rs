//! `map` / `map_indexed`: one output per input.

use once_cell::sync::Lazy;

use pipefuse_core::arg::{Arg, IndexedMapper, Mapper, Params};
use pipefuse_core::error::Result;
use pipefuse_core::eval::{Evaluation, Evaluator};
use pipefuse_core::value::Value;
use pipefuse_exec::dispatch::{dispatch, Dispatched, Func};

use crate::{boxed, items};

static MAP: Lazy<Func> = Lazy::new(|| {
    Func::new("map", 2, |data: Value, args: &[Arg]| {
        let f = Params::new("map", args).mapper(0)?;
        items("map", data)?
            .iter()
            .map(|item| f(item))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(MapEval {
            f: Params::new("map", args).mapper(0)?,
        })
    })
});

static MAP_INDEXED: Lazy<Func> = Lazy::new(|| {
    Func::new("map_indexed", 2, |data: Value, args: &[Arg]| {
        let f = Params::new("map_indexed", args).indexed_mapper(0)?;
        items("map_indexed", data)?
            .iter()
            .enumerate()
            .map(|(i, item)| f(item, i))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    })
    .with_evaluator(|args: &[Arg]| {
        boxed(MapIndexedEval {
            f: Params::new("map_indexed", args).indexed_mapper(0)?,
            next: 0,
        })
    })
});

pub fn map(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&MAP, args)
}

/// Like `map`, but the mapper also receives the element's position in this
/// step's own input.
pub fn map_indexed(args: Vec<Arg>) -> Result<Dispatched> {
    dispatch(&MAP_INDEXED, args)
}

struct MapEval {
    f: Mapper,
}

impl Evaluator for MapEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        Ok(Evaluation::one((self.f)(&item)?))
    }
}

struct MapIndexedEval {
    f: IndexedMapper,
    // Position in this step's input, which differs from the source index
    // once an upstream step filters or expands.
    next: usize,
}

impl Evaluator for MapIndexedEval {
    fn evaluate(&mut self, item: Value, _index: usize, _source: &[Value]) -> Result<Evaluation> {
        let out = (self.f)(&item, self.next)?;
        self.next += 1;
        Ok(Evaluation::one(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_times_ten() {
        let f = Arg::mapper(|v: &Value| Ok(Value::I64(v.as_i64().unwrap_or_default() * 10)));
        let out = map(vec![Value::from(vec![1, 2]).into(), f]).unwrap();
        assert_eq!(out.into_value(), Some(Value::from(vec![10, 20])));
    }

    #[test]
    fn indexed_evaluator_counts_its_own_inputs() {
        let f = Arg::indexed_mapper(|_v: &Value, i: usize| Ok(Value::I64(i as i64)));
        let step = map_indexed(vec![f]).unwrap().into_step().unwrap();
        let mut ev = step.new_evaluator().unwrap().unwrap();
        // Source indices jump, own positions do not.
        let a = ev.evaluate(Value::Null, 3, &[]).unwrap();
        let b = ev.evaluate(Value::Null, 7, &[]).unwrap();
        assert_eq!(a, Evaluation::one(Value::I64(0)));
        assert_eq!(b, Evaluation::one(Value::I64(1)));
    }
}
