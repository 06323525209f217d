#![forbid(unsafe_code)]
//! pipefuse-operators: the transform catalogue.
//!
//! Every transform is a `Func` built once and dispatched per call:
//! - all arguments supplied: the eager form runs immediately;
//! - data missing: a curried `Step`, fusible when the transform has an
//!   evaluator.
//!
//! `expr` and `registry` let pipelines be assembled from data (YAML/JSON).

pub mod expr;
pub mod filter;
pub mod find;
pub mod flat_map;
pub mod map;
pub mod registry;
pub mod take;
pub mod unique;

pub use filter::{filter, reject};
pub use find::{find, first};
pub use flat_map::{flat_map, flatten};
pub use map::{map, map_indexed};
pub use registry::{Registry, RegistryError};
pub use take::{drop, drop_while, take, take_while};
pub use unique::{unique, unique_by};

use pipefuse_core::error::{Error, Result};
use pipefuse_core::eval::Evaluator;
use pipefuse_core::value::Value;

pub(crate) fn boxed<E: Evaluator + 'static>(ev: E) -> Result<Box<dyn Evaluator>> {
    Ok(Box::new(ev))
}

/// Elements of a sequence argument; eager forms reject scalars.
pub(crate) fn items(name: &'static str, data: Value) -> Result<Vec<Value>> {
    match data {
        Value::List(items) => Ok(items),
        _ => Err(Error::NotASequence { step: name }),
    }
}
