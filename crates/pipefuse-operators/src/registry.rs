//! Name → builder registry for data-driven pipelines.
//!
//! Each builder reads its parameters from a JSON object and returns the
//! curried `Step` of the matching transform. Expression parameters go through
//! `crate::expr`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as Json;
use thiserror::Error;

use pipefuse_core::arg::Arg;
use pipefuse_core::error::{Error as CoreError, Result as CoreResult};
use pipefuse_core::step::Step;
use pipefuse_exec::dispatch::Dispatched;

use crate::expr::{parse_mapper, parse_predicate, ExprError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown op '{0}'")]
    UnknownOp(String),

    #[error("op '{op}' needs parameter '{param}'")]
    MissingParam { op: &'static str, param: &'static str },

    #[error("op '{op}': invalid parameter '{param}': {reason}")]
    InvalidParam {
        op: &'static str,
        param: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error(transparent)]
    Dispatch(#[from] CoreError),
}

pub type Builder = fn(&Json) -> Result<Step, RegistryError>;

#[derive(Clone)]
pub struct Registry {
    builders: BTreeMap<&'static str, Builder>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.builders.keys()).finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry preloaded with the built-in transforms.
    pub fn new() -> Self {
        let mut r = Self {
            builders: BTreeMap::new(),
        };
        r.register("filter", |p| predicate_step("filter", p, crate::filter));
        r.register("reject", |p| predicate_step("reject", p, crate::reject));
        r.register("take_while", |p| {
            predicate_step("take_while", p, crate::take_while)
        });
        r.register("drop_while", |p| {
            predicate_step("drop_while", p, crate::drop_while)
        });
        r.register("find", |p| predicate_step("find", p, crate::find));
        r.register("map", |p| mapper_step("map", "expr", p, crate::map));
        r.register("flat_map", |p| {
            mapper_step("flat_map", "expr", p, crate::flat_map)
        });
        r.register("unique_by", |p| {
            mapper_step("unique_by", "key", p, crate::unique_by)
        });
        r.register("take", |p| count_step("take", p, crate::take));
        r.register("drop", |p| count_step("drop", p, crate::drop));
        r.register("flatten", |_| curried("flatten", crate::flatten(vec![])));
        r.register("unique", |_| curried("unique", crate::unique(vec![])));
        r.register("first", |_| curried("first", crate::first(vec![])));
        r
    }

    /// Add or replace a builder.
    pub fn register(&mut self, key: &'static str, builder: Builder) {
        self.builders.insert(key, builder);
    }

    pub fn build(&self, key: &str, params: &Json) -> Result<Step, RegistryError> {
        let builder = self
            .builders
            .get(key)
            .ok_or_else(|| RegistryError::UnknownOp(key.to_string()))?;
        builder(params)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.builders.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builders.keys().copied()
    }
}

type Op = fn(Vec<Arg>) -> CoreResult<Dispatched>;

fn curried(op: &'static str, out: CoreResult<Dispatched>) -> Result<Step, RegistryError> {
    out?.into_step().ok_or(RegistryError::InvalidParam {
        op,
        param: "data",
        reason: "transform ran eagerly instead of producing a step".into(),
    })
}

fn str_param<'a>(
    op: &'static str,
    param: &'static str,
    params: &'a Json,
) -> Result<&'a str, RegistryError> {
    match params.get(param) {
        None | Some(Json::Null) => Err(RegistryError::MissingParam { op, param }),
        Some(Json::String(s)) => Ok(s.as_str()),
        Some(other) => Err(RegistryError::InvalidParam {
            op,
            param,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn predicate_step(op: &'static str, params: &Json, f: Op) -> Result<Step, RegistryError> {
    let pred = parse_predicate(str_param(op, "expr", params)?)?;
    curried(op, f(vec![Arg::Predicate(pred)]))
}

fn mapper_step(
    op: &'static str,
    param: &'static str,
    params: &Json,
    f: Op,
) -> Result<Step, RegistryError> {
    let mapper = parse_mapper(str_param(op, param, params)?)?;
    curried(op, f(vec![Arg::Mapper(mapper)]))
}

fn count_step(op: &'static str, params: &Json, f: Op) -> Result<Step, RegistryError> {
    let n = match params.get("n") {
        None | Some(Json::Null) => return Err(RegistryError::MissingParam { op, param: "n" }),
        Some(v) => v.as_u64().ok_or_else(|| RegistryError::InvalidParam {
            op,
            param: "n",
            reason: format!("expected a non-negative integer, got {v}"),
        })?,
    };
    let n = i64::try_from(n).map_err(|_| RegistryError::InvalidParam {
        op,
        param: "n",
        reason: "too large".into(),
    })?;
    curried(op, f(vec![Arg::from(n)]))
}
