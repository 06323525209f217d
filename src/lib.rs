#![forbid(unsafe_code)]
//! pipefuse: arity-dispatched transforms whose curried forms fuse into
//! single-pass, short-circuiting pipeline runs.
//!
//! This crate only stitches the workspace together: values and steps come
//! from `pipefuse-core`, the dispatcher and runtime from `pipefuse-exec`, the
//! transform catalogue from `pipefuse-operators`, and YAML pipelines from
//! `pipefuse-planner`.

pub use pipefuse_operators as ops;
pub use pipefuse_planner as planner;

pub use pipefuse_core::prelude::*;
pub use pipefuse_exec::{dispatch, pipe, Dispatched, Engine, Func, RunReport, RunStats};
