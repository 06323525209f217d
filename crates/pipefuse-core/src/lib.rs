#![forbid(unsafe_code)]
//! pipefuse-core: values, the per-element evaluator protocol, pipeline steps,
//! configs, manifests, and hashing.
//!
//! Everything here is synchronous and allocation-light. Dispatching and the
//! fusing runtime live in `pipefuse-exec`; the transform catalogue lives in
//! `pipefuse-operators`.

pub mod arg;
pub mod config;
pub mod error;
pub mod eval;
pub mod hash;
pub mod manifest;
pub mod prelude;
pub mod step;
pub mod value;

/// Engine version stamped into manifests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, Result};
