#![forbid(unsafe_code)]
//! pipefuse-exec: the arity dispatcher and the fusing pipeline runtime.
//!
//! Execution is synchronous and single-threaded. Each top-level run builds
//! its own evaluators; nothing is shared between runs.

pub mod dispatch;
pub mod metrics;
pub mod runtime;

pub use dispatch::{dispatch, Dispatched, Func};
pub use metrics::RunStats;
pub use runtime::{pipe, process_element, Engine, Flow, RunReport};
