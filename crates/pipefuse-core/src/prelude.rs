//! Convenient re-exports for downstream crates.

pub use crate::arg::{Arg, IndexedMapper, Mapper, Params, Predicate};
pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result};
pub use crate::eval::{Emit, Evaluation, Evaluator, EvaluatorFactory, FnEvaluator};
pub use crate::hash::Hash256;
pub use crate::manifest::{ManifestId, RunManifest};
pub use crate::step::{run_len, ApplyFn, Step};
pub use crate::value::{Shape, Value};
