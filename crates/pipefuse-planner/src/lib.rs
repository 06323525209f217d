#![forbid(unsafe_code)]
//! pipefuse-planner: from (YAML) pipeline descriptions → `PipelineSpec`
//! → concrete `Step`s, plus a static view of how the fuser will group them.
//!
//! Design:
//! - The DSL only names ops and their parameters; building steps is the
//!   registry's job (`pipefuse-operators::registry`).
//! - `explain` mirrors the runtime's grouping rule without executing anything.

pub mod dsl;
pub mod error;
pub mod explain;
pub mod logical;
pub mod lower;

pub use dsl::yaml::{parse_yaml_pipeline, ParsedPipeline, PipelineConfig};
pub use error::PlanError;
pub use explain::{explain, Segment};
pub use logical::{PipelineSpec, StepSpec};
pub use lower::lower;
