//! Lower a `PipelineSpec` to executable steps via the operator registry.

use pipefuse_core::step::Step;
use pipefuse_operators::Registry;

use crate::error::PlanError;
use crate::logical::PipelineSpec;

pub fn lower(spec: &PipelineSpec, registry: &Registry) -> Result<Vec<Step>, PlanError> {
    spec.steps
        .iter()
        .enumerate()
        .map(|(index, s)| {
            registry
                .build(&s.op, &s.params_json())
                .map_err(|source| PlanError::Lower {
                    index,
                    op: s.op.clone(),
                    source,
                })
        })
        .collect()
}
