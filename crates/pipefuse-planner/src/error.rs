use thiserror::Error;

use pipefuse_operators::RegistryError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("pipeline has no steps")]
    Empty,

    #[error("step #{index} ('{op}'): {source}")]
    Lower {
        index: usize,
        op: String,
        #[source]
        source: RegistryError,
    },
}
