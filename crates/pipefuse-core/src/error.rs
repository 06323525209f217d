use thiserror::Error;

/// Canonical result for core and the engine built on it.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Supplied argument count fits neither the full nor the curried shape.
    #[error("arity mismatch for '{name}': expected {arity} or {} arguments, got {supplied}", .arity.saturating_sub(1))]
    ArityMismatch {
        name: &'static str,
        arity: usize,
        supplied: usize,
    },

    /// A caller-supplied transform or predicate failed. The engine never wraps
    /// or retries these.
    #[error("transform failed: {0}")]
    Transform(String),

    #[error("step '{step}' requires a sequence input")]
    NotASequence { step: &'static str },

    #[error("invalid argument for '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Hashing error: {0}")]
    Hash(String),
}

impl Error {
    pub fn transform(msg: impl Into<String>) -> Self {
        Error::Transform(msg.into())
    }

    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
