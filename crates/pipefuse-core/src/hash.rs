//! Stable hashing helpers for pipelines and manifests.

use blake3::Hasher;
use serde::Serialize;

use crate::step::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.0 {
            use std::fmt::Write as _;
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

pub fn hash_bytes(bytes: &[u8]) -> Hash256 {
    let mut h = Hasher::new();
    h.update(bytes);
    let out = h.finalize();
    Hash256(out.into())
}

pub fn hash_str(s: &str) -> Hash256 {
    hash_bytes(s.as_bytes())
}

/// Hash any serde-serializable value deterministically (via JSON).
pub fn hash_serde<T: Serialize>(v: &T) -> crate::error::Result<Hash256> {
    let bytes = serde_json::to_vec(v)?;
    Ok(hash_bytes(&bytes))
}

/// Digest of a pipeline's shape: step names, fusibility, and terminal flags.
///
/// Closure arguments have no stable identity, so only data arguments of
/// fusible steps contribute beyond the shape.
pub fn hash_steps(steps: &[Step]) -> Hash256 {
    let mut h = Hasher::new();
    for step in steps {
        h.update(step.name().as_bytes());
        h.update(&[step.is_fusible() as u8, step.is_terminal() as u8]);
        if let Step::Fusible { args, .. } = step {
            for arg in args.iter() {
                if let crate::arg::Arg::Value(v) = arg {
                    h.update(&v.fingerprint());
                } else {
                    h.update(arg.kind().as_bytes());
                }
            }
        }
        h.update(&[0xff]);
    }
    Hash256(h.finalize().into())
}
