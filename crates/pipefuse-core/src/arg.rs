//! Arguments supplied to dispatchable functions.
//!
//! The data argument is always a plain `Value`; the trailing parameters may
//! also be caller-supplied closures.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::Value;

pub type Predicate = Arc<dyn Fn(&Value) -> Result<bool> + Send + Sync>;
pub type Mapper = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;
pub type IndexedMapper = Arc<dyn Fn(&Value, usize) -> Result<Value> + Send + Sync>;

#[derive(Clone)]
pub enum Arg {
    Value(Value),
    Predicate(Predicate),
    Mapper(Mapper),
    IndexedMapper(IndexedMapper),
}

impl Arg {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<bool> + Send + Sync + 'static,
    {
        Arg::Predicate(Arc::new(f))
    }

    pub fn mapper<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Arg::Mapper(Arc::new(f))
    }

    pub fn indexed_mapper<F>(f: F) -> Self
    where
        F: Fn(&Value, usize) -> Result<Value> + Send + Sync + 'static,
    {
        Arg::IndexedMapper(Arc::new(f))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Value(_) => "value",
            Arg::Predicate(_) => "predicate",
            Arg::Mapper(_) => "mapper",
            Arg::IndexedMapper(_) => "indexed mapper",
        }
    }

    /// Consume a data argument. Closures are rejected.
    pub fn into_value(self, name: &'static str) -> Result<Value> {
        match self {
            Arg::Value(v) => Ok(v),
            other => Err(Error::invalid_argument(
                name,
                format!("expected a data value, got a {}", other.kind()),
            )),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

macro_rules! arg_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Value(Value::from(v))
                }
            }
        )*
    };
}

arg_from_value!(Value, i64, i32, f64, bool, &str, String);

impl<T: Into<Value>> From<Vec<T>> for Arg {
    fn from(items: Vec<T>) -> Self {
        Arg::Value(Value::from(items))
    }
}

/// Typed accessors over a captured argument list.
///
/// `name` is the owning function, used in error messages.
pub struct Params<'a> {
    name: &'static str,
    args: &'a [Arg],
}

impl<'a> Params<'a> {
    pub fn new(name: &'static str, args: &'a [Arg]) -> Self {
        Self { name, args }
    }

    fn get(&self, pos: usize) -> Result<&'a Arg> {
        self.args.get(pos).ok_or_else(|| {
            Error::invalid_argument(self.name, format!("missing argument #{}", pos + 1))
        })
    }

    fn mismatch(&self, pos: usize, want: &str, got: &Arg) -> Error {
        Error::invalid_argument(
            self.name,
            format!("argument #{} must be a {}, got a {}", pos + 1, want, got.kind()),
        )
    }

    pub fn predicate(&self, pos: usize) -> Result<Predicate> {
        match self.get(pos)? {
            Arg::Predicate(p) => Ok(Arc::clone(p)),
            other => Err(self.mismatch(pos, "predicate", other)),
        }
    }

    pub fn mapper(&self, pos: usize) -> Result<Mapper> {
        match self.get(pos)? {
            Arg::Mapper(m) => Ok(Arc::clone(m)),
            other => Err(self.mismatch(pos, "mapper", other)),
        }
    }

    pub fn indexed_mapper(&self, pos: usize) -> Result<IndexedMapper> {
        match self.get(pos)? {
            Arg::IndexedMapper(m) => Ok(Arc::clone(m)),
            other => Err(self.mismatch(pos, "indexed mapper", other)),
        }
    }

    /// Non-negative integer parameter (counts).
    pub fn count(&self, pos: usize) -> Result<usize> {
        match self.get(pos)? {
            Arg::Value(v) => v
                .as_i64()
                .filter(|n| *n >= 0)
                .map(|n| n as usize)
                .ok_or_else(|| {
                    Error::invalid_argument(
                        self.name,
                        format!("argument #{} must be a non-negative integer", pos + 1),
                    )
                }),
            other => Err(self.mismatch(pos, "value", other)),
        }
    }
}
