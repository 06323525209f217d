//! Tiny expression language for data-driven pipelines.
//!
//! Predicates: `"[field] [% k] op literal"` where op ∈ {==, !=, <, <=, >, >=}
//!   e.g. `"% 2 == 0"`, `"> 2"`, `"age >= 18"`, `"name == Alice"`.
//! Mappers: `"[field] op literal"` where op ∈ {+, -, *, /, %}, or a bare
//!   `"field"` / `"."` to extract a field or the element itself.
//!
//! An omitted field (or `.`) refers to the element itself. Missing fields read
//! as `Null`, and any comparison against `Null` is false.

use std::cmp::Ordering;
use std::sync::Arc;

use pipefuse_core::arg::{Mapper, Predicate};
use pipefuse_core::error::{Error, Result};
use pipefuse_core::value::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unparseable expression '{expr}': {reason}")]
pub struct ExprError {
    pub expr: String,
    pub reason: String,
}

impl ExprError {
    fn new(expr: &str, reason: impl Into<String>) -> Self {
        Self {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Item,
    Field(String),
}

impl Operand {
    fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "." => Operand::Item,
            field => Operand::Field(field.to_string()),
        }
    }

    fn read(&self, item: &Value) -> Value {
        match self {
            Operand::Item => item.clone(),
            Operand::Field(name) => item.get(name).cloned().unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq)]
struct Comparison {
    operand: Operand,
    modulo: Option<i64>,
    op: CmpOp,
    literal: Value,
}

#[derive(Debug, Clone, PartialEq)]
enum Projection {
    Read(Operand),
    Arith {
        operand: Operand,
        op: ArithOp,
        literal: Value,
    },
}

/// Parse a predicate expression into a callable.
pub fn parse_predicate(expr: &str) -> std::result::Result<Predicate, ExprError> {
    let cmp = parse_comparison(expr)?;
    Ok(Arc::new(move |item: &Value| cmp.eval(item)))
}

/// Parse a mapper (or key extractor) expression into a callable.
pub fn parse_mapper(expr: &str) -> std::result::Result<Mapper, ExprError> {
    let proj = parse_projection(expr)?;
    Ok(Arc::new(move |item: &Value| proj.eval(item)))
}

const CMP_OPS: [(&str, CmpOp); 6] = [
    ("==", CmpOp::Eq),
    ("!=", CmpOp::Ne),
    ("<=", CmpOp::Le),
    (">=", CmpOp::Ge),
    ("<", CmpOp::Lt),
    (">", CmpOp::Gt),
];

/// Leftmost comparison operator outside quotes, as `(position, token, op)`.
fn find_operator(expr: &str) -> Option<(usize, &'static str, CmpOp)> {
    let mut quote = None;
    for (pos, c) in expr.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None => {
                let rest = &expr[pos..];
                if let Some((token, op)) = CMP_OPS.iter().find(|(t, _)| rest.starts_with(t)) {
                    return Some((pos, *token, *op));
                }
            }
        }
    }
    None
}

fn parse_comparison(expr: &str) -> std::result::Result<Comparison, ExprError> {
    let (pos, token, op) =
        find_operator(expr).ok_or_else(|| ExprError::new(expr, "no comparison operator"))?;

    let lhs = &expr[..pos];
    let literal = expr[pos + token.len()..].trim();
    if literal.is_empty() {
        return Err(ExprError::new(expr, "missing literal"));
    }

    let (operand, modulo) = match lhs.split_once('%') {
        Some((field, k)) => {
            let k = k
                .trim()
                .parse::<i64>()
                .map_err(|_| ExprError::new(expr, "modulus must be an integer"))?;
            if k == 0 {
                return Err(ExprError::new(expr, "modulus must be non-zero"));
            }
            (Operand::parse(field), Some(k))
        }
        None => (Operand::parse(lhs), None),
    };

    Ok(Comparison {
        operand,
        modulo,
        op,
        literal: parse_literal(literal),
    })
}

fn parse_projection(expr: &str) -> std::result::Result<Projection, ExprError> {
    let tokens: Vec<&str> = expr.split_whitespace().collect();
    let arith = |t: &str| match t {
        "+" => Some(ArithOp::Add),
        "-" => Some(ArithOp::Sub),
        "*" => Some(ArithOp::Mul),
        "/" => Some(ArithOp::Div),
        "%" => Some(ArithOp::Rem),
        _ => None,
    };

    let (operand, op, literal) = match tokens.as_slice() {
        [field] if arith(*field).is_none() => {
            return Ok(Projection::Read(Operand::parse(field)));
        }
        [op, lit] => (Operand::Item, *op, *lit),
        [field, op, lit] => (Operand::parse(field), *op, *lit),
        _ => return Err(ExprError::new(expr, "expected '[field] op literal'")),
    };

    let op = arith(op).ok_or_else(|| ExprError::new(expr, format!("unknown operator '{op}'")))?;
    let literal = parse_literal(literal);
    if matches!(op, ArithOp::Div | ArithOp::Rem) && literal.as_f64() == Some(0.0) {
        return Err(ExprError::new(expr, "division by zero"));
    }

    Ok(Projection::Arith {
        operand,
        op,
        literal,
    })
}

/// Literal: integer, float, bool, `null`, or (optionally quoted) string.
fn parse_literal(s: &str) -> Value {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Value::I64(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::F64(f);
    }
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            let unquoted = s
                .strip_prefix('\'')
                .and_then(|r| r.strip_suffix('\''))
                .or_else(|| s.strip_prefix('"').and_then(|r| r.strip_suffix('"')))
                .unwrap_or(s);
            Value::Str(unquoted.to_string())
        }
    }
}

impl Comparison {
    fn eval(&self, item: &Value) -> Result<bool> {
        let mut lhs = self.operand.read(item);
        if lhs.is_null() || self.literal.is_null() {
            return Ok(false);
        }

        if let Some(k) = self.modulo {
            let n = lhs.as_i64().ok_or_else(|| {
                Error::transform(format!("'%' needs an integer, got {}", lhs.type_name()))
            })?;
            lhs = Value::I64(n.rem_euclid(k));
        }

        let comparable = matches!(
            (&lhs, &self.literal),
            (Value::I64(_) | Value::F64(_), Value::I64(_) | Value::F64(_))
                | (Value::Str(_), Value::Str(_))
                | (Value::Bool(_), Value::Bool(_))
        );

        if !comparable {
            return match self.op {
                CmpOp::Eq => Ok(false),
                CmpOp::Ne => Ok(true),
                _ => Err(Error::transform(format!(
                    "cannot order {} against {}",
                    lhs.type_name(),
                    self.literal.type_name()
                ))),
            };
        }

        let ord = lhs.total_cmp(&self.literal);
        Ok(match self.op {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        })
    }
}

impl Projection {
    fn eval(&self, item: &Value) -> Result<Value> {
        match self {
            Projection::Read(operand) => Ok(operand.read(item)),
            Projection::Arith {
                operand,
                op,
                literal,
            } => arith(*op, &operand.read(item), literal),
        }
    }
}

fn arith(op: ArithOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    use Value::*;

    let overflow = || Error::transform("integer overflow");

    match (lhs, rhs) {
        (I64(a), I64(b)) => {
            let out = match op {
                ArithOp::Add => a.checked_add(*b),
                ArithOp::Sub => a.checked_sub(*b),
                ArithOp::Mul => a.checked_mul(*b),
                ArithOp::Div => a.checked_div(*b),
                ArithOp::Rem => a.checked_rem(*b),
            };
            out.map(I64).ok_or_else(overflow)
        }
        (I64(_) | F64(_), I64(_) | F64(_)) => {
            let a = lhs.as_f64().unwrap_or(f64::NAN);
            let b = rhs.as_f64().unwrap_or(f64::NAN);
            Ok(F64(match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => a / b,
                ArithOp::Rem => a % b,
            }))
        }
        (Str(a), Str(b)) if op == ArithOp::Add => Ok(Str(format!("{a}{b}"))),
        _ => Err(Error::transform(format!(
            "cannot apply {:?} to {} and {}",
            op,
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}
