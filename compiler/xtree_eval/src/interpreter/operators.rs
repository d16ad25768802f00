//! Conversions and operators.

use xtree_ir::{builtins, BinaryOp, ConvertKind, Expr, Ty, UnaryOp, Value};

use super::{null_reference, throw, Flow, Interpreter, Unwind};
use crate::environment::Scope;
use crate::errors::type_mismatch;

fn type_name(value: &Value) -> String {
    value
        .runtime_ty()
        .map_or_else(|| "null".to_owned(), |ty| ty.to_string())
}

/// Whether `value` is a non-null instance of `ty`.
pub(super) fn type_is(value: &Value, ty: &Ty) -> bool {
    value
        .runtime_ty()
        .is_some_and(|actual| ty.is_assignable_from(&actual))
}

/// Convert `value` to `target`.
///
/// Numeric conversions change representation; reference conversions only
/// check. A failed `Cast` throws `InvalidCastException`, a failed `TypeAs`
/// yields `null`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "numeric conversions truncate like the host's explicit casts"
)]
pub(super) fn convert(kind: ConvertKind, value: Value, target: &Ty) -> Flow {
    match (&value, target) {
        (_, Ty::Void) => return Ok(Value::Void),
        (Value::Int(n), Ty::Float) => return Ok(Value::Float(*n as f64)),
        (Value::Float(x), Ty::Int) if kind == ConvertKind::Cast => {
            return Ok(Value::Int(*x as i64))
        }
        (Value::Null, ty) if ty.is_nullable() => return Ok(Value::Null),
        (Value::Null, ty) => {
            return match kind {
                ConvertKind::Cast => Err(null_reference(&format!("conversion to {ty}"))),
                ConvertKind::TypeAs => Ok(Value::Null),
            }
        }
        _ => {}
    }
    if type_is(&value, target) {
        return Ok(value);
    }
    match kind {
        ConvertKind::TypeAs => Ok(Value::Null),
        ConvertKind::Cast => Err(throw(
            builtins::invalid_cast(),
            format!(
                "Unable to cast object of type '{}' to type '{target}'.",
                type_name(&value)
            ),
        )),
    }
}

pub(super) fn unary(op: UnaryOp, value: Value) -> Flow {
    match (op, value) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnaryOp::Negate, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Not, other) => Err(type_mismatch("bool", &type_name(&other)).into()),
        (UnaryOp::Negate, other) => Err(type_mismatch("number", &type_name(&other)).into()),
    }
}

/// Text of a value when concatenated into a string.
fn concat_text(value: &Value) -> String {
    match value {
        Value::Str(s) => s.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "mixed int/float arithmetic promotes to float"
)]
fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    let value = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Value::Int(match op {
            BinaryOp::Add => a.wrapping_add(*b),
            BinaryOp::Sub => a.wrapping_sub(*b),
            BinaryOp::Mul => a.wrapping_mul(*b),
            _ => return None,
        }),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let as_float = |v: &Value| match v {
                Value::Int(n) => *n as f64,
                Value::Float(x) => *x,
                _ => 0.0,
            };
            let (a, b) = (as_float(left), as_float(right));
            Value::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ => return None,
            })
        }
        (Value::Str(_), _) | (_, Value::Str(_)) if op == BinaryOp::Add => {
            Value::str(concat_text(left) + &concat_text(right))
        }
        _ => return None,
    };
    Some(value)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "mixed int/float comparison promotes to float"
)]
fn compare(left: &Value, right: &Value) -> Option<std::cmp::Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl Interpreter {
    pub(super) fn eval_binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        scope: &Scope,
    ) -> Flow {
        let lhs = self.eval(left, scope)?;
        match op {
            BinaryOp::AndAlso | BinaryOp::OrElse => {
                let Some(l) = lhs.as_bool() else {
                    return Err(type_mismatch("bool", &type_name(&lhs)).into());
                };
                if l == (op == BinaryOp::OrElse) {
                    return Ok(Value::Bool(l));
                }
                let rhs = self.eval(right, scope)?;
                return rhs
                    .as_bool()
                    .map(Value::Bool)
                    .ok_or_else(|| type_mismatch("bool", &type_name(&rhs)).into());
            }
            _ => {}
        }
        let rhs = self.eval(right, scope)?;
        let mismatch = || -> Unwind {
            type_mismatch(&type_name(&lhs), &type_name(&rhs)).into()
        };
        match op {
            BinaryOp::Eq => Ok(Value::Bool(lhs.equals(&rhs))),
            BinaryOp::NotEq => Ok(Value::Bool(!lhs.equals(&rhs))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = compare(&lhs, &rhs).ok_or_else(mismatch)?;
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                }))
            }
            _ => arithmetic(op, &lhs, &rhs).ok_or_else(mismatch),
        }
    }
}
