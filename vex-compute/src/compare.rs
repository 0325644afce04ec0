//! Ordinal comparison kernels.
//!
//! Every kind with an ordering compares through a single ordinal: byte
//! order for sequences, chronological order for temporal kinds, total
//! duration for intervals. Mixed integer/double operands are compared
//! exactly, without rounding the integer through `f64`, so `42 = 42.0`
//! holds and `9007199254740993 = 9007199254740992.0` does not.

use std::cmp::Ordering;

use vex_expr::CompareOp;
use vex_result::{Error, Result};
use vex_types::{DecimalValue, Kind, Value};

/// Compare two non-null values under the coerced comparison kind.
///
/// `None` from the inner ordering means the pair is unordered (a NaN
/// operand); every operator except `!=` is then false.
pub fn compare_values(op: CompareOp, key: Kind, lhs: &Value, rhs: &Value) -> Result<bool> {
    let ordering = ordinal(key, lhs, rhs)?;
    Ok(match ordering {
        Some(ord) => match op {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::NotEq => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::LtEq => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::GtEq => ord != Ordering::Less,
        },
        None => op == CompareOp::NotEq,
    })
}

fn ordinal(key: Kind, lhs: &Value, rhs: &Value) -> Result<Option<Ordering>> {
    let out = match key {
        Kind::Boolean => match (lhs, rhs) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => return Err(operand_mismatch(key, lhs, rhs)),
        },
        Kind::Integer => match (lhs, rhs) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            _ => return Err(operand_mismatch(key, lhs, rhs)),
        },
        Kind::Double => match (lhs, rhs) {
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Double(b)) => cmp_i64_f64(*a, *b),
            (Value::Double(a), Value::Integer(b)) => {
                cmp_i64_f64(*b, *a).map(Ordering::reverse)
            }
            _ => return Err(operand_mismatch(key, lhs, rhs)),
        },
        Kind::Decimal => {
            let a = as_decimal(lhs).ok_or_else(|| operand_mismatch(key, lhs, rhs))?;
            let b = as_decimal(rhs).ok_or_else(|| operand_mismatch(key, lhs, rhs))?;
            Some(a.cmp(&b))
        }
        Kind::Binary | Kind::Text => {
            let a = lhs
                .sequence_bytes()
                .ok_or_else(|| operand_mismatch(key, lhs, rhs))?;
            let b = rhs
                .sequence_bytes()
                .ok_or_else(|| operand_mismatch(key, lhs, rhs))?;
            Some(a.cmp(b))
        }
        Kind::Date => match (lhs, rhs) {
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            _ => return Err(operand_mismatch(key, lhs, rhs)),
        },
        Kind::Time => match (lhs, rhs) {
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            _ => return Err(operand_mismatch(key, lhs, rhs)),
        },
        Kind::Timestamp => match (lhs, rhs) {
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => return Err(operand_mismatch(key, lhs, rhs)),
        },
        Kind::Interval => match (lhs, rhs) {
            (Value::Interval(a), Value::Interval(b)) => {
                Some(a.total_nanos().cmp(&b.total_nanos()))
            }
            _ => return Err(operand_mismatch(key, lhs, rhs)),
        },
        Kind::Null => return Err(Error::Internal("null kind reached a comparison kernel".into())),
    };
    Ok(out)
}

fn as_decimal(value: &Value) -> Option<DecimalValue> {
    match value {
        Value::Decimal(d) => Some(*d),
        Value::Integer(i) => Some(DecimalValue::from_i64(*i)),
        _ => None,
    }
}

/// Exact ordering of an `i64` against an `f64`.
///
/// Doubles at or beyond `2^63` in magnitude are outside (or at the very
/// edge of) the `i64` range and resolve immediately; anything closer has
/// an exactly representable truncation, which is compared first with the
/// fractional part as tiebreak. `-0.0` therefore equals `0`.
pub fn cmp_i64_f64(lhs: i64, rhs: f64) -> Option<Ordering> {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if rhs.is_nan() {
        return None;
    }
    if rhs >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if rhs < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    // rhs is in [-2^63, 2^63), so trunc() converts to i64 exactly.
    let trunc = rhs.trunc();
    let trunc_int = trunc as i64;
    match lhs.cmp(&trunc_int) {
        Ordering::Equal => {
            let frac = rhs - trunc;
            if frac > 0.0 {
                Some(Ordering::Less)
            } else if frac < 0.0 {
                Some(Ordering::Greater)
            } else {
                Some(Ordering::Equal)
            }
        }
        other => Some(other),
    }
}

fn operand_mismatch(key: Kind, lhs: &Value, rhs: &Value) -> Error {
    Error::Internal(format!(
        "comparison kernel for {key} received {} and {}",
        lhs.kind(),
        rhs.kind()
    ))
}
