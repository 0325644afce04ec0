//! Arithmetic kernels over promoted operand pairs.
//!
//! The caller has already run the operands through
//! [`crate::coerce::arithmetic_kind`]; kernels here only see pairs the
//! lattice admits. Division by zero yields a null element rather than
//! aborting the batch; integer overflow aborts, since a silently wrapped
//! sum is worse than no result.

use vex_expr::BinaryOp;
use vex_result::{Error, Result};
use vex_types::{DecimalError, DecimalValue, Kind, Value};

use crate::{decimal, temporal};

/// Apply a binary arithmetic operator to two non-null values.
///
/// `result_kind` is the statically derived kind of the output; `None`
/// marks a data-dependent null (division by zero).
pub fn arith_values(
    op: BinaryOp,
    result_kind: Kind,
    lhs: &Value,
    rhs: &Value,
) -> Result<Option<Value>> {
    match result_kind {
        Kind::Integer => {
            let (a, b) = integer_pair(lhs, rhs)?;
            let out = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                _ => return Err(kernel_mismatch(op, result_kind)),
            };
            let value =
                out.ok_or_else(|| Error::Internal(format!("integer overflow in {a} {op:?} {b}")))?;
            Ok(Some(Value::Integer(value)))
        }
        Kind::Double => {
            let a = double_operand(lhs)?;
            let b = double_operand(rhs)?;
            let out = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => {
                    if b == 0.0 {
                        return Ok(None);
                    }
                    a / b
                }
                _ => return Err(kernel_mismatch(op, result_kind)),
            };
            Ok(Some(Value::Double(out)))
        }
        Kind::Decimal => {
            let a = decimal_operand(lhs)?;
            let b = decimal_operand(rhs)?;
            let out = match op {
                BinaryOp::Add => decimal::add(a, b),
                BinaryOp::Subtract => decimal::sub(a, b),
                BinaryOp::Multiply => decimal::mul(a, b),
                BinaryOp::Divide => match decimal::div(a, b) {
                    Err(DecimalError::DivisionByZero) => return Ok(None),
                    other => other,
                },
                _ => return Err(kernel_mismatch(op, result_kind)),
            };
            let value = out.map_err(|err| Error::Internal(err.to_string()))?;
            Ok(Some(Value::Decimal(value)))
        }
        Kind::Date => {
            let out = match (op, lhs, rhs) {
                (BinaryOp::Add, Value::Date(d), Value::Interval(i))
                | (BinaryOp::Add, Value::Interval(i), Value::Date(d)) => {
                    temporal::add_interval_to_date32(*d, *i)?
                }
                (BinaryOp::Subtract, Value::Date(d), Value::Interval(i)) => {
                    temporal::sub_interval_from_date32(*d, *i)?
                }
                _ => return Err(kernel_mismatch(op, result_kind)),
            };
            Ok(Some(Value::Date(out)))
        }
        Kind::Timestamp => {
            let out = match (op, lhs, rhs) {
                (BinaryOp::Add, Value::Timestamp(t), Value::Interval(i))
                | (BinaryOp::Add, Value::Interval(i), Value::Timestamp(t)) => {
                    temporal::add_interval_to_timestamp(*t, *i)?
                }
                (BinaryOp::Subtract, Value::Timestamp(t), Value::Interval(i)) => {
                    temporal::sub_interval_from_timestamp(*t, *i)?
                }
                _ => return Err(kernel_mismatch(op, result_kind)),
            };
            Ok(Some(Value::Timestamp(out)))
        }
        Kind::Interval => {
            let out = match (op, lhs, rhs) {
                (BinaryOp::Subtract, Value::Date(a), Value::Date(b)) => {
                    temporal::date32_diff(*a, *b)?
                }
                (BinaryOp::Subtract, Value::Timestamp(a), Value::Timestamp(b)) => {
                    temporal::timestamp_diff(*a, *b)?
                }
                _ => return Err(kernel_mismatch(op, result_kind)),
            };
            Ok(Some(Value::Interval(out)))
        }
        other => Err(kernel_mismatch(op, other)),
    }
}

fn integer_pair(lhs: &Value, rhs: &Value) -> Result<(i64, i64)> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Ok((*a, *b)),
        _ => Err(Error::Internal(format!(
            "integer kernel received {} and {}",
            lhs.kind(),
            rhs.kind()
        ))),
    }
}

fn double_operand(value: &Value) -> Result<f64> {
    match value {
        Value::Double(v) => Ok(*v),
        Value::Integer(v) => Ok(*v as f64),
        other => Err(Error::Internal(format!(
            "double kernel received a {} operand",
            other.kind()
        ))),
    }
}

fn decimal_operand(value: &Value) -> Result<DecimalValue> {
    match value {
        Value::Decimal(v) => Ok(*v),
        Value::Integer(v) => Ok(DecimalValue::from_i64(*v)),
        other => Err(Error::Internal(format!(
            "decimal kernel received a {} operand",
            other.kind()
        ))),
    }
}

fn kernel_mismatch(op: BinaryOp, kind: Kind) -> Error {
    Error::Internal(format!(
        "no {op:?} kernel for result kind {kind}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vex_types::IntervalValue;

    #[test]
    fn integer_arithmetic_checks_overflow() {
        let out = arith_values(
            BinaryOp::Add,
            Kind::Integer,
            &Value::Integer(2),
            &Value::Integer(3),
        )
        .unwrap();
        assert_eq!(out, Some(Value::Integer(5)));
        let overflow = arith_values(
            BinaryOp::Add,
            Kind::Integer,
            &Value::Integer(i64::MAX),
            &Value::Integer(1),
        );
        assert!(matches!(overflow, Err(Error::Internal(_))));
    }

    #[test]
    fn division_by_zero_is_null() {
        let int_div = arith_values(
            BinaryOp::Divide,
            Kind::Double,
            &Value::Integer(1),
            &Value::Integer(0),
        )
        .unwrap();
        assert_eq!(int_div, None);
        let dec_div = arith_values(
            BinaryOp::Divide,
            Kind::Decimal,
            &Value::Decimal("1.5".parse().unwrap()),
            &Value::Decimal("0.0".parse().unwrap()),
        )
        .unwrap();
        assert_eq!(dec_div, None);
    }

    #[test]
    fn integer_division_is_true_division() {
        let out = arith_values(
            BinaryOp::Divide,
            Kind::Double,
            &Value::Integer(7),
            &Value::Integer(2),
        )
        .unwrap();
        assert_eq!(out, Some(Value::Double(3.5)));
    }

    #[test]
    fn mixed_integer_decimal_promotes() {
        let out = arith_values(
            BinaryOp::Multiply,
            Kind::Decimal,
            &Value::Integer(3),
            &Value::Decimal("1.50".parse().unwrap()),
        )
        .unwrap();
        assert_eq!(out, Some(Value::Decimal("4.50".parse().unwrap())));
    }

    #[test]
    fn date_interval_round_trip() {
        let base = temporal::parse_date32("2024-01-15").unwrap();
        let month = IntervalValue::new(1, 0, 0);
        let plus = arith_values(
            BinaryOp::Add,
            Kind::Date,
            &Value::Date(base),
            &Value::Interval(month),
        )
        .unwrap();
        assert_eq!(
            plus,
            Some(Value::Date(temporal::parse_date32("2024-02-15").unwrap()))
        );
        let diff = arith_values(
            BinaryOp::Subtract,
            Kind::Interval,
            &Value::Date(temporal::parse_date32("2024-02-15").unwrap()),
            &Value::Date(base),
        )
        .unwrap();
        assert_eq!(diff, Some(Value::Interval(IntervalValue::new(0, 31, 0))));
    }
}
