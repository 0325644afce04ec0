//! Static coercion rules shared by every kernel.
//!
//! All decisions here are functions of operand kinds alone; no data is
//! consulted. The implicit lattice is deliberately narrow: `Integer`
//! widens to `Double` or `Decimal`, `Binary` pairs with `Text` for
//! comparisons and patterns, and nothing else converts silently. In
//! particular `Double` and `Decimal` never mix implicitly, since pushing
//! an exact decimal through binary floating point would silently trade
//! away its exactness.

use vex_expr::BinaryOp;
use vex_result::{Error, Result};
use vex_types::Kind;

/// Common kind two operands are brought to before an ordinal comparison.
///
/// `Null` operands defer to the other side. Mixed `Binary`/`Text`
/// operands compare as `Binary`, which is byte order and, UTF-8 being
/// what it is, codepoint order for the text side.
pub fn comparison_kind(lhs: Kind, rhs: Kind) -> Result<Kind> {
    if lhs == Kind::Null {
        return Ok(rhs);
    }
    if rhs == Kind::Null {
        return Ok(lhs);
    }
    if lhs == rhs {
        return Ok(lhs);
    }
    match (lhs, rhs) {
        (Kind::Integer, Kind::Double) | (Kind::Double, Kind::Integer) => Ok(Kind::Double),
        (Kind::Integer, Kind::Decimal) | (Kind::Decimal, Kind::Integer) => Ok(Kind::Decimal),
        (Kind::Binary, Kind::Text) | (Kind::Text, Kind::Binary) => Ok(Kind::Binary),
        _ => Err(Error::type_mismatch(format!(
            "cannot compare {lhs} with {rhs}"
        ))),
    }
}

/// Result kind of a binary arithmetic or logical operator.
///
/// A `Null` operand of an arithmetic operator makes the whole result
/// untyped null; `AND`/`OR` keep a `Boolean` result so three-valued
/// logic still applies. Interval-with-interval arithmetic is rejected,
/// which keeps `(date - date) + interval` unambiguous: the subtraction
/// already produced an interval, and there is exactly one way to read
/// the rest.
pub fn arithmetic_kind(op: BinaryOp, lhs: Kind, rhs: Kind) -> Result<Kind> {
    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        return match (lhs, rhs) {
            (Kind::Boolean | Kind::Null, Kind::Boolean | Kind::Null) => Ok(Kind::Boolean),
            _ => Err(Error::type_mismatch(format!(
                "{} requires BOOLEAN operands, found {lhs} and {rhs}",
                op_name(op)
            ))),
        };
    }

    if lhs == Kind::Null || rhs == Kind::Null {
        return Ok(Kind::Null);
    }

    if lhs.is_numeric() && rhs.is_numeric() {
        let promoted = match (lhs, rhs) {
            (Kind::Double, Kind::Decimal) | (Kind::Decimal, Kind::Double) => {
                return Err(Error::type_mismatch(
                    "DOUBLE and DECIMAL do not combine implicitly; cast one operand explicitly",
                ));
            }
            (Kind::Double, _) | (_, Kind::Double) => Kind::Double,
            (Kind::Decimal, _) | (_, Kind::Decimal) => Kind::Decimal,
            _ => Kind::Integer,
        };
        // Division is true division: integer operands promote to double.
        if op == BinaryOp::Divide && promoted == Kind::Integer {
            return Ok(Kind::Double);
        }
        return Ok(promoted);
    }

    match (op, lhs, rhs) {
        (BinaryOp::Add, Kind::Date, Kind::Interval)
        | (BinaryOp::Add, Kind::Interval, Kind::Date)
        | (BinaryOp::Subtract, Kind::Date, Kind::Interval) => Ok(Kind::Date),
        (BinaryOp::Add, Kind::Timestamp, Kind::Interval)
        | (BinaryOp::Add, Kind::Interval, Kind::Timestamp)
        | (BinaryOp::Subtract, Kind::Timestamp, Kind::Interval) => Ok(Kind::Timestamp),
        (BinaryOp::Subtract, Kind::Date, Kind::Date)
        | (BinaryOp::Subtract, Kind::Timestamp, Kind::Timestamp) => Ok(Kind::Interval),
        _ => Err(Error::type_mismatch(format!(
            "cannot apply {} to {lhs} and {rhs}",
            op_name(op)
        ))),
    }
}

/// Validate a cast edge, before any data is consulted.
///
/// An unsupported edge is a structural `TypeMismatch` for safe and
/// unsafe casts alike; `TRY_CAST` only softens per-value failures.
pub fn check_cast(from: Kind, to: Kind) -> Result<()> {
    if cast_supported(from, to) {
        Ok(())
    } else {
        Err(Error::type_mismatch(format!("cannot cast {from} to {to}")))
    }
}

fn cast_supported(from: Kind, to: Kind) -> bool {
    use Kind::*;
    if from == to || from == Null {
        return true;
    }
    matches!(
        (from, to),
        (Boolean, Integer | Binary | Text)
            | (Integer, Boolean | Double | Decimal | Binary | Text)
            | (Double, Integer | Decimal | Binary | Text)
            | (Decimal, Integer | Double | Binary | Text)
            | (Binary, Boolean | Integer | Double | Decimal | Text | Date | Time | Timestamp)
            | (Text, Boolean | Integer | Double | Decimal | Binary | Date | Time | Timestamp)
            | (Date, Text | Timestamp)
            | (Time, Text)
            | (Timestamp, Text | Date)
            | (Interval, Text)
    )
}

fn op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::And => "AND",
        BinaryOp::Or => "OR",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_comparison_promotion() {
        assert_eq!(
            comparison_kind(Kind::Integer, Kind::Double).unwrap(),
            Kind::Double
        );
        assert_eq!(
            comparison_kind(Kind::Decimal, Kind::Integer).unwrap(),
            Kind::Decimal
        );
        assert!(comparison_kind(Kind::Double, Kind::Decimal).is_err());
    }

    #[test]
    fn sequence_comparison_pairs_binary_with_text() {
        assert_eq!(
            comparison_kind(Kind::Binary, Kind::Text).unwrap(),
            Kind::Binary
        );
        assert!(comparison_kind(Kind::Binary, Kind::Integer).is_err());
    }

    #[test]
    fn null_defers_to_the_other_operand() {
        assert_eq!(comparison_kind(Kind::Null, Kind::Date).unwrap(), Kind::Date);
        assert_eq!(
            arithmetic_kind(BinaryOp::Add, Kind::Null, Kind::Integer).unwrap(),
            Kind::Null
        );
    }

    #[test]
    fn integer_division_produces_double() {
        assert_eq!(
            arithmetic_kind(BinaryOp::Divide, Kind::Integer, Kind::Integer).unwrap(),
            Kind::Double
        );
        assert_eq!(
            arithmetic_kind(BinaryOp::Divide, Kind::Decimal, Kind::Integer).unwrap(),
            Kind::Decimal
        );
    }

    #[test]
    fn temporal_arithmetic_edges() {
        assert_eq!(
            arithmetic_kind(BinaryOp::Add, Kind::Date, Kind::Interval).unwrap(),
            Kind::Date
        );
        assert_eq!(
            arithmetic_kind(BinaryOp::Subtract, Kind::Date, Kind::Date).unwrap(),
            Kind::Interval
        );
        assert_eq!(
            arithmetic_kind(BinaryOp::Subtract, Kind::Timestamp, Kind::Interval).unwrap(),
            Kind::Timestamp
        );
        // Subtracting a date from an interval has no reading.
        assert!(arithmetic_kind(BinaryOp::Subtract, Kind::Interval, Kind::Date).is_err());
        // Intervals never combine with each other in arithmetic.
        assert!(arithmetic_kind(BinaryOp::Add, Kind::Interval, Kind::Interval).is_err());
    }

    #[test]
    fn logic_requires_booleans() {
        assert_eq!(
            arithmetic_kind(BinaryOp::And, Kind::Boolean, Kind::Null).unwrap(),
            Kind::Boolean
        );
        assert!(arithmetic_kind(BinaryOp::Or, Kind::Boolean, Kind::Integer).is_err());
    }

    #[test]
    fn cast_edges() {
        assert!(check_cast(Kind::Text, Kind::Date).is_ok());
        assert!(check_cast(Kind::Double, Kind::Decimal).is_ok());
        assert!(check_cast(Kind::Date, Kind::Integer).is_err());
        assert!(check_cast(Kind::Interval, Kind::Integer).is_err());
        assert!(check_cast(Kind::Null, Kind::Timestamp).is_ok());
    }

    #[test]
    fn binary_casts_mirror_text_casts() {
        for target in [
            Kind::Boolean,
            Kind::Integer,
            Kind::Double,
            Kind::Decimal,
            Kind::Date,
            Kind::Time,
            Kind::Timestamp,
        ] {
            assert!(check_cast(Kind::Binary, target).is_ok(), "BINARY to {target}");
        }
        for source in [Kind::Boolean, Kind::Integer, Kind::Double, Kind::Decimal] {
            assert!(check_cast(source, Kind::Binary).is_ok(), "{source} to BINARY");
        }
        assert!(check_cast(Kind::Date, Kind::Binary).is_err());
        assert!(check_cast(Kind::Binary, Kind::Interval).is_err());
    }
}
