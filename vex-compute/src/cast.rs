//! Per-value cast kernels.
//!
//! Edge validity is checked statically by [`crate::coerce::check_cast`];
//! this module handles individual values and reports every data-dependent
//! failure as [`Error::CastError`]. The dispatcher maps those onto null
//! elements when the cast is a `TRY_CAST`.

use std::str::FromStr;

use vex_result::{Error, Result};
use vex_types::{DecimalValue, Kind, Value};

use crate::{decimal, temporal};

/// Convert one non-null value to `target`, allocating a new value.
pub fn cast_value(value: &Value, target: Kind) -> Result<Value> {
    if value.kind() == target {
        return Ok(value.clone());
    }
    match (value, target) {
        (Value::Boolean(b), Kind::Integer) => Ok(Value::Integer(i64::from(*b))),
        (Value::Boolean(b), Kind::Text) => Ok(Value::Text(b.to_string())),
        (Value::Boolean(b), Kind::Binary) => Ok(Value::Binary(b.to_string().into_bytes())),

        (Value::Integer(i), Kind::Boolean) => Ok(Value::Boolean(*i != 0)),
        (Value::Integer(i), Kind::Double) => Ok(Value::Double(*i as f64)),
        (Value::Integer(i), Kind::Decimal) => Ok(Value::Decimal(DecimalValue::from_i64(*i))),
        (Value::Integer(i), Kind::Text) => Ok(Value::Text(i.to_string())),
        (Value::Integer(i), Kind::Binary) => Ok(Value::Binary(i.to_string().into_bytes())),

        (Value::Double(f), Kind::Integer) => double_to_integer(*f),
        (Value::Double(f), Kind::Decimal) => double_to_decimal(*f),
        (Value::Double(f), Kind::Text) => Ok(Value::Text(format_double(*f))),
        (Value::Double(f), Kind::Binary) => Ok(Value::Binary(format_double(*f).into_bytes())),

        (Value::Decimal(d), Kind::Integer) => decimal_to_integer(*d),
        (Value::Decimal(d), Kind::Double) => Ok(Value::Double(d.to_f64())),
        (Value::Decimal(d), Kind::Text) => Ok(Value::Text(d.to_string())),
        (Value::Decimal(d), Kind::Binary) => Ok(Value::Binary(d.to_string().into_bytes())),

        (Value::Binary(bytes), Kind::Text) => Ok(Value::Text(decode_binary(bytes))),
        // Every other Binary edge decodes to text first, then parses.
        (
            Value::Binary(bytes),
            Kind::Boolean
            | Kind::Integer
            | Kind::Double
            | Kind::Decimal
            | Kind::Date
            | Kind::Time
            | Kind::Timestamp,
        ) => cast_value(&Value::Text(decode_binary(bytes)), target),

        (Value::Text(s), Kind::Boolean) => text_to_boolean(s),
        (Value::Text(s), Kind::Integer) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| Error::cast(format!("'{s}' is not a valid INTEGER"))),
        (Value::Text(s), Kind::Double) => s
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| Error::cast(format!("'{s}' is not a valid DOUBLE"))),
        (Value::Text(s), Kind::Decimal) => DecimalValue::from_str(s.trim())
            .map(Value::Decimal)
            .map_err(|err| Error::cast(format!("'{s}' is not a valid DECIMAL: {err}"))),
        (Value::Text(s), Kind::Binary) => Ok(Value::Binary(s.as_bytes().to_vec())),
        (Value::Text(s), Kind::Date) => temporal::parse_date32(s).map(Value::Date),
        (Value::Text(s), Kind::Time) => temporal::parse_time64(s).map(Value::Time),
        (Value::Text(s), Kind::Timestamp) => temporal::parse_timestamp(s).map(Value::Timestamp),

        (Value::Date(d), Kind::Text) => temporal::format_date32(*d).map(Value::Text),
        (Value::Date(d), Kind::Timestamp) => i64::from(*d)
            .checked_mul(temporal::NANOS_PER_DAY)
            .map(Value::Timestamp)
            .ok_or_else(|| Error::cast(format!("date {d} out of TIMESTAMP range"))),

        (Value::Time(t), Kind::Text) => temporal::format_time64(*t).map(Value::Text),

        (Value::Timestamp(t), Kind::Text) => temporal::format_timestamp(*t).map(Value::Text),
        (Value::Timestamp(t), Kind::Date) => {
            // Truncate toward midnight, so pre-epoch timestamps land on
            // the day they belong to.
            let days = t.div_euclid(temporal::NANOS_PER_DAY);
            i32::try_from(days)
                .map(Value::Date)
                .map_err(|_| Error::cast(format!("timestamp {t} out of DATE range")))
        }

        (Value::Interval(i), Kind::Text) => Ok(Value::Text(temporal::format_interval(*i))),

        (value, target) => Err(Error::Internal(format!(
            "no cast kernel from {} to {target}",
            value.kind()
        ))),
    }
}

/// `LENGTH` of a sequence value: bytes for `Binary`, codepoints for
/// `Text`.
pub fn length_value(value: &Value) -> Result<i64> {
    match value {
        Value::Binary(bytes) => Ok(bytes.len() as i64),
        Value::Text(s) => Ok(s.chars().count() as i64),
        other => Err(Error::Internal(format!(
            "length kernel received a {} operand",
            other.kind()
        ))),
    }
}

fn double_to_integer(f: f64) -> Result<Value> {
    if !f.is_finite() {
        return Err(Error::cast(format!("cannot cast {f} to INTEGER")));
    }
    let rounded = f.round();
    if rounded < -9_223_372_036_854_775_808.0 || rounded >= 9_223_372_036_854_775_808.0 {
        return Err(Error::cast(format!("{f} is out of INTEGER range")));
    }
    Ok(Value::Integer(rounded as i64))
}

fn double_to_decimal(f: f64) -> Result<Value> {
    if !f.is_finite() {
        return Err(Error::cast(format!("cannot cast {f} to DECIMAL")));
    }
    // The shortest decimal rendering of the double is the scale the
    // value is carried at; exponent renderings fall outside Decimal128.
    let text = format_double(f);
    DecimalValue::from_str(&text)
        .map(Value::Decimal)
        .map_err(|_| Error::cast(format!("{f} is not representable as DECIMAL")))
}

fn decimal_to_integer(d: DecimalValue) -> Result<Value> {
    let rounded = decimal::rescale_with_rounding(d, 0)
        .map_err(|err| Error::cast(format!("cannot cast {d} to INTEGER: {err}")))?;
    i64::try_from(rounded.raw_value())
        .map(Value::Integer)
        .map_err(|_| Error::cast(format!("{d} is out of INTEGER range")))
}

fn text_to_boolean(s: &str) -> Result<Value> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        _ => Err(Error::cast(format!("'{s}' is not a valid BOOLEAN"))),
    }
}

/// Decode binary payloads for the text side: UTF-8 when valid, byte per
/// codepoint otherwise.
fn decode_binary(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn format_double(f: f64) -> String {
    // `{}` on an integral double prints without a fractional part, which
    // would read back as an INTEGER literal.
    if f == f.trunc() && f.is_finite() && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips() {
        assert_eq!(
            cast_value(&Value::Integer(42), Kind::Text).unwrap(),
            Value::Text("42".into())
        );
        assert_eq!(
            cast_value(&Value::Text(" 42 ".into()), Kind::Integer).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            cast_value(&Value::Double(2.5), Kind::Text).unwrap(),
            Value::Text("2.5".into())
        );
        assert_eq!(
            cast_value(&Value::Double(3.0), Kind::Text).unwrap(),
            Value::Text("3.0".into())
        );
    }

    #[test]
    fn invalid_text_fails_loudly() {
        let err = cast_value(&Value::Text("apple".into()), Kind::Integer).unwrap_err();
        assert!(matches!(err, Error::CastError(_)));
        let err = cast_value(&Value::Text("2023-13-40".into()), Kind::Date).unwrap_err();
        assert!(matches!(err, Error::CastError(_)));
    }

    #[test]
    fn double_to_integer_rounds() {
        assert_eq!(
            cast_value(&Value::Double(2.5), Kind::Integer).unwrap(),
            Value::Integer(3)
        );
        assert_eq!(
            cast_value(&Value::Double(-2.5), Kind::Integer).unwrap(),
            Value::Integer(-3)
        );
        assert!(cast_value(&Value::Double(1e300), Kind::Integer).is_err());
        assert!(cast_value(&Value::Double(f64::NAN), Kind::Integer).is_err());
    }

    #[test]
    fn decimal_to_integer_rounds_half_away() {
        let d: Value = "2.5".parse::<DecimalValue>().unwrap().into();
        assert_eq!(cast_value(&d, Kind::Integer).unwrap(), Value::Integer(3));
        let neg: Value = "-2.5".parse::<DecimalValue>().unwrap().into();
        assert_eq!(cast_value(&neg, Kind::Integer).unwrap(), Value::Integer(-3));
    }

    #[test]
    fn double_to_decimal_keeps_shortest_scale() {
        let out = cast_value(&Value::Double(0.1), Kind::Decimal).unwrap();
        assert_eq!(out, Value::Decimal("0.1".parse().unwrap()));
        let whole = cast_value(&Value::Double(3.0), Kind::Decimal).unwrap();
        assert_eq!(whole, Value::Decimal("3.0".parse().unwrap()));
    }

    #[test]
    fn temporal_text_round_trips() {
        let date = cast_value(&Value::Text("2024-02-29".into()), Kind::Date).unwrap();
        assert_eq!(
            cast_value(&date, Kind::Text).unwrap(),
            Value::Text("2024-02-29".into())
        );
        let ts = cast_value(&Value::Text("2024-02-29 12:00:00".into()), Kind::Timestamp).unwrap();
        assert_eq!(
            cast_value(&ts, Kind::Text).unwrap(),
            Value::Text("2024-02-29 12:00:00".into())
        );
        assert_eq!(cast_value(&ts, Kind::Date).unwrap(), date);
    }

    #[test]
    fn date_to_timestamp_is_midnight() {
        let date = Value::Date(temporal::parse_date32("2024-01-02").unwrap());
        let ts = cast_value(&date, Kind::Timestamp).unwrap();
        assert_eq!(
            cast_value(&ts, Kind::Text).unwrap(),
            Value::Text("2024-01-02 00:00:00".into())
        );
    }

    #[test]
    fn binary_parses_through_the_text_decode() {
        assert_eq!(
            cast_value(&Value::Binary(b"42".to_vec()), Kind::Integer).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            cast_value(&Value::Binary(b"2.5".to_vec()), Kind::Double).unwrap(),
            Value::Double(2.5)
        );
        assert_eq!(
            cast_value(&Value::Binary(b"true".to_vec()), Kind::Boolean).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            cast_value(&Value::Binary(b"2024-02-29".to_vec()), Kind::Date).unwrap(),
            cast_value(&Value::Text("2024-02-29".into()), Kind::Date).unwrap()
        );
        let err = cast_value(&Value::Binary(b"apple".to_vec()), Kind::Integer).unwrap_err();
        assert!(matches!(err, Error::CastError(_)));
    }

    #[test]
    fn scalars_stringify_into_binary() {
        assert_eq!(
            cast_value(&Value::Integer(42), Kind::Binary).unwrap(),
            Value::Binary(b"42".to_vec())
        );
        assert_eq!(
            cast_value(&Value::Double(3.0), Kind::Binary).unwrap(),
            Value::Binary(b"3.0".to_vec())
        );
        assert_eq!(
            cast_value(&Value::Boolean(false), Kind::Binary).unwrap(),
            Value::Binary(b"false".to_vec())
        );
        let d: Value = "19.99".parse::<DecimalValue>().unwrap().into();
        assert_eq!(
            cast_value(&d, Kind::Binary).unwrap(),
            Value::Binary(b"19.99".to_vec())
        );
    }

    #[test]
    fn binary_text_pairing() {
        let bytes = cast_value(&Value::Text("café".into()), Kind::Binary).unwrap();
        assert_eq!(bytes, Value::Binary("café".as_bytes().to_vec()));
        assert_eq!(
            cast_value(&bytes, Kind::Text).unwrap(),
            Value::Text("café".into())
        );
        let non_utf8 = Value::Binary(vec![0xFF]);
        assert_eq!(
            cast_value(&non_utf8, Kind::Text).unwrap(),
            Value::Text("ÿ".into())
        );
    }

    #[test]
    fn length_counts_bytes_versus_codepoints() {
        assert_eq!(length_value(&Value::Text("café".into())).unwrap(), 4);
        assert_eq!(
            length_value(&Value::Binary("café".as_bytes().to_vec())).unwrap(),
            5
        );
        assert_eq!(length_value(&Value::Text(String::new())).unwrap(), 0);
    }
}
