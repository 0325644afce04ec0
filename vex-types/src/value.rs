use crate::decimal::DecimalValue;
use crate::interval::IntervalValue;
use crate::kind::Kind;

/// Owned scalar value of a single kind.
///
/// The kind is fixed at construction; conversions always allocate a new
/// value. Absence is expressed as `Option<Value>::None` at scalar seams —
/// there is no null variant, so a `Value` always carries a payload and an
/// empty `Binary`/`Text` is unambiguously non-null.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Decimal(DecimalValue),
    Binary(Vec<u8>),
    Text(String),
    /// Days since the Unix epoch (Arrow `Date32`).
    Date(i32),
    /// Nanoseconds since midnight (Arrow `Time64`).
    Time(i64),
    /// Nanoseconds since the Unix epoch (Arrow `Timestamp`, no zone).
    Timestamp(i64),
    Interval(IntervalValue),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Double(_) => Kind::Double,
            Value::Decimal(_) => Kind::Decimal,
            Value::Binary(_) => Kind::Binary,
            Value::Text(_) => Kind::Text,
            Value::Date(_) => Kind::Date,
            Value::Time(_) => Kind::Time,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Interval(_) => Kind::Interval,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<DecimalValue> {
        match self {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<IntervalValue> {
        match self {
            Value::Interval(v) => Some(*v),
            _ => None,
        }
    }

    /// Byte view for the two sequence kinds: the raw bytes of a `Binary`
    /// value, or the UTF-8 bytes of a `Text` value.
    pub fn sequence_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b.as_slice()),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_value {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value!(Integer, i8, i16, i32, i64);
impl_from_for_value!(Double, f32, f64);
impl_from_for_value!(Boolean, bool);
impl_from_for_value!(Decimal, DecimalValue);
impl_from_for_value!(Interval, IntervalValue);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_fixed_at_construction() {
        assert_eq!(Value::from(42i64).kind(), Kind::Integer);
        assert_eq!(Value::from(1.5f64).kind(), Kind::Double);
        assert_eq!(Value::from("apple").kind(), Kind::Text);
        assert_eq!(Value::from(b"apple".as_slice()).kind(), Kind::Binary);
    }

    #[test]
    fn empty_sequence_is_a_value_not_absence() {
        let empty_bin = Value::Binary(Vec::new());
        assert_eq!(empty_bin.kind(), Kind::Binary);
        assert_eq!(empty_bin.sequence_bytes(), Some(&[][..]));
        let empty_text = Value::Text(String::new());
        assert_eq!(empty_text.sequence_bytes(), Some(&[][..]));
    }

    #[test]
    fn sequence_bytes_views_text_as_utf8() {
        let text = Value::from("café");
        assert_eq!(text.sequence_bytes().unwrap().len(), 5);
    }
}
