use vex_types::{DecimalValue, IntervalValue, Kind};

/// A literal value carried by the expression tree.
///
/// Each variant maps onto exactly one engine kind; `Null` is the untyped
/// null whose kind is resolved by the operator context it appears in.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(DecimalValue),
    String(String),
    Binary(Vec<u8>),
    /// Days since the Unix epoch.
    Date32(i32),
    /// Nanoseconds since midnight.
    Time64(i64),
    /// Nanoseconds since the Unix epoch, no time zone.
    Timestamp(i64),
    Interval(IntervalValue),
}

impl Literal {
    pub fn kind(&self) -> Kind {
        match self {
            Literal::Null => Kind::Null,
            Literal::Boolean(_) => Kind::Boolean,
            Literal::Integer(_) => Kind::Integer,
            Literal::Float(_) => Kind::Double,
            Literal::Decimal(_) => Kind::Decimal,
            Literal::String(_) => Kind::Text,
            Literal::Binary(_) => Kind::Binary,
            Literal::Date32(_) => Kind::Date,
            Literal::Time64(_) => Kind::Time,
            Literal::Timestamp(_) => Kind::Timestamp,
            Literal::Interval(_) => Kind::Interval,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

macro_rules! impl_from_for_literal {
    ($variant:ident, $($t:ty),*) => {
        $(
            impl From<$t> for Literal {
                fn from(v: $t) -> Self {
                    Literal::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_literal!(Integer, i8, i16, i32, i64);
impl_from_for_literal!(Float, f32, f64);
impl_from_for_literal!(Boolean, bool);
impl_from_for_literal!(Decimal, DecimalValue);
impl_from_for_literal!(Interval, IntervalValue);

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::String(v)
    }
}

impl From<&[u8]> for Literal {
    fn from(v: &[u8]) -> Self {
        Literal::Binary(v.to_vec())
    }
}

impl From<Vec<u8>> for Literal {
    fn from(v: Vec<u8>) -> Self {
        Literal::Binary(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_impls_pick_the_expected_variant() {
        assert_eq!(Literal::from(5i32), Literal::Integer(5));
        assert_eq!(Literal::from(2.5f64), Literal::Float(2.5));
        assert_eq!(Literal::from("x"), Literal::String("x".into()));
        assert_eq!(
            Literal::from(b"x".as_slice()),
            Literal::Binary(vec![b'x'])
        );
    }

    #[test]
    fn kinds_line_up() {
        assert_eq!(Literal::Null.kind(), Kind::Null);
        assert_eq!(Literal::Date32(0).kind(), Kind::Date);
        assert_eq!(
            Literal::Interval(IntervalValue::new(0, 1, 0)).kind(),
            Kind::Interval
        );
    }
}
