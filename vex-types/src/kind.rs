use arrow::datatypes::{DataType, IntervalUnit, TimeUnit};

use crate::decimal::MAX_DECIMAL_PRECISION;

/// Discriminant of the typed value union.
///
/// `Null` is the kind of an untyped null literal (and of an all-null
/// column whose kind was never declared); it coerces to any other kind
/// without ever producing a non-null element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Double,
    Decimal,
    Binary,
    Text,
    Date,
    Time,
    Timestamp,
    Interval,
}

impl Kind {
    /// Map an Arrow data type onto the engine kind it is evaluated as.
    ///
    /// Narrow integer and float types fold into the engine's 64-bit
    /// representations; unsupported Arrow types return `None`.
    pub fn from_data_type(dt: &DataType) -> Option<Kind> {
        match dt {
            DataType::Null => Some(Kind::Null),
            DataType::Boolean => Some(Kind::Boolean),
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
                Some(Kind::Integer)
            }
            DataType::Float32 | DataType::Float64 => Some(Kind::Double),
            DataType::Decimal128(_, _) => Some(Kind::Decimal),
            DataType::Binary | DataType::LargeBinary => Some(Kind::Binary),
            DataType::Utf8 | DataType::LargeUtf8 => Some(Kind::Text),
            DataType::Date32 => Some(Kind::Date),
            DataType::Time64(TimeUnit::Nanosecond) => Some(Kind::Time),
            DataType::Timestamp(TimeUnit::Nanosecond, None) => Some(Kind::Timestamp),
            DataType::Interval(IntervalUnit::MonthDayNano) => Some(Kind::Interval),
            _ => None,
        }
    }

    /// Canonical Arrow data type for columns of this kind.
    pub fn data_type(self) -> DataType {
        match self {
            Kind::Null => DataType::Null,
            Kind::Boolean => DataType::Boolean,
            Kind::Integer => DataType::Int64,
            Kind::Double => DataType::Float64,
            Kind::Decimal => DataType::Decimal128(MAX_DECIMAL_PRECISION, 0),
            Kind::Binary => DataType::Binary,
            Kind::Text => DataType::Utf8,
            Kind::Date => DataType::Date32,
            Kind::Time => DataType::Time64(TimeUnit::Nanosecond),
            Kind::Timestamp => DataType::Timestamp(TimeUnit::Nanosecond, None),
            Kind::Interval => DataType::Interval(IntervalUnit::MonthDayNano),
        }
    }

    /// True for the three numeric kinds that participate in promotion.
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Integer | Kind::Double | Kind::Decimal)
    }

    /// True for kinds whose payload is a byte or codepoint sequence.
    #[inline]
    pub fn is_sequence(self) -> bool {
        matches!(self, Kind::Binary | Kind::Text)
    }

    /// True for the calendar/clock kinds.
    #[inline]
    pub fn is_temporal(self) -> bool {
        matches!(self, Kind::Date | Kind::Time | Kind::Timestamp)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Null => "NULL",
            Kind::Boolean => "BOOLEAN",
            Kind::Integer => "INTEGER",
            Kind::Double => "DOUBLE",
            Kind::Decimal => "DECIMAL",
            Kind::Binary => "BINARY",
            Kind::Text => "TEXT",
            Kind::Date => "DATE",
            Kind::Time => "TIME",
            Kind::Timestamp => "TIMESTAMP",
            Kind::Interval => "INTERVAL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_round_trip() {
        for kind in [
            Kind::Null,
            Kind::Boolean,
            Kind::Integer,
            Kind::Double,
            Kind::Decimal,
            Kind::Binary,
            Kind::Text,
            Kind::Date,
            Kind::Time,
            Kind::Timestamp,
            Kind::Interval,
        ] {
            assert_eq!(Kind::from_data_type(&kind.data_type()), Some(kind));
        }
    }

    #[test]
    fn narrow_types_fold_into_engine_kinds() {
        assert_eq!(Kind::from_data_type(&DataType::Int32), Some(Kind::Integer));
        assert_eq!(Kind::from_data_type(&DataType::Float32), Some(Kind::Double));
        assert_eq!(Kind::from_data_type(&DataType::LargeUtf8), Some(Kind::Text));
    }

    #[test]
    fn unsupported_types_are_rejected() {
        assert_eq!(Kind::from_data_type(&DataType::UInt64), None);
        assert_eq!(
            Kind::from_data_type(&DataType::Time32(TimeUnit::Second)),
            None
        );
    }
}
