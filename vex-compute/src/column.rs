//! Typed view over an Arrow array, one variant per engine kind.
//!
//! Kernels never match on `DataType` at the element level; a column is
//! classified once on entry and every per-row access goes through the
//! already-resolved variant. Narrow Arrow types (`Int32`, `Float32`,
//! small string/binary offsets) are widened to the engine's canonical
//! layouts during classification.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BinaryArray, BinaryBuilder, BooleanArray, BooleanBuilder, Date32Array,
    Date32Builder, Decimal128Array, Decimal128Builder, Float64Array, Float64Builder, Int64Array,
    Int64Builder, IntervalMonthDayNanoArray, IntervalMonthDayNanoBuilder, NullArray, StringArray,
    StringBuilder, Time64NanosecondArray, Time64NanosecondBuilder, TimestampNanosecondArray,
    TimestampNanosecondBuilder,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use vex_result::{Error, Result};
use vex_types::{DecimalValue, IntervalValue, Kind, Value, MAX_DECIMAL_PRECISION};

use crate::decimal;

/// A column of values of a single kind.
///
/// `Null(len)` is the column form of the untyped null: a column whose
/// kind was never pinned down and whose every element is null.
#[derive(Debug, Clone)]
pub enum Column {
    Null(usize),
    Boolean(Arc<BooleanArray>),
    Integer(Arc<Int64Array>),
    Double(Arc<Float64Array>),
    Decimal(Arc<Decimal128Array>),
    Binary(Arc<BinaryArray>),
    Text(Arc<StringArray>),
    Date(Arc<Date32Array>),
    Time(Arc<Time64NanosecondArray>),
    Timestamp(Arc<TimestampNanosecondArray>),
    Interval(Arc<IntervalMonthDayNanoArray>),
}

impl Column {
    /// Classify an Arrow array, widening narrow representations to the
    /// engine's canonical types.
    pub fn try_from_arrow(array: &ArrayRef) -> Result<Self> {
        let kind = Kind::from_data_type(array.data_type()).ok_or_else(|| {
            Error::type_mismatch(format!(
                "unsupported column type {}",
                array.data_type()
            ))
        })?;
        let canonical = kind.data_type();
        let array = if matches!(kind, Kind::Decimal) || array.data_type() == &canonical {
            Arc::clone(array)
        } else {
            cast(array.as_ref(), &canonical)?
        };
        Ok(match kind {
            Kind::Null => Column::Null(array.len()),
            Kind::Boolean => Column::Boolean(downcast::<BooleanArray>(&array)?),
            Kind::Integer => Column::Integer(downcast::<Int64Array>(&array)?),
            Kind::Double => Column::Double(downcast::<Float64Array>(&array)?),
            Kind::Decimal => Column::Decimal(downcast::<Decimal128Array>(&array)?),
            Kind::Binary => Column::Binary(downcast::<BinaryArray>(&array)?),
            Kind::Text => Column::Text(downcast::<StringArray>(&array)?),
            Kind::Date => Column::Date(downcast::<Date32Array>(&array)?),
            Kind::Time => Column::Time(downcast::<Time64NanosecondArray>(&array)?),
            Kind::Timestamp => Column::Timestamp(downcast::<TimestampNanosecondArray>(&array)?),
            Kind::Interval => Column::Interval(downcast::<IntervalMonthDayNanoArray>(&array)?),
        })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Column::Null(_) => Kind::Null,
            Column::Boolean(_) => Kind::Boolean,
            Column::Integer(_) => Kind::Integer,
            Column::Double(_) => Kind::Double,
            Column::Decimal(_) => Kind::Decimal,
            Column::Binary(_) => Kind::Binary,
            Column::Text(_) => Kind::Text,
            Column::Date(_) => Kind::Date,
            Column::Time(_) => Kind::Time,
            Column::Timestamp(_) => Kind::Timestamp,
            Column::Interval(_) => Kind::Interval,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Null(len) => *len,
            Column::Boolean(a) => a.len(),
            Column::Integer(a) => a.len(),
            Column::Double(a) => a.len(),
            Column::Decimal(a) => a.len(),
            Column::Binary(a) => a.len(),
            Column::Text(a) => a.len(),
            Column::Date(a) => a.len(),
            Column::Time(a) => a.len(),
            Column::Timestamp(a) => a.len(),
            Column::Interval(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one element as an owned scalar, `None` for null.
    pub fn value(&self, idx: usize) -> Result<Option<Value>> {
        let out = match self {
            Column::Null(_) => None,
            Column::Boolean(a) => valid(a.as_ref(), idx).then(|| Value::Boolean(a.value(idx))),
            Column::Integer(a) => valid(a.as_ref(), idx).then(|| Value::Integer(a.value(idx))),
            Column::Double(a) => valid(a.as_ref(), idx).then(|| Value::Double(a.value(idx))),
            Column::Decimal(a) => {
                if valid(a.as_ref(), idx) {
                    let scale = match a.data_type() {
                        DataType::Decimal128(_, scale) => *scale,
                        other => {
                            return Err(Error::Internal(format!(
                                "decimal column with data type {other}"
                            )));
                        }
                    };
                    let value = DecimalValue::new(a.value(idx), scale)
                        .map_err(|err| Error::Internal(err.to_string()))?;
                    Some(Value::Decimal(value))
                } else {
                    None
                }
            }
            Column::Binary(a) => valid(a.as_ref(), idx).then(|| Value::Binary(a.value(idx).to_vec())),
            Column::Text(a) => valid(a.as_ref(), idx).then(|| Value::Text(a.value(idx).to_owned())),
            Column::Date(a) => valid(a.as_ref(), idx).then(|| Value::Date(a.value(idx))),
            Column::Time(a) => valid(a.as_ref(), idx).then(|| Value::Time(a.value(idx))),
            Column::Timestamp(a) => valid(a.as_ref(), idx).then(|| Value::Timestamp(a.value(idx))),
            Column::Interval(a) => {
                valid(a.as_ref(), idx).then(|| Value::Interval(IntervalValue::from(a.value(idx))))
            }
        };
        Ok(out)
    }

    /// Build a column of `kind` from per-row scalars.
    ///
    /// Every `Some` value must already carry `kind`; decimal inputs may
    /// differ in scale and are aligned to the widest one seen.
    pub fn from_values(kind: Kind, values: Vec<Option<Value>>) -> Result<Self> {
        let len = values.len();
        Ok(match kind {
            Kind::Null => Column::Null(len),
            Kind::Boolean => {
                let mut builder = BooleanBuilder::with_capacity(len);
                for value in values {
                    builder.append_option(opt_bool(value)?);
                }
                Column::Boolean(Arc::new(builder.finish()))
            }
            Kind::Integer => {
                let mut builder = Int64Builder::with_capacity(len);
                for value in values {
                    match value {
                        Some(Value::Integer(v)) => builder.append_value(v),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Integer(Arc::new(builder.finish()))
            }
            Kind::Double => {
                let mut builder = Float64Builder::with_capacity(len);
                for value in values {
                    match value {
                        Some(Value::Double(v)) => builder.append_value(v),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Double(Arc::new(builder.finish()))
            }
            Kind::Decimal => {
                let mut scale: i8 = 0;
                for value in values.iter().flatten() {
                    match value {
                        Value::Decimal(d) => scale = scale.max(d.scale()),
                        other => return Err(wrong_kind(kind, other)),
                    }
                }
                let mut builder = Decimal128Builder::with_capacity(len)
                    .with_data_type(DataType::Decimal128(MAX_DECIMAL_PRECISION, scale));
                for value in values {
                    match value {
                        Some(Value::Decimal(d)) => {
                            let aligned = decimal::rescale(d, scale)
                                .map_err(|err| Error::Internal(err.to_string()))?;
                            builder.append_value(aligned.raw_value());
                        }
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Decimal(Arc::new(builder.finish()))
            }
            Kind::Binary => {
                let mut builder = BinaryBuilder::new();
                for value in values {
                    match value {
                        Some(Value::Binary(v)) => builder.append_value(&v),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Binary(Arc::new(builder.finish()))
            }
            Kind::Text => {
                let mut builder = StringBuilder::new();
                for value in values {
                    match value {
                        Some(Value::Text(v)) => builder.append_value(&v),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Text(Arc::new(builder.finish()))
            }
            Kind::Date => {
                let mut builder = Date32Builder::with_capacity(len);
                for value in values {
                    match value {
                        Some(Value::Date(v)) => builder.append_value(v),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Date(Arc::new(builder.finish()))
            }
            Kind::Time => {
                let mut builder = Time64NanosecondBuilder::with_capacity(len);
                for value in values {
                    match value {
                        Some(Value::Time(v)) => builder.append_value(v),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Time(Arc::new(builder.finish()))
            }
            Kind::Timestamp => {
                let mut builder = TimestampNanosecondBuilder::with_capacity(len);
                for value in values {
                    match value {
                        Some(Value::Timestamp(v)) => builder.append_value(v),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Timestamp(Arc::new(builder.finish()))
            }
            Kind::Interval => {
                let mut builder = IntervalMonthDayNanoBuilder::with_capacity(len);
                for value in values {
                    match value {
                        Some(Value::Interval(v)) => builder.append_value(v.into()),
                        None => builder.append_null(),
                        Some(other) => return Err(wrong_kind(kind, &other)),
                    }
                }
                Column::Interval(Arc::new(builder.finish()))
            }
        })
    }

    /// Hand the column back as a type-erased Arrow array.
    pub fn to_array_ref(&self) -> ArrayRef {
        match self {
            Column::Null(len) => Arc::new(NullArray::new(*len)),
            Column::Boolean(a) => Arc::clone(a) as ArrayRef,
            Column::Integer(a) => Arc::clone(a) as ArrayRef,
            Column::Double(a) => Arc::clone(a) as ArrayRef,
            Column::Decimal(a) => Arc::clone(a) as ArrayRef,
            Column::Binary(a) => Arc::clone(a) as ArrayRef,
            Column::Text(a) => Arc::clone(a) as ArrayRef,
            Column::Date(a) => Arc::clone(a) as ArrayRef,
            Column::Time(a) => Arc::clone(a) as ArrayRef,
            Column::Timestamp(a) => Arc::clone(a) as ArrayRef,
            Column::Interval(a) => Arc::clone(a) as ArrayRef,
        }
    }
}

fn valid(array: &dyn Array, idx: usize) -> bool {
    !array.is_null(idx)
}

fn downcast<T: Array + Clone + 'static>(array: &ArrayRef) -> Result<Arc<T>> {
    array
        .as_any()
        .downcast_ref::<T>()
        .map(|typed| Arc::new(typed.clone()))
        .ok_or_else(|| {
            Error::Internal(format!(
                "array downcast disagrees with data type {}",
                array.data_type()
            ))
        })
}

fn opt_bool(value: Option<Value>) -> Result<Option<bool>> {
    match value {
        Some(Value::Boolean(v)) => Ok(Some(v)),
        None => Ok(None),
        Some(other) => Err(wrong_kind(Kind::Boolean, &other)),
    }
}

fn wrong_kind(expected: Kind, actual: &Value) -> Error {
    Error::Internal(format!(
        "kernel produced a {} value for a {expected} column",
        actual.kind()
    ))
}
