//! Value model shared across the vex crates.
//!
//! The engine's typed values are a tagged union over a fixed set of kinds;
//! a value's kind is set at construction and never mutates. Absence is
//! represented by `Option<Value>` at scalar seams and by Arrow validity
//! bitmaps at column seams — an empty `Binary` or `Text` value is never
//! confused with null.

pub mod decimal;
pub mod interval;
pub mod kind;
pub mod value;

pub use decimal::{DecimalError, DecimalValue, MAX_DECIMAL_PRECISION};
pub use interval::IntervalValue;
pub use kind::Kind;
pub use value::Value;
