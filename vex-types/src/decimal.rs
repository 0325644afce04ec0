//! Exact fixed-point decimal values.
//!
//! Columns store decimals with Arrow `Decimal128` semantics: a 128-bit
//! scaled integer plus a base-10 scale. This module provides the scalar
//! representation used by kernels; arithmetic that needs wider
//! intermediates lives in `vex-compute`.

use std::fmt;
use std::str::FromStr;

use arrow::datatypes::DECIMAL128_MAX_PRECISION;
use arrow_buffer::i256;

/// Maximum precision supported by [`DecimalValue`] (Arrow `Decimal128`).
pub const MAX_DECIMAL_PRECISION: u8 = DECIMAL128_MAX_PRECISION;
const POW10_BASE: i256 = i256::from_i128(10);

/// Errors that can occur while manipulating decimal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// Requested scale falls outside the supported range.
    ScaleOutOfRange { scale: i8 },
    /// Result exceeded the maximum representable precision.
    PrecisionOverflow { value: i128, scale: i8 },
    /// Arithmetic operation overflowed the Decimal128 range.
    Overflow,
    /// Attempted to divide by zero.
    DivisionByZero,
    /// Rescale attempted to lower scale without exact divisibility.
    InexactRescale { from: i8, to: i8 },
    /// The textual input does not parse as a decimal literal.
    MalformedLiteral { text: String },
}

impl fmt::Display for DecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalError::ScaleOutOfRange { scale } => {
                write!(f, "decimal scale {scale} outside supported range")
            }
            DecimalError::PrecisionOverflow { value, scale } => {
                write!(
                    f,
                    "decimal value {value} with scale {scale} exceeds maximum precision"
                )
            }
            DecimalError::Overflow => write!(f, "decimal arithmetic overflow"),
            DecimalError::DivisionByZero => write!(f, "decimal division by zero"),
            DecimalError::InexactRescale { from, to } => {
                write!(
                    f,
                    "cannot rescale decimal from scale {from} to {to} without losing precision"
                )
            }
            DecimalError::MalformedLiteral { text } => {
                write!(f, "'{text}' is not a valid decimal literal")
            }
        }
    }
}

impl std::error::Error for DecimalError {}

/// Scalar representation of a Decimal128 value.
///
/// The scale is part of the value's identity: parsing `"42.000"` yields
/// scale 3, and stringification reproduces the trailing zeros. Ordering
/// and equality across scales align the operands first, so `42.000`
/// compares equal to `42.0`.
#[derive(Clone, Copy, Debug, Eq)]
pub struct DecimalValue {
    value: i128,
    scale: i8,
}

impl DecimalValue {
    /// Create a decimal from its raw parts, validating precision bounds.
    pub fn new(value: i128, scale: i8) -> Result<Self, DecimalError> {
        if !scale_within_bounds(scale as i16) {
            return Err(DecimalError::ScaleOutOfRange { scale });
        }
        let precision = digit_count_i256(i256::from_i128(value));
        if precision > MAX_DECIMAL_PRECISION {
            return Err(DecimalError::PrecisionOverflow { value, scale });
        }
        Ok(Self { value, scale })
    }

    /// Construct a decimal from an integer with zero scale.
    pub fn from_i64(value: i64) -> Self {
        Self::new(value as i128, 0).expect("i64 fits within Decimal128 limits")
    }

    /// Return the scaled integer backing this decimal.
    #[inline]
    pub fn raw_value(self) -> i128 {
        self.value
    }

    /// Return the scale (number of fractional digits).
    #[inline]
    pub fn scale(self) -> i8 {
        self.scale
    }

    /// Return the decimal precision (total digit count).
    #[inline]
    pub fn precision(self) -> u8 {
        digit_count_i256(i256::from_i128(self.value))
    }

    /// Convert the decimal into an `f64` (lossy for high precision inputs).
    pub fn to_f64(self) -> f64 {
        if self.value == 0 {
            return 0.0;
        }
        let denominator = 10_f64.powi(self.scale as i32);
        (self.value as f64) / denominator
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.value == 0
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            return write!(f, "{}", self.value);
        }
        let negative = self.value < 0;
        let digits = digit_buffer(i256::from_i128(self.value));
        if digits.len() <= self.scale as usize {
            let mut result = String::with_capacity(self.scale as usize + 2);
            if negative {
                result.push('-');
            }
            result.push('0');
            result.push('.');
            for _ in digits.len()..self.scale as usize {
                result.push('0');
            }
            result.push_str(&digits);
            return f.write_str(&result);
        }
        let split = digits.len() - self.scale as usize;
        if negative {
            f.write_str("-")?;
        }
        f.write_str(&digits[..split])?;
        f.write_str(".")?;
        f.write_str(&digits[split..])
    }
}

impl FromStr for DecimalValue {
    type Err = DecimalError;

    /// Parse a decimal literal, preserving the literal's textual scale.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || DecimalError::MalformedLiteral {
            text: s.to_string(),
        };
        if trimmed.is_empty() {
            return Err(malformed());
        }
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        let unsigned_int = int_part.strip_prefix(['+', '-']).unwrap_or(int_part);
        if unsigned_int.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if !digits_only(unsigned_int) || !digits_only(frac_part) {
            return Err(malformed());
        }

        let scale = frac_part.len();
        if scale > MAX_DECIMAL_PRECISION as usize {
            return Err(DecimalError::ScaleOutOfRange { scale: scale as i8 });
        }

        let combined = format!("{}{}", int_part, frac_part);
        let value = combined.parse::<i128>().map_err(|_| malformed())?;

        Self::new(value, scale as i8)
    }
}

impl PartialEq for DecimalValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl PartialOrd for DecimalValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DecimalValue {
    /// Scale-aligned total ordering; widening through `i256` keeps the
    /// alignment exact for every representable operand pair.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.scale == other.scale {
            return self.value.cmp(&other.value);
        }

        let max_scale = std::cmp::max(self.scale, other.scale);
        let scale_diff_self = (max_scale - self.scale) as u32;
        let scale_diff_other = (max_scale - other.scale) as u32;

        let l_i256 = i256::from_i128(self.value);
        let r_i256 = i256::from_i128(other.value);

        let l_scaled = l_i256.wrapping_mul(POW10_BASE.wrapping_pow(scale_diff_self));
        let r_scaled = r_i256.wrapping_mul(POW10_BASE.wrapping_pow(scale_diff_other));

        l_scaled.cmp(&r_scaled)
    }
}

fn digit_count_i256(mut value: i256) -> u8 {
    if value == i256::ZERO {
        return 1;
    }
    if value < i256::ZERO {
        value = value.wrapping_neg();
    }
    let mut count: u8 = 0;
    while value != i256::ZERO {
        value = value.wrapping_div(POW10_BASE);
        count += 1;
    }
    count
}

fn digit_buffer(mut value: i256) -> String {
    if value == i256::ZERO {
        return "0".to_owned();
    }
    if value < i256::ZERO {
        value = value.wrapping_neg();
    }
    let mut buf = Vec::new();
    let ten = POW10_BASE;
    let mut current = value;
    while current != i256::ZERO {
        let rem = current.wrapping_rem(ten);
        let digit = rem
            .to_i128()
            .expect("remainder from decimal division fits in i128") as i32;
        buf.push((b'0' + digit as u8) as char);
        current = current.wrapping_div(ten);
    }
    buf.iter().rev().collect()
}

pub(crate) fn scale_within_bounds(scale: i16) -> bool {
    let max = MAX_DECIMAL_PRECISION as i16;
    (-max..=max).contains(&scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn parse_preserves_literal_scale() {
        let d = "42.000".parse::<DecimalValue>().unwrap();
        assert_eq!(d.raw_value(), 42_000);
        assert_eq!(d.scale(), 3);
        assert_eq!(d.to_string(), "42.000");
    }

    #[test]
    fn equality_aligns_scales() {
        let a = "42.000".parse::<DecimalValue>().unwrap();
        let b = "42.0".parse::<DecimalValue>().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn ordering_across_scales() {
        let a = "1.5".parse::<DecimalValue>().unwrap();
        let b = "1.25".parse::<DecimalValue>().unwrap();
        assert_eq!(a.cmp(&b), Ordering::Greater);
        let neg = "-0.5".parse::<DecimalValue>().unwrap();
        assert_eq!(neg.cmp(&a), Ordering::Less);
    }

    #[test]
    fn display_small_fraction_pads_zeros() {
        let d = DecimalValue::new(5, 3).unwrap();
        assert_eq!(d.to_string(), "0.005");
        let neg = DecimalValue::new(-5, 3).unwrap();
        assert_eq!(neg.to_string(), "-0.005");
    }

    #[test]
    fn malformed_literals_are_rejected() {
        assert!("apple".parse::<DecimalValue>().is_err());
        assert!("1.2.3".parse::<DecimalValue>().is_err());
        assert!("".parse::<DecimalValue>().is_err());
        assert!("1e5".parse::<DecimalValue>().is_err());
    }

    #[test]
    fn signed_literals() {
        let neg = "-12.50".parse::<DecimalValue>().unwrap();
        assert_eq!(neg.raw_value(), -1250);
        assert_eq!(neg.scale(), 2);
        let pos = "+3".parse::<DecimalValue>().unwrap();
        assert_eq!(pos.raw_value(), 3);
        assert_eq!(pos.scale(), 0);
    }
}
