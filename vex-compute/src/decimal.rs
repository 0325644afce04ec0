//! Decimal128 arithmetic with `i256` intermediates.
//!
//! Operand scales are aligned before addition and comparison; widening to
//! 256 bits keeps the alignment exact for every representable pair. All
//! functions return [`DecimalError`] and leave the mapping onto engine
//! errors to the calling kernel.

use arrow_buffer::i256;
use vex_types::{DecimalError, DecimalValue, MAX_DECIMAL_PRECISION};

const POW10_BASE: i256 = i256::from_i128(10);

/// Extra fractional digits granted to division results, on top of the
/// wider operand scale.
const DIV_SCALE_BONUS: i8 = 4;

fn pow10(exp: u32) -> Result<i256, DecimalError> {
    let max = u32::from(MAX_DECIMAL_PRECISION) * 2;
    if exp > max {
        return Err(DecimalError::ScaleOutOfRange {
            scale: i8::try_from(exp).unwrap_or(i8::MAX),
        });
    }
    Ok(POW10_BASE.wrapping_pow(exp))
}

fn scale_within_bounds(scale: i16) -> bool {
    let max = MAX_DECIMAL_PRECISION as i16;
    (-max..=max).contains(&scale)
}

/// Rescale to a different exponent without changing the numeric value.
///
/// Scaling up multiplies by a power of ten; scaling down requires exact
/// divisibility and fails with [`DecimalError::InexactRescale`] otherwise.
pub fn rescale(value: DecimalValue, target_scale: i8) -> Result<DecimalValue, DecimalError> {
    if !scale_within_bounds(target_scale as i16) {
        return Err(DecimalError::ScaleOutOfRange {
            scale: target_scale,
        });
    }
    if target_scale == value.scale() {
        return Ok(value);
    }

    if target_scale > value.scale() {
        let diff = (target_scale - value.scale()) as u32;
        let factor = pow10(diff)?;
        let scaled = i256::from_i128(value.raw_value())
            .checked_mul(factor)
            .ok_or(DecimalError::Overflow)?;
        let new_value = scaled.to_i128().ok_or(DecimalError::Overflow)?;
        return DecimalValue::new(new_value, target_scale);
    }

    let diff = (value.scale() - target_scale) as u32;
    let factor = pow10(diff)?;
    let wide = i256::from_i128(value.raw_value());
    let quotient = wide.checked_div(factor).ok_or(DecimalError::Overflow)?;
    let remainder = wide.checked_rem(factor).ok_or(DecimalError::Overflow)?;
    if remainder != i256::ZERO {
        return Err(DecimalError::InexactRescale {
            from: value.scale(),
            to: target_scale,
        });
    }
    let new_value = quotient.to_i128().ok_or(DecimalError::Overflow)?;
    DecimalValue::new(new_value, target_scale)
}

/// Rescale to a different exponent, rounding half away from zero when
/// digits are dropped.
pub fn rescale_with_rounding(
    value: DecimalValue,
    target_scale: i8,
) -> Result<DecimalValue, DecimalError> {
    if !scale_within_bounds(target_scale as i16) {
        return Err(DecimalError::ScaleOutOfRange {
            scale: target_scale,
        });
    }
    if target_scale >= value.scale() {
        return rescale(value, target_scale);
    }

    let diff = (value.scale() - target_scale) as u32;
    let factor = pow10(diff)?;
    let wide = i256::from_i128(value.raw_value());

    let quotient = wide.checked_div(factor).ok_or(DecimalError::Overflow)?;
    let remainder = wide.checked_rem(factor).ok_or(DecimalError::Overflow)?;

    let mut rounded = quotient;
    if remainder != i256::ZERO {
        let abs_rem = remainder.wrapping_abs();
        let abs_factor = factor.wrapping_abs();
        let doubled = abs_rem
            .checked_mul(i256::from_i128(2))
            .ok_or(DecimalError::Overflow)?;
        if doubled >= abs_factor {
            rounded = if wide > i256::ZERO {
                rounded.checked_add(i256::ONE).ok_or(DecimalError::Overflow)?
            } else {
                rounded.checked_sub(i256::ONE).ok_or(DecimalError::Overflow)?
            };
        }
    }

    let final_value = rounded.to_i128().ok_or(DecimalError::Overflow)?;
    DecimalValue::new(final_value, target_scale)
}

/// Add two decimals; the result carries the wider operand scale.
pub fn add(lhs: DecimalValue, rhs: DecimalValue) -> Result<DecimalValue, DecimalError> {
    let target_scale = lhs.scale().max(rhs.scale());
    let l = rescale(lhs, target_scale)?;
    let r = rescale(rhs, target_scale)?;
    let sum = i256::from_i128(l.raw_value())
        .checked_add(i256::from_i128(r.raw_value()))
        .ok_or(DecimalError::Overflow)?;
    let value = sum.to_i128().ok_or(DecimalError::Overflow)?;
    DecimalValue::new(value, target_scale)
}

/// Subtract two decimals; the result carries the wider operand scale.
pub fn sub(lhs: DecimalValue, rhs: DecimalValue) -> Result<DecimalValue, DecimalError> {
    let target_scale = lhs.scale().max(rhs.scale());
    let l = rescale(lhs, target_scale)?;
    let r = rescale(rhs, target_scale)?;
    let diff = i256::from_i128(l.raw_value())
        .checked_sub(i256::from_i128(r.raw_value()))
        .ok_or(DecimalError::Overflow)?;
    let value = diff.to_i128().ok_or(DecimalError::Overflow)?;
    DecimalValue::new(value, target_scale)
}

/// Multiply two decimals; the result scale is the sum of operand scales.
pub fn mul(lhs: DecimalValue, rhs: DecimalValue) -> Result<DecimalValue, DecimalError> {
    let sum = lhs.scale() as i16 + rhs.scale() as i16;
    if !scale_within_bounds(sum) {
        return Err(DecimalError::ScaleOutOfRange { scale: sum as i8 });
    }
    let scale = sum as i8;
    let product = i256::from_i128(lhs.raw_value())
        .checked_mul(i256::from_i128(rhs.raw_value()))
        .ok_or(DecimalError::Overflow)?;
    let value = product.to_i128().ok_or(DecimalError::Overflow)?;
    DecimalValue::new(value, scale)
}

/// Scale assigned to the quotient of operands with the given scales.
pub fn div_scale(lhs: DecimalValue, rhs: DecimalValue) -> i8 {
    let base = lhs.scale().max(rhs.scale()) as i16 + DIV_SCALE_BONUS as i16;
    base.min(MAX_DECIMAL_PRECISION as i16) as i8
}

/// Divide `lhs` by `rhs`, rounding half away from zero at [`div_scale`].
pub fn div(lhs: DecimalValue, rhs: DecimalValue) -> Result<DecimalValue, DecimalError> {
    if rhs.raw_value() == 0 {
        return Err(DecimalError::DivisionByZero);
    }
    let target_scale = div_scale(lhs, rhs);
    let numerator = i256::from_i128(lhs.raw_value());
    let denominator = i256::from_i128(rhs.raw_value());

    // Pre-scale the numerator so integer division lands on target_scale.
    let scale_adjust = (target_scale as i32 + rhs.scale() as i32) - lhs.scale() as i32;
    let adjusted = if scale_adjust > 0 {
        let factor = pow10(scale_adjust as u32)?;
        numerator.checked_mul(factor).ok_or(DecimalError::Overflow)?
    } else if scale_adjust < 0 {
        let factor = pow10((-scale_adjust) as u32)?;
        let quot = numerator.checked_div(factor).ok_or(DecimalError::Overflow)?;
        let rem = numerator.checked_rem(factor).ok_or(DecimalError::Overflow)?;
        if rem != i256::ZERO {
            return Err(DecimalError::InexactRescale {
                from: lhs.scale(),
                to: target_scale,
            });
        }
        quot
    } else {
        numerator
    };

    let quotient = adjusted
        .checked_div(denominator)
        .ok_or(DecimalError::Overflow)?;
    let remainder = adjusted
        .checked_rem(denominator)
        .ok_or(DecimalError::Overflow)?;
    let rounded = if remainder == i256::ZERO {
        quotient
    } else {
        let half = denominator.wrapping_div(i256::from_i128(2));
        if remainder.wrapping_abs() >= half.wrapping_abs() {
            if (adjusted >= i256::ZERO) == (denominator >= i256::ZERO) {
                quotient.wrapping_add(i256::ONE)
            } else {
                quotient.wrapping_sub(i256::ONE)
            }
        } else {
            quotient
        }
    };

    let value = rounded.to_i128().ok_or(DecimalError::Overflow)?;
    DecimalValue::new(value, target_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> DecimalValue {
        text.parse().unwrap()
    }

    #[test]
    fn add_aligns_to_wider_scale() {
        let sum = add(dec("1.5"), dec("2.25")).unwrap();
        assert_eq!(sum.raw_value(), 375);
        assert_eq!(sum.scale(), 2);
    }

    #[test]
    fn mul_sums_scales() {
        let product = mul(dec("1.5"), dec("0.25")).unwrap();
        assert_eq!(product.raw_value(), 375);
        assert_eq!(product.scale(), 3);
        assert_eq!(product.to_string(), "0.375");
    }

    #[test]
    fn div_adds_four_fractional_digits() {
        let quotient = div(dec("1"), dec("3")).unwrap();
        assert_eq!(quotient.scale(), 4);
        assert_eq!(quotient.to_string(), "0.3333");
    }

    #[test]
    fn div_rounds_half_away_from_zero() {
        let quotient = div(dec("1"), dec("16")).unwrap();
        // 0.0625 rounds to 0.0625 at scale 4 exactly; 1/6 rounds up.
        assert_eq!(quotient.to_string(), "0.0625");
        let third = div(dec("-1"), dec("6")).unwrap();
        assert_eq!(third.to_string(), "-0.1667");
    }

    #[test]
    fn div_by_zero_is_reported() {
        assert_eq!(
            div(dec("1"), dec("0")),
            Err(DecimalError::DivisionByZero)
        );
    }

    #[test]
    fn rescale_down_requires_exactness() {
        assert_eq!(rescale(dec("1.50"), 1).unwrap(), dec("1.5"));
        assert_eq!(
            rescale(dec("1.55"), 1),
            Err(DecimalError::InexactRescale { from: 2, to: 1 })
        );
    }

    #[test]
    fn rounding_rescale_rounds_half_away_from_zero() {
        assert_eq!(rescale_with_rounding(dec("1.55"), 1).unwrap(), dec("1.6"));
        assert_eq!(rescale_with_rounding(dec("-1.55"), 1).unwrap(), dec("-1.6"));
        assert_eq!(rescale_with_rounding(dec("1.44"), 1).unwrap(), dec("1.4"));
    }
}
