//! Interval value stored as calendar months, whole days, and nanoseconds.

use arrow_buffer::IntervalMonthDayNano;

const NANOS_PER_DAY: i128 = 86_400_000_000_000;
const DAYS_PER_MONTH: i128 = 30;

/// Signed duration split into calendar months, whole days, and nanoseconds.
///
/// Months capture both month and year components (12 months == 1 year);
/// days are whole 24-hour periods and nanoseconds account for sub-day
/// precision. This mirrors Arrow's `IntervalMonthDayNano` while keeping
/// arithmetic manageable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntervalValue {
    pub months: i32,
    pub days: i32,
    pub nanos: i64,
}

impl IntervalValue {
    pub const fn new(months: i32, days: i32, nanos: i64) -> Self {
        Self {
            months,
            days,
            nanos,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            months: self.months.checked_add(other.months)?,
            days: self.days.checked_add(other.days)?,
            nanos: self.nanos.checked_add(other.nanos)?,
        })
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        Some(Self {
            months: self.months.checked_sub(other.months)?,
            days: self.days.checked_sub(other.days)?,
            nanos: self.nanos.checked_sub(other.nanos)?,
        })
    }

    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            months: self.months.checked_neg()?,
            days: self.days.checked_neg()?,
            nanos: self.nanos.checked_neg()?,
        })
    }

    pub const fn is_zero(self) -> bool {
        self.months == 0 && self.days == 0 && self.nanos == 0
    }

    /// Total duration in nanoseconds, weighting months at 30 days.
    ///
    /// Interval comparison is ordinal by this total; the widening to
    /// `i128` keeps the weighting overflow-free for every representable
    /// component combination.
    pub fn total_nanos(self) -> i128 {
        i128::from(self.months) * DAYS_PER_MONTH * NANOS_PER_DAY
            + i128::from(self.days) * NANOS_PER_DAY
            + i128::from(self.nanos)
    }
}

impl From<IntervalMonthDayNano> for IntervalValue {
    fn from(value: IntervalMonthDayNano) -> Self {
        Self::new(value.months, value.days, value.nanoseconds)
    }
}

impl From<IntervalValue> for IntervalMonthDayNano {
    fn from(value: IntervalValue) -> Self {
        IntervalMonthDayNano::new(value.months, value.days, value.nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_avoids_silent_overflow() {
        let max = IntervalValue::new(i32::MAX, 0, 0);
        assert!(max.checked_add(IntervalValue::new(1, 0, 0)).is_none());
        assert_eq!(
            IntervalValue::new(1, 2, 3).checked_sub(IntervalValue::new(1, 2, 3)),
            Some(IntervalValue::zero())
        );
    }

    #[test]
    fn total_nanos_orders_mixed_components() {
        let one_day = IntervalValue::new(0, 1, 0);
        let twenty_five_hours = IntervalValue::new(0, 0, 25 * 3_600_000_000_000);
        assert!(twenty_five_hours.total_nanos() > one_day.total_nanos());
        let one_month = IntervalValue::new(1, 0, 0);
        let twenty_nine_days = IntervalValue::new(0, 29, 0);
        assert!(one_month.total_nanos() > twenty_nine_days.total_nanos());
    }

    #[test]
    fn arrow_round_trip() {
        let v = IntervalValue::new(7, -3, 42);
        let arrow: IntervalMonthDayNano = v.into();
        assert_eq!(IntervalValue::from(arrow), v);
    }
}
