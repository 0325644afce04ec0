//! Calendar and clock arithmetic for `Date32`, `Time64`, and nanosecond
//! timestamps.
//!
//! Dates are days since the Unix epoch and go through the `time` crate's
//! Julian-day conversions for calendar-aware month arithmetic; month
//! addition clamps the day-of-month to the target month's length
//! (`2024-01-31 + 1 month` is `2024-02-29`).

use time::{Date, Duration, Month};
use vex_result::{Error, Result};
use vex_types::IntervalValue;

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
pub const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
pub const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;

/// Parse `YYYY-MM-DD` text into `Date32` days since the epoch.
///
/// Fields are fixed-width with zero padding; `2024-1-5` is rejected.
pub fn parse_date32(text: &str) -> Result<i32> {
    let trimmed = text.trim();
    // A leading '-' marks a negative year; strip it before splitting so
    // the separator split does not eat it.
    let (negative_year, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let mut parts = body.split('-');
    let year_digits = parts.next().ok_or_else(|| malformed_date(text))?;
    let month_str = parts.next().ok_or_else(|| malformed_date(text))?;
    let day_str = parts.next().ok_or_else(|| malformed_date(text))?;
    if parts.next().is_some() {
        return Err(malformed_date(text));
    }

    if year_digits.len() != 4 || !year_digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed_date(text));
    }
    let year = year_digits
        .parse::<i32>()
        .map_err(|_| malformed_date(text))?;
    let year = if negative_year { -year } else { year };
    let month_num = two_digit_field(month_str).ok_or_else(|| malformed_date(text))?;
    let day = two_digit_field(day_str).ok_or_else(|| malformed_date(text))?;

    let month = month_from_number(month_num).ok_or_else(|| malformed_date(text))?;
    let date = Date::from_calendar_date(year, month, day)
        .map_err(|err| Error::cast(format!("invalid date '{text}': {err}")))?;
    Ok(date_to_days(date))
}

/// Format `Date32` days as `YYYY-MM-DD`.
pub fn format_date32(days: i32) -> Result<String> {
    let date = days_to_date(days)?;
    let (year, month, day) = date.to_calendar_date();
    Ok(format!("{:04}-{:02}-{:02}", year, month as u8, day))
}

/// Parse `HH:MM:SS[.fraction]` text into `Time64` nanoseconds since
/// midnight.
///
/// Hours, minutes, and seconds are two digits each; the seconds field is
/// required, so `12:30` is rejected.
pub fn parse_time64(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let malformed = || Error::cast(format!("invalid time '{trimmed}'"));
    let mut parts = trimmed.split(':');
    let hour = parts
        .next()
        .and_then(two_digit_field)
        .map(i64::from)
        .ok_or_else(malformed)?;
    let minute = parts
        .next()
        .and_then(two_digit_field)
        .map(i64::from)
        .ok_or_else(malformed)?;
    let second_text = parts.next().ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }
    let (second, frac_nanos) = parse_seconds(second_text).ok_or_else(malformed)?;

    if !(0..24).contains(&hour) || !(0..60).contains(&minute) || !(0..60).contains(&second) {
        return Err(malformed());
    }
    Ok(hour * NANOS_PER_HOUR + minute * NANOS_PER_MINUTE + second * NANOS_PER_SECOND + frac_nanos)
}

/// Format `Time64` nanoseconds as `HH:MM:SS[.fraction]`.
pub fn format_time64(nanos: i64) -> Result<String> {
    if !(0..NANOS_PER_DAY).contains(&nanos) {
        return Err(Error::cast(format!(
            "time value {nanos}ns falls outside a single day"
        )));
    }
    let hour = nanos / NANOS_PER_HOUR;
    let minute = (nanos % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
    let second = (nanos % NANOS_PER_MINUTE) / NANOS_PER_SECOND;
    let frac = nanos % NANOS_PER_SECOND;
    if frac == 0 {
        Ok(format!("{hour:02}:{minute:02}:{second:02}"))
    } else {
        let digits = format!("{frac:09}");
        Ok(format!(
            "{hour:02}:{minute:02}:{second:02}.{}",
            digits.trim_end_matches('0')
        ))
    }
}

/// Parse `YYYY-MM-DD[ T]HH:MM:SS[.fraction]` (time part optional) into
/// epoch nanoseconds.
pub fn parse_timestamp(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let (date_part, time_part) = match trimmed.split_once([' ', 'T']) {
        Some((d, t)) => (d, Some(t)),
        None => (trimmed, None),
    };
    let days = parse_date32(date_part)?;
    let time_nanos = match time_part {
        Some(t) => parse_time64(t)?,
        None => 0,
    };
    i64::from(days)
        .checked_mul(NANOS_PER_DAY)
        .and_then(|base| base.checked_add(time_nanos))
        .ok_or_else(|| Error::cast(format!("timestamp '{trimmed}' out of range")))
}

/// Format epoch nanoseconds as `YYYY-MM-DD HH:MM:SS[.fraction]`.
pub fn format_timestamp(nanos: i64) -> Result<String> {
    let (days, time_nanos) = split_timestamp(nanos);
    let date_text = format_date32(days)?;
    let time_text = format_time64(time_nanos)?;
    Ok(format!("{date_text} {time_text}"))
}

/// Add an interval to a `Date32` value.
///
/// The interval's sub-day component must amount to whole days; applying
/// an hour offset to a date has no well-defined result in days.
pub fn add_interval_to_date32(days: i32, interval: IntervalValue) -> Result<i32> {
    let mut date = days_to_date(days)?;
    if interval.months != 0 {
        date = add_months(date, interval.months)?;
    }
    let extra_days = whole_days(interval.days, interval.nanos)?;
    if extra_days != 0 {
        date = date
            .checked_add(Duration::days(extra_days))
            .ok_or_else(|| Error::Internal("date overflow applying day component".into()))?;
    }
    Ok(date_to_days(date))
}

/// Subtract an interval from a `Date32` value.
pub fn sub_interval_from_date32(days: i32, interval: IntervalValue) -> Result<i32> {
    let negated = interval
        .checked_neg()
        .ok_or_else(|| Error::Internal("interval overflow during negation".into()))?;
    add_interval_to_date32(days, negated)
}

/// Add an interval to a nanosecond timestamp, applying the month
/// component through calendar arithmetic.
pub fn add_interval_to_timestamp(nanos: i64, interval: IntervalValue) -> Result<i64> {
    let (days, time_nanos) = split_timestamp(nanos);
    let mut date = days_to_date(days)?;
    if interval.months != 0 {
        date = add_months(date, interval.months)?;
    }
    if interval.days != 0 {
        date = date
            .checked_add(Duration::days(i64::from(interval.days)))
            .ok_or_else(|| Error::Internal("timestamp overflow applying day component".into()))?;
    }
    let base = i64::from(date_to_days(date))
        .checked_mul(NANOS_PER_DAY)
        .and_then(|v| v.checked_add(time_nanos))
        .and_then(|v| v.checked_add(interval.nanos))
        .ok_or_else(|| Error::Internal("timestamp overflow applying interval".into()))?;
    Ok(base)
}

/// Subtract an interval from a nanosecond timestamp.
pub fn sub_interval_from_timestamp(nanos: i64, interval: IntervalValue) -> Result<i64> {
    let negated = interval
        .checked_neg()
        .ok_or_else(|| Error::Internal("interval overflow during negation".into()))?;
    add_interval_to_timestamp(nanos, negated)
}

/// Difference of two `Date32` values as a day-only interval.
pub fn date32_diff(lhs: i32, rhs: i32) -> Result<IntervalValue> {
    let days = lhs
        .checked_sub(rhs)
        .ok_or_else(|| Error::Internal("date difference overflow".into()))?;
    Ok(IntervalValue::new(0, days, 0))
}

/// Difference of two nanosecond timestamps, split into whole days plus a
/// sub-day nanosecond remainder.
pub fn timestamp_diff(lhs: i64, rhs: i64) -> Result<IntervalValue> {
    let diff = i128::from(lhs) - i128::from(rhs);
    let days = diff.div_euclid(i128::from(NANOS_PER_DAY));
    let rem = diff.rem_euclid(i128::from(NANOS_PER_DAY));
    let days = i32::try_from(days)
        .map_err(|_| Error::Internal("timestamp difference overflow".into()))?;
    let rem = rem as i64;
    Ok(IntervalValue::new(0, days, rem))
}

/// Render an interval as `[N months] [N days] [HH:MM:SS[.fraction]]`.
pub fn format_interval(interval: IntervalValue) -> String {
    let mut parts: Vec<String> = Vec::new();
    if interval.months != 0 {
        parts.push(format!("{} months", interval.months));
    }
    if interval.days != 0 {
        parts.push(format!("{} days", interval.days));
    }
    if interval.nanos != 0 || parts.is_empty() {
        let sign = if interval.nanos < 0 { "-" } else { "" };
        let abs = interval.nanos.unsigned_abs();
        let hours = abs / NANOS_PER_HOUR as u64;
        let minutes = (abs % NANOS_PER_HOUR as u64) / NANOS_PER_MINUTE as u64;
        let seconds = (abs % NANOS_PER_MINUTE as u64) / NANOS_PER_SECOND as u64;
        let frac = abs % NANOS_PER_SECOND as u64;
        if frac == 0 {
            parts.push(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"));
        } else {
            let digits = format!("{frac:09}");
            parts.push(format!(
                "{sign}{hours:02}:{minutes:02}:{seconds:02}.{}",
                digits.trim_end_matches('0')
            ));
        }
    }
    parts.join(" ")
}

fn split_timestamp(nanos: i64) -> (i32, i64) {
    let days = nanos.div_euclid(NANOS_PER_DAY);
    let time_nanos = nanos.rem_euclid(NANOS_PER_DAY);
    (days as i32, time_nanos)
}

fn two_digit_field(text: &str) -> Option<u8> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u8>().ok()
}

fn parse_seconds(text: &str) -> Option<(i64, i64)> {
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    let second = i64::from(two_digit_field(whole)?);
    if frac.is_empty() {
        return Some((second, 0));
    }
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = frac.parse::<i64>().ok()?;
    let nanos = digits * 10_i64.pow(9 - frac.len() as u32);
    Some((second, nanos))
}

fn add_months(date: Date, months_delta: i32) -> Result<Date> {
    let base_index = i64::from(date.year()) * 12 + i64::from(date.month() as u8) - 1;
    let target_index = base_index
        .checked_add(i64::from(months_delta))
        .ok_or_else(|| Error::Internal("date overflow applying month component".into()))?;

    let new_year = target_index.div_euclid(12);
    if new_year < i64::from(i32::MIN) || new_year > i64::from(i32::MAX) {
        return Err(Error::Internal(
            "year out of range after month arithmetic".into(),
        ));
    }
    let new_year = new_year as i32;
    let month_index = target_index.rem_euclid(12) as u8;
    let new_month = month_from_number(month_index + 1)
        .ok_or_else(|| Error::Internal("month index out of range".into()))?;

    // Clamp the day to the target month's length.
    let new_day = date.day().min(new_month.length(new_year));
    Date::from_calendar_date(new_year, new_month, new_day)
        .map_err(|err| Error::Internal(format!("invalid date after month arithmetic: {err}")))
}

fn whole_days(days: i32, nanos: i64) -> Result<i64> {
    if nanos % NANOS_PER_DAY != 0 {
        return Err(Error::type_mismatch(
            "sub-day interval component applied to a DATE value",
        ));
    }
    i64::from(days)
        .checked_add(nanos / NANOS_PER_DAY)
        .ok_or_else(|| Error::Internal("interval day component overflow".into()))
}

fn days_to_date(days: i32) -> Result<Date> {
    let julian = i64::from(days) + i64::from(epoch_julian_day());
    let julian = i32::try_from(julian)
        .map_err(|_| Error::Internal("date out of Julian range".into()))?;
    Date::from_julian_day(julian).map_err(|err| Error::Internal(format!("date out of range: {err}")))
}

fn date_to_days(date: Date) -> i32 {
    date.to_julian_day() - epoch_julian_day()
}

fn epoch_julian_day() -> i32 {
    Date::from_calendar_date(1970, Month::January, 1)
        .expect("1970-01-01 is a valid date")
        .to_julian_day()
}

fn month_from_number(raw: u8) -> Option<Month> {
    if raw == 0 || raw > 12 {
        return None;
    }
    Some(Month::January.nth_next(raw - 1))
}

fn malformed_date(text: &str) -> Error {
    Error::cast(format!("invalid date '{}'", text.trim()))
}
