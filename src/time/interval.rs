// src/time/interval.rs

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One second in milliseconds.
pub const SECOND: u64 = 1_000;
/// One minute in milliseconds.
pub const MINUTE: u64 = 60 * SECOND;
/// One hour in milliseconds.
pub const HOUR: u64 = 60 * MINUTE;
/// One day in milliseconds.
pub const DAY: u64 = 24 * HOUR;
/// One week in milliseconds.
pub const WEEK: u64 = 7 * DAY;
/// A 365-day year in milliseconds.
pub const YEAR: u64 = 365 * DAY;
/// Average Gregorian month (365.2425 / 12 days).
pub const AVG_MONTH: u64 = 2_629_746_000;
/// Average Gregorian quarter (365.2425 / 4 days).
pub const AVG_QUARTER: u64 = 7_889_238_000;

/// Calendar-aligned aggregation interval tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalUnit {
    /// Sunday-based week
    Week,
    /// ISO (Monday-based) week
    WeekIso,
    /// Calendar month
    Month,
    /// Calendar quarter
    Quarter,
}

impl IntervalUnit {
    /// Approximate length of the unit, only meaningful for ordering and bounding.
    pub fn approx_ms(&self) -> u64 {
        match self {
            IntervalUnit::Week | IntervalUnit::WeekIso => WEEK,
            IntervalUnit::Month => AVG_MONTH,
            IntervalUnit::Quarter => AVG_QUARTER,
        }
    }
}

/// An aggregation interval: either a plain duration or a calendar period.
///
/// Serialized untagged, so `60000` is a fixed interval and `"MONTH"` a calendar one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Interval {
    /// Fixed duration in milliseconds
    Fixed(u64),
    /// Calendar-aligned period
    Calendar(IntervalUnit),
}

impl Interval {
    /// Numeric value used for ordering and bounding.
    ///
    /// Calendar units map to approximations (a month is an average month), so this
    /// must never feed exact bucket arithmetic.
    pub fn to_approx_ms(&self) -> u64 {
        match self {
            Interval::Fixed(ms) => *ms,
            Interval::Calendar(unit) => unit.approx_ms(),
        }
    }
}

impl From<u64> for Interval {
    fn from(ms: u64) -> Self {
        Interval::Fixed(ms)
    }
}

impl From<IntervalUnit> for Interval {
    fn from(unit: IntervalUnit) -> Self {
        Interval::Calendar(unit)
    }
}

/// Ordering helpers over mixed fixed/calendar intervals.
pub struct IntervalMath;

impl IntervalMath {
    /// Numeric value of an interval (see [`Interval::to_approx_ms`]).
    pub fn number_value(value: &Interval) -> u64 {
        value.to_approx_ms()
    }

    /// The interval with the largest numeric value; ties keep the first occurrence.
    pub fn max(values: &[Interval]) -> Option<Interval> {
        Self::pick(values, |candidate, best| candidate > best)
    }

    /// The interval with the smallest numeric value; ties keep the first occurrence.
    pub fn min(values: &[Interval]) -> Option<Interval> {
        Self::pick(values, |candidate, best| candidate < best)
    }

    fn pick(values: &[Interval], better: impl Fn(u64, u64) -> bool) -> Option<Interval> {
        let mut iter = values.iter();
        let mut best = *iter.next()?;
        for value in iter {
            if better(value.to_approx_ms(), best.to_approx_ms()) {
                best = *value;
            }
        }
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_number_value() {
        assert_eq!(IntervalMath::number_value(&Interval::Fixed(5_000)), 5_000);
        assert_eq!(IntervalMath::number_value(&IntervalUnit::Week.into()), 604_800_000);
        assert_eq!(IntervalMath::number_value(&IntervalUnit::WeekIso.into()), 604_800_000);
        assert_eq!(IntervalMath::number_value(&IntervalUnit::Month.into()), AVG_MONTH);
        assert_eq!(AVG_QUARTER, 3 * AVG_MONTH);
    }

    #[test]
    fn test_max_min_return_original_value() {
        let values = [
            Interval::Fixed(DAY),
            Interval::Calendar(IntervalUnit::Month),
            Interval::Fixed(HOUR),
        ];
        assert_eq!(IntervalMath::max(&values), Some(Interval::Calendar(IntervalUnit::Month)));
        assert_eq!(IntervalMath::min(&values), Some(Interval::Fixed(HOUR)));
        assert_eq!(IntervalMath::max(&[]), None);
    }

    #[test]
    fn test_ties_keep_first() {
        let values = [
            Interval::Calendar(IntervalUnit::WeekIso),
            Interval::Fixed(WEEK),
            Interval::Calendar(IntervalUnit::Week),
        ];
        assert_eq!(IntervalMath::max(&values), Some(Interval::Calendar(IntervalUnit::WeekIso)));
        assert_eq!(IntervalMath::min(&values), Some(Interval::Calendar(IntervalUnit::WeekIso)));
    }

    #[test]
    fn test_serde_untagged() {
        let fixed: Interval = serde_json::from_str("60000").unwrap();
        assert_eq!(fixed, Interval::Fixed(60_000));
        let month: Interval = serde_json::from_str("\"MONTH\"").unwrap();
        assert_eq!(month, Interval::Calendar(IntervalUnit::Month));
        assert_eq!(serde_json::to_string(&Interval::Calendar(IntervalUnit::WeekIso)).unwrap(), "\"WEEK_ISO\"");
        assert_eq!(IntervalUnit::from_str("QUARTER").unwrap(), IntervalUnit::Quarter);
    }
}
