// src/time/quick.rs

//! Named calendar ranges ("previous month", "current week so far", ...).
//!
//! Every tag is described by one [`BoundaryRule`] in a table built once per
//! process: how to step back from the reference instant, which unit to align
//! to, where the range ends, the typical length used for realtime bounding,
//! and the step used to derive a previous-period comparison.

use std::collections::HashMap;

use chrono::DateTime;
use chrono_tz::Tz;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{Result, TwError};
use crate::time::calendar::{self, CalendarUnit};
use crate::time::clock::ClockProvider;
use crate::time::interval::{AVG_MONTH, AVG_QUARTER, DAY, HOUR, WEEK, YEAR};

/// Named calendar-relative time ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuickTimeInterval {
    /// The whole of yesterday
    Yesterday,
    /// The whole of the day before yesterday
    DayBeforeYesterday,
    /// The same weekday one week ago
    ThisDayLastWeek,
    /// The previous Sunday-based week
    PreviousWeek,
    /// The previous ISO week
    PreviousWeekIso,
    /// The previous calendar month
    PreviousMonth,
    /// The previous calendar quarter
    PreviousQuarter,
    /// The previous half year
    PreviousHalfYear,
    /// The previous calendar year
    PreviousYear,
    /// The current clock hour
    CurrentHour,
    /// The whole of today
    CurrentDay,
    /// Today up to now
    CurrentDaySoFar,
    /// The whole current Sunday-based week
    CurrentWeek,
    /// The whole current ISO week
    CurrentWeekIso,
    /// The current Sunday-based week up to now
    CurrentWeekSoFar,
    /// The current ISO week up to now
    CurrentWeekIsoSoFar,
    /// The whole current month
    CurrentMonth,
    /// The current month up to now
    CurrentMonthSoFar,
    /// The whole current quarter
    CurrentQuarter,
    /// The current quarter up to now
    CurrentQuarterSoFar,
    /// The whole current half year
    CurrentHalfYear,
    /// The current half year up to now
    CurrentHalfYearSoFar,
    /// The whole current year
    CurrentYear,
    /// The current year up to now
    CurrentYearSoFar,
}

/// Where a quick range ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndRule {
    /// Exactly one unit after the start
    Span(CalendarUnit),
    /// The current instant
    Now,
}

/// Boundary description of one quick interval.
#[derive(Debug, Clone, Copy)]
struct BoundaryRule {
    step_back: Option<(CalendarUnit, i32)>,
    align: CalendarUnit,
    end: EndRule,
    typical_ms: u64,
    comparison_step: CalendarUnit,
}

impl BoundaryRule {
    fn previous(unit: CalendarUnit, typical_ms: u64) -> Self {
        Self { step_back: Some((unit, 1)), align: unit, end: EndRule::Span(unit), typical_ms, comparison_step: unit }
    }

    fn current(unit: CalendarUnit, typical_ms: u64) -> Self {
        Self { step_back: None, align: unit, end: EndRule::Span(unit), typical_ms, comparison_step: unit }
    }

    fn so_far(unit: CalendarUnit, typical_ms: u64) -> Self {
        Self { step_back: None, align: unit, end: EndRule::Now, typical_ms, comparison_step: unit }
    }

    fn single_day(back: CalendarUnit, amount: i32, comparison_step: CalendarUnit) -> Self {
        Self {
            step_back: Some((back, amount)),
            align: CalendarUnit::Day,
            end: EndRule::Span(CalendarUnit::Day),
            typical_ms: DAY,
            comparison_step,
        }
    }
}

fn rule_for(tag: QuickTimeInterval) -> BoundaryRule {
    use CalendarUnit as U;
    use QuickTimeInterval as Q;

    let half_year = 2 * AVG_QUARTER;
    match tag {
        Q::Yesterday => BoundaryRule::single_day(U::Day, 1, U::Day),
        Q::DayBeforeYesterday => BoundaryRule::single_day(U::Day, 2, U::Day),
        Q::ThisDayLastWeek => BoundaryRule::single_day(U::Week, 1, U::Week),
        Q::PreviousWeek => BoundaryRule::previous(U::Week, WEEK),
        Q::PreviousWeekIso => BoundaryRule::previous(U::IsoWeek, WEEK),
        Q::PreviousMonth => BoundaryRule::previous(U::Month, AVG_MONTH),
        Q::PreviousQuarter => BoundaryRule::previous(U::Quarter, AVG_QUARTER),
        Q::PreviousHalfYear => BoundaryRule::previous(U::HalfYear, half_year),
        Q::PreviousYear => BoundaryRule::previous(U::Year, YEAR),
        Q::CurrentHour => BoundaryRule::current(U::Hour, HOUR),
        Q::CurrentDay => BoundaryRule::current(U::Day, DAY),
        Q::CurrentDaySoFar => BoundaryRule::so_far(U::Day, DAY),
        Q::CurrentWeek => BoundaryRule::current(U::Week, WEEK),
        Q::CurrentWeekIso => BoundaryRule::current(U::IsoWeek, WEEK),
        Q::CurrentWeekSoFar => BoundaryRule::so_far(U::Week, WEEK),
        Q::CurrentWeekIsoSoFar => BoundaryRule::so_far(U::IsoWeek, WEEK),
        Q::CurrentMonth => BoundaryRule::current(U::Month, AVG_MONTH),
        Q::CurrentMonthSoFar => BoundaryRule::so_far(U::Month, AVG_MONTH),
        Q::CurrentQuarter => BoundaryRule::current(U::Quarter, AVG_QUARTER),
        Q::CurrentQuarterSoFar => BoundaryRule::so_far(U::Quarter, AVG_QUARTER),
        Q::CurrentHalfYear => BoundaryRule::current(U::HalfYear, half_year),
        Q::CurrentHalfYearSoFar => BoundaryRule::so_far(U::HalfYear, half_year),
        Q::CurrentYear => BoundaryRule::current(U::Year, YEAR),
        Q::CurrentYearSoFar => BoundaryRule::so_far(U::Year, YEAR),
    }
}

lazy_static! {
    static ref BOUNDARY_RULES: HashMap<QuickTimeInterval, BoundaryRule> =
        QuickTimeInterval::iter().map(|tag| (tag, rule_for(tag))).collect();
}

impl QuickTimeInterval {
    fn rule(&self) -> Result<&'static BoundaryRule> {
        BOUNDARY_RULES.get(self).ok_or(TwError::MissingRule(*self))
    }

    /// Whether the range ends at "now" rather than at a unit boundary.
    pub fn is_so_far(&self) -> Result<bool> {
        Ok(self.rule()?.end == EndRule::Now)
    }

    /// Start of the range relative to `reference`.
    pub fn start_of(&self, reference: &DateTime<Tz>) -> Result<DateTime<Tz>> {
        let rule = self.rule()?;
        let anchor = match rule.step_back {
            Some((unit, amount)) => calendar::add(unit, reference, -amount)?,
            None => *reference,
        };
        calendar::start_of(rule.align, &anchor)
    }

    /// End of the range that begins at `start`; so-far ranges end at `now`.
    pub fn end_of(&self, start: &DateTime<Tz>, now: &DateTime<Tz>) -> Result<DateTime<Tz>> {
        match self.rule()?.end {
            EndRule::Span(unit) => calendar::add(unit, start, 1),
            EndRule::Now => Ok(*now),
        }
    }

    /// Start and end in epoch milliseconds, both derived from one reading of the clock.
    pub fn start_end(&self, tz: &Tz, clock: &ClockProvider) -> Result<(i64, i64)> {
        let now = clock.now_in(tz);
        let start = self.start_of(&now)?;
        let end = self.end_of(&start, &now)?;
        Ok((start.timestamp_millis(), end.timestamp_millis()))
    }

    /// Typical length of the range, used to bound realtime aggregation intervals.
    pub fn typical_duration_ms(&self) -> Result<u64> {
        Ok(self.rule()?.typical_ms)
    }

    /// Calendar step that moves this range to its previous period.
    pub fn comparison_step(&self) -> Result<CalendarUnit> {
        Ok(self.rule()?.comparison_step)
    }
}
