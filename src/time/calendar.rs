// src/time/calendar.rs

//! Calendar arithmetic in an explicit timezone.
//!
//! All unit alignment and unit stepping works on local wall-clock time and is
//! converted back to an instant afterwards, so a "day" across a DST switch is
//! 23 or 25 hours long. Local times that do not exist (DST gaps) are pushed
//! forward to the first valid instant; ambiguous local times resolve to the
//! earlier instant.

use chrono::{DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::error::{Result, TwError};
use crate::time::interval::IntervalUnit;

/// Step used when searching for the end of a DST gap.
const GAP_STEP_MINUTES: i64 = 15;
/// Gaps never exceed a day (Samoa skipped one in 2011).
const MAX_GAP_STEPS: usize = 24 * 4 + 1;

/// Calendar units the resolver aligns to and steps by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarUnit {
    /// Local clock hour
    Hour,
    /// Local calendar day
    Day,
    /// Sunday-based week
    Week,
    /// Monday-based ISO week
    IsoWeek,
    /// Calendar month
    Month,
    /// Calendar quarter
    Quarter,
    /// Half year (January or July start)
    HalfYear,
    /// Calendar year
    Year,
}

impl From<IntervalUnit> for CalendarUnit {
    fn from(unit: IntervalUnit) -> Self {
        match unit {
            IntervalUnit::Week => CalendarUnit::Week,
            IntervalUnit::WeekIso => CalendarUnit::IsoWeek,
            IntervalUnit::Month => CalendarUnit::Month,
            IntervalUnit::Quarter => CalendarUnit::Quarter,
        }
    }
}

/// Converts epoch milliseconds into an instant in `tz`.
pub fn at_millis(tz: &Tz, ms: i64) -> Result<DateTime<Tz>> {
    match tz.timestamp_millis_opt(ms) {
        LocalResult::Single(dt) => Ok(dt),
        _ => Err(TwError::out_of_range(format!("{ms} ms since epoch"))),
    }
}

/// Resolves a local wall-clock time in `tz` to an instant.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>> {
    let mut candidate = naive;
    for _ in 0..MAX_GAP_STEPS {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return Ok(dt),
            LocalResult::Ambiguous(earliest, _) => return Ok(earliest),
            LocalResult::None => {
                candidate = candidate
                    .checked_add_signed(Duration::minutes(GAP_STEP_MINUTES))
                    .ok_or_else(|| TwError::out_of_range(format!("local time {naive}")))?;
            }
        }
    }
    Err(TwError::out_of_range(format!("local time {naive} does not exist in {}", tz.name())))
}

fn midnight(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TwError::out_of_range(format!("midnight of {date}")))?;
    localize(tz, naive)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TwError::out_of_range(format!("{year}-{month:02}-01")))
}

fn days_back(date: NaiveDate, days: u32) -> Result<NaiveDate> {
    date.checked_sub_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| TwError::out_of_range(format!("{days} days before {date}")))
}

/// Start of the unit containing `dt`, in the zone of `dt`.
pub fn start_of(unit: CalendarUnit, dt: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    let tz = dt.timezone();
    let local = dt.naive_local();
    let date = local.date();
    match unit {
        CalendarUnit::Hour => {
            // Truncate in absolute terms so the second pass of an ambiguous hour stays put.
            let into_hour = i64::from(local.minute()) * 60_000
                + i64::from(local.second()) * 1_000
                + i64::from(local.nanosecond() / 1_000_000);
            dt.checked_sub_signed(Duration::milliseconds(into_hour))
                .ok_or_else(|| TwError::out_of_range(format!("start of hour for {dt}")))
        }
        CalendarUnit::Day => midnight(&tz, date),
        CalendarUnit::Week => midnight(&tz, days_back(date, date.weekday().num_days_from_sunday())?),
        CalendarUnit::IsoWeek => midnight(&tz, days_back(date, date.weekday().num_days_from_monday())?),
        CalendarUnit::Month => midnight(&tz, first_of_month(date.year(), date.month())?),
        CalendarUnit::Quarter => {
            let quarter = date.month0() / 3;
            midnight(&tz, first_of_month(date.year(), quarter * 3 + 1)?)
        }
        CalendarUnit::HalfYear => {
            let quarter = date.month0() / 3;
            let month = if quarter < 2 { 1 } else { 7 };
            midnight(&tz, first_of_month(date.year(), month)?)
        }
        CalendarUnit::Year => midnight(&tz, first_of_month(date.year(), 1)?),
    }
}

fn shift_months(naive: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        naive.checked_add_months(magnitude)
    } else {
        naive.checked_sub_months(magnitude)
    }
}

/// Moves `dt` by `amount` units (negative moves back).
///
/// Hours are absolute; every other unit keeps the local wall-clock time and clamps
/// the day of month where needed (January 31st plus one month is February's last day).
pub fn add(unit: CalendarUnit, dt: &DateTime<Tz>, amount: i32) -> Result<DateTime<Tz>> {
    let tz = dt.timezone();
    let naive = dt.naive_local();
    let amount = i64::from(amount);
    let overflow = || TwError::out_of_range(format!("{dt} moved by {amount} x {unit:?}"));

    let shifted = match unit {
        CalendarUnit::Hour => {
            return dt.checked_add_signed(Duration::hours(amount)).ok_or_else(overflow);
        }
        CalendarUnit::Day => naive.checked_add_signed(Duration::days(amount)),
        CalendarUnit::Week | CalendarUnit::IsoWeek => naive.checked_add_signed(Duration::weeks(amount)),
        CalendarUnit::Month => shift_months(naive, amount),
        CalendarUnit::Quarter => shift_months(naive, amount * 3),
        CalendarUnit::HalfYear => shift_months(naive, amount * 6),
        CalendarUnit::Year => shift_months(naive, amount * 12),
    }
    .ok_or_else(overflow)?;

    localize(&tz, shifted)
}

/// Last millisecond of the unit containing `dt`.
pub fn end_of(unit: CalendarUnit, dt: &DateTime<Tz>) -> Result<DateTime<Tz>> {
    let next = add(unit, &start_of(unit, dt)?, 1)?;
    next.checked_sub_signed(Duration::milliseconds(1))
        .ok_or_else(|| TwError::out_of_range(format!("end of {unit:?} for {dt}")))
}
