//! Comparison windows.
//!
//! A comparison window has the same width as its source and lies earlier in
//! time, so two series can be overlaid for trend display.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Result, TwError};
use crate::time::calendar::{self, CalendarUnit};
use crate::time::clock::ClockProvider;
use crate::window::bucket::count_buckets;
use crate::window::model::{AggregationType, FixedWindow, ResolvedWindow};

/// Calendar units a comparison may step back by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonUnit {
    /// One calendar day
    Day,
    /// One Sunday-based week
    Week,
    /// One calendar month
    Month,
    /// One calendar year
    Year,
}

impl From<ComparisonUnit> for CalendarUnit {
    fn from(unit: ComparisonUnit) -> Self {
        match unit {
            ComparisonUnit::Day => CalendarUnit::Day,
            ComparisonUnit::Week => CalendarUnit::Week,
            ComparisonUnit::Month => CalendarUnit::Month,
            ComparisonUnit::Year => CalendarUnit::Year,
        }
    }
}

/// How far back the comparison window lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonSpec {
    /// The period before the source window; one calendar step back for quick intervals
    PreviousInterval,
    /// A custom offset in milliseconds
    CustomInterval(i64),
    /// One calendar unit earlier
    Calendar(ComparisonUnit),
}

fn shift_back(unit: CalendarUnit, tz: &chrono_tz::Tz, ts: i64) -> Result<i64> {
    let at = calendar::at_millis(tz, ts)?;
    Ok(calendar::add(unit, &at, -1)?.timestamp_millis())
}

fn plus(ts: i64, ms: i64) -> Result<i64> {
    ts.checked_add(ms).ok_or_else(|| TwError::out_of_range(format!("{ts} + {ms} ms")))
}

fn minus(ts: i64, ms: i64) -> Result<i64> {
    ts.checked_sub(ms).ok_or_else(|| TwError::out_of_range(format!("{ts} - {ms} ms")))
}

/// Derives the comparison window for `source`.
///
/// The result always has the source width. For a quick-interval source the
/// previous interval starts one calendar step earlier, so when the previous
/// period is shorter (February before March) the comparison overlaps the
/// first days of the source.
///
/// # Errors
///
/// Realtime sources have no fixed bounds and yield [`TwError::NotComparable`].
/// Bounds that leave the `i64` range or the calendar yield
/// [`TwError::OutOfRange`]; an unknown zone yields [`TwError::UnknownTimezone`].
pub fn comparison_window(source: &ResolvedWindow, spec: &ComparisonSpec, clock: &ClockProvider) -> Result<ResolvedWindow> {
    let window = source
        .fixed_window
        .ok_or_else(|| TwError::not_comparable("realtime windows have no fixed bounds"))?;
    window.validate()?;
    let width = window.width_ms()?;
    let tz = clock.resolve_timezone(source.timezone.as_deref())?;

    let (start, end) = match *spec {
        ComparisonSpec::PreviousInterval => match source.quick_interval {
            Some(tag) => {
                let start = shift_back(tag.comparison_step()?, &tz, window.start_time_ms)?;
                (start, plus(start, width)?)
            }
            None => (minus(window.start_time_ms, width)?, window.start_time_ms),
        },
        ComparisonSpec::CustomInterval(offset_ms) => {
            if offset_ms <= 0 {
                log::warn!("Ignoring non-positive comparison offset {} ms", offset_ms);
                (window.start_time_ms, window.end_time_ms)
            } else {
                let end = minus(window.end_time_ms, offset_ms)?;
                (minus(end, width)?, end)
            }
        }
        ComparisonSpec::Calendar(unit) => {
            let end = shift_back(unit.into(), &tz, window.end_time_ms)?;
            (minus(end, width)?, end)
        }
    };
    log::debug!("Comparison {:?} of [{}, {}] is [{}, {}]", spec, window.start_time_ms, window.end_time_ms, start, end);

    let mut aggregation = source.aggregation;
    if aggregation.agg_type != AggregationType::None {
        aggregation.limit = count_buckets(start, aggregation.time_window_ms, aggregation.interval, &tz)?;
    }

    Ok(ResolvedWindow {
        start_ts: start,
        fixed_window: Some(FixedWindow::new(start, end)?),
        realtime_window_ms: None,
        quick_interval: None,
        timezone: source.timezone.clone(),
        ts_offset_ms: source.ts_offset_ms,
        aggregation,
    })
}
