//! Aggregation bucket alignment and counting.
//!
//! Fixed intervals are plain modular arithmetic anchored at the window start.
//! Calendar intervals walk real unit boundaries in the window's zone, so a
//! "month" bucket is as long as that month actually is.

use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Result, TwError};
use crate::time::calendar::{self, CalendarUnit};
use crate::time::interval::Interval;
use crate::window::model::FixedWindow;

/// A half-open bucket `[start_ts, end_ts)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// First millisecond of the bucket
    pub start_ts: i64,
    /// First millisecond after the bucket
    pub end_ts: i64,
}

fn positive_ms(ms: u64) -> Result<i64> {
    if ms == 0 {
        return Err(TwError::invalid_interval("fixed interval must be greater than 0 ms"));
    }
    Ok(i64::try_from(ms)?)
}

/// The bucket of `window` that contains `ts`.
///
/// Fixed buckets are anchored at `window.start + ts_offset`. Calendar buckets
/// follow the unit containing `ts` in `tz`, with the start clamped up to the
/// window start. Every bucket end is clamped to the window end.
pub fn bucket_for(window: &FixedWindow, interval: Interval, ts_offset: i64, tz: &Tz, ts: i64) -> Result<Bucket> {
    let (start_ts, end_ts) = match interval {
        Interval::Fixed(ms) => {
            let ms = positive_ms(ms)?;
            let overflow = || TwError::out_of_range(format!("fixed bucket of {ts} with offset {ts_offset} ms"));
            let origin = window.start_time_ms.checked_add(ts_offset).ok_or_else(overflow)?;
            let steps = ts.checked_sub(origin).ok_or_else(overflow)?.div_euclid(ms);
            let start = steps
                .checked_mul(ms)
                .and_then(|delta| origin.checked_add(delta))
                .ok_or_else(overflow)?;
            // the end is clamped to the window end below
            (start, start.saturating_add(ms))
        }
        Interval::Calendar(unit) => {
            let unit = CalendarUnit::from(unit);
            let at = calendar::at_millis(tz, ts)?;
            let natural_start = calendar::start_of(unit, &at)?.timestamp_millis();
            let natural_end = calendar::end_of(unit, &at)?.timestamp_millis() + 1;
            (natural_start.max(window.start_time_ms), natural_end)
        }
    };
    Ok(Bucket { start_ts, end_ts: end_ts.min(window.end_time_ms) })
}

/// Number of buckets needed to cover `window_ms` starting at `start_ts`.
pub fn count_buckets(start_ts: i64, window_ms: u64, interval: Interval, tz: &Tz) -> Result<u32> {
    match interval {
        Interval::Fixed(ms) => {
            positive_ms(ms)?;
            let count = window_ms / ms + u64::from(window_ms % ms != 0);
            Ok(u32::try_from(count)?)
        }
        Interval::Calendar(unit) => {
            if window_ms == 0 {
                return Ok(0);
            }
            let unit = CalendarUnit::from(unit);
            let end = start_ts
                .checked_add(i64::try_from(window_ms)?)
                .ok_or_else(|| TwError::out_of_range(format!("{start_ts} + {window_ms} ms")))?;
            let mut reference = start_ts;
            let mut count: u32 = 0;
            loop {
                let at = calendar::at_millis(tz, reference)?;
                if calendar::start_of(unit, &at)?.timestamp_millis() >= end {
                    break;
                }
                count = count
                    .checked_add(1)
                    .ok_or_else(|| TwError::out_of_range("bucket count exceeds u32"))?;
                reference = calendar::end_of(unit, &at)?.timestamp_millis() + 1;
            }
            Ok(count)
        }
    }
}

/// Every bucket of `window`, in order.
pub fn tile(window: &FixedWindow, interval: Interval, ts_offset: i64, tz: &Tz) -> Result<Vec<Bucket>> {
    window.validate()?;
    let mut buckets = Vec::new();
    let mut cursor = window.start_time_ms;
    while cursor < window.end_time_ms {
        let bucket = bucket_for(window, interval, ts_offset, tz, cursor)?;
        if bucket.end_ts <= cursor {
            return Err(TwError::invalid_interval(format!("bucket at {cursor} does not advance")));
        }
        cursor = bucket.end_ts;
        buckets.push(bucket);
    }
    Ok(buckets)
}
