//! Subscription window assembly.
//!
//! Turns a widget [`Timewindow`] into a [`ResolvedWindow`]: absolute or
//! rolling bounds, the aggregation interval, and the number of buckets the
//! backend will produce for it.

use crate::error::{Result, TwError};
use crate::time::clock::ClockProvider;
use crate::time::interval::{Interval, SECOND};
use crate::time::quick::QuickTimeInterval;
use crate::window::bucket::count_buckets;
use crate::window::limits::DatapointsLimitPolicy;
use crate::window::model::{
    AggregationSpec, AggregationType, FixedWindow, HistoryWindow, RealtimeWindow, ResolvedWindow, Timewindow,
    TimewindowTab,
};

/// Bounds computed for the active tab, before aggregation is resolved.
struct Bounds {
    start_ts: i64,
    fixed_window: Option<FixedWindow>,
    realtime_window_ms: Option<u64>,
    quick_interval: Option<QuickTimeInterval>,
    window_ms: u64,
}

fn width_ms(window: &FixedWindow) -> Result<u64> {
    window.validate()?;
    Ok(u64::try_from(window.width_ms()?)?)
}

fn back_from(ts: i64, window_ms: u64) -> Result<i64> {
    ts.checked_sub(i64::try_from(window_ms)?)
        .ok_or_else(|| TwError::out_of_range(format!("{ts} - {window_ms} ms")))
}

fn history_bounds(window: FixedWindow, quick_interval: Option<QuickTimeInterval>) -> Result<Bounds> {
    Ok(Bounds {
        start_ts: window.start_time_ms,
        window_ms: width_ms(&window)?,
        fixed_window: Some(window),
        realtime_window_ms: None,
        quick_interval,
    })
}

/// Resolves `timewindow` into a query-ready window.
///
/// `state_data` requests raw state transitions: aggregation is forced to
/// `NONE` and no buckets are computed.
///
/// # Errors
///
/// Fails on an unknown timezone, a configured fixed window whose end precedes
/// its start, a zero-length fixed interval, or bounds and calendar arithmetic
/// outside the representable range.
pub fn create_subscription_timewindow<P>(
    timewindow: &Timewindow,
    state_data: bool,
    clock: &ClockProvider,
    policy: &P,
) -> Result<ResolvedWindow>
where
    P: DatapointsLimitPolicy + ?Sized,
{
    let timezone = timewindow.timezone.as_deref();
    let tz = clock.resolve_timezone(timezone)?;
    let ts_offset = clock.ts_offset(timezone)?;
    let now = clock.now_in(&tz);
    let now_ms = now.timestamp_millis();

    let agg_type = if state_data {
        AggregationType::None
    } else {
        timewindow.aggregation.agg_type.unwrap_or_default()
    };
    let limit_cap = match timewindow.aggregation.limit {
        Some(limit) if !state_data => limit,
        _ => policy.max_datapoints_limit(),
    };

    let bounds = match timewindow.selected_tab {
        TimewindowTab::Realtime => match &timewindow.realtime.window {
            RealtimeWindow::LastInterval { timewindow_ms } => {
                let window_ms = *timewindow_ms;
                log::debug!("Resolving realtime window of the last {} ms", window_ms);
                Bounds {
                    start_ts: back_from(now_ms + ts_offset, window_ms)?,
                    fixed_window: None,
                    realtime_window_ms: Some(window_ms),
                    quick_interval: None,
                    window_ms,
                }
            }
            RealtimeWindow::Interval { quick_interval } => {
                let window_ms = quick_interval.typical_duration_ms()?;
                log::debug!("Resolving realtime window for {}", quick_interval);
                Bounds {
                    start_ts: quick_interval.start_of(&now)?.timestamp_millis(),
                    fixed_window: None,
                    realtime_window_ms: Some(window_ms),
                    quick_interval: Some(*quick_interval),
                    window_ms,
                }
            }
        },
        TimewindowTab::History => match &timewindow.history.window {
            HistoryWindow::LastInterval { timewindow_ms } => {
                let start = back_from(now_ms, *timewindow_ms)?;
                history_bounds(FixedWindow::new(start, now_ms)?, None)?
            }
            HistoryWindow::Interval { quick_interval } => {
                let (start, end) = quick_interval.start_end(&tz, clock)?;
                log::debug!("Resolved {} to [{}, {}]", quick_interval, start, end);
                history_bounds(FixedWindow::new(start, end)?, Some(*quick_interval))?
            }
            HistoryWindow::Fixed { fixed_timewindow } => {
                fixed_timewindow.validate()?;
                history_bounds(fixed_timewindow.shifted(-ts_offset)?, None)?
            }
            HistoryWindow::ForAllTime => history_bounds(FixedWindow::new(0, now_ms)?, None)?,
        },
    };

    let interval = if agg_type == AggregationType::None {
        Interval::Fixed(SECOND)
    } else {
        match timewindow.selected_interval() {
            Some(interval) => interval,
            None => policy.bound_interval_to_timewindow(bounds.window_ms, agg_type),
        }
    };
    if interval == Interval::Fixed(0) {
        return Err(TwError::invalid_interval("aggregation interval must be greater than 0 ms"));
    }

    let limit = if agg_type == AggregationType::None {
        limit_cap
    } else {
        let count = count_buckets(bounds.start_ts, bounds.window_ms, interval, &tz)?;
        if count > policy.max_datapoints_limit() {
            log::warn!(
                "Interval {:?} yields {} buckets over {} ms, above the datapoint limit {}",
                interval,
                count,
                bounds.window_ms,
                policy.max_datapoints_limit()
            );
        }
        count
    };

    Ok(ResolvedWindow {
        start_ts: bounds.start_ts,
        fixed_window: bounds.fixed_window,
        realtime_window_ms: bounds.realtime_window_ms,
        quick_interval: bounds.quick_interval,
        timezone: timewindow.timezone.clone(),
        ts_offset_ms: ts_offset,
        aggregation: AggregationSpec {
            agg_type,
            interval,
            limit,
            time_window_ms: bounds.window_ms,
            state_data,
        },
    })
}
