use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use timewindow_resolver::time::interval::{IntervalUnit, DAY, HOUR, MINUTE, SECOND};
use timewindow_resolver::window::{
    create_subscription_timewindow, AggregationType, DatapointsLimitPolicy, DefaultLimitPolicy, FixedWindow, Timewindow,
};
use timewindow_resolver::{ClockProvider, Interval, QuickTimeInterval, TwError};

fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp_millis()
}

fn clock() -> ClockProvider {
    ClockProvider::fixed(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(), Tz::UTC)
}

/// Policy that always answers with one fixed interval.
struct FixedPolicy(Interval, u32);

impl DatapointsLimitPolicy for FixedPolicy {
    fn max_datapoints_limit(&self) -> u32 {
        self.1
    }

    fn bound_interval_to_timewindow(&self, _window_ms: u64, _agg_type: AggregationType) -> Interval {
        self.0
    }
}

#[test]
fn test_history_quick_uses_policy_interval() {
    let tw = Timewindow::history_quick(QuickTimeInterval::CurrentMonthSoFar);
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()).unwrap();

    let window = FixedWindow::new(ms(2024, 3, 1, 0), ms(2024, 3, 15, 10)).unwrap();
    assert_eq!(resolved.fixed_window, Some(window));
    assert_eq!(resolved.start_ts, window.start_time_ms);
    assert_eq!(resolved.quick_interval, Some(QuickTimeInterval::CurrentMonthSoFar));
    assert!(resolved.is_history());
    assert_eq!(resolved.window_ms(), window.width_ms().unwrap() as u64);
    // 346 hours over 200 points is ~1.7 h, snapped to 2 h
    assert_eq!(resolved.aggregation.agg_type, AggregationType::Avg);
    assert_eq!(resolved.aggregation.interval, Interval::Fixed(2 * HOUR));
    assert_eq!(resolved.aggregation.limit, 173);
}

#[test]
fn test_realtime_last_interval() {
    let tw = Timewindow::realtime_last(HOUR).with_interval(MINUTE).with_aggregation(AggregationType::Sum, None);
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()).unwrap();
    assert!(resolved.is_realtime());
    assert_eq!(resolved.fixed_window, None);
    assert_eq!(resolved.realtime_window_ms, Some(HOUR));
    assert_eq!(resolved.start_ts, ms(2024, 3, 15, 9));
    assert_eq!(resolved.aggregation.limit, 60);
}

#[test]
fn test_realtime_start_includes_ts_offset() {
    // the caller sits in UTC, the widget in Berlin (+01:00 in March before the switch)
    let tw = Timewindow::realtime_last(HOUR).with_timezone("Europe/Berlin");
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()).unwrap();
    assert_eq!(resolved.ts_offset_ms, (HOUR) as i64);
    assert_eq!(resolved.start_ts, ms(2024, 3, 15, 10));
    assert_eq!(resolved.timezone.as_deref(), Some("Europe/Berlin"));
}

#[test]
fn test_history_fixed_is_shifted_by_ts_offset() {
    let tw = Timewindow::history_fixed(ms(2024, 3, 1, 0), ms(2024, 3, 2, 0)).with_timezone("Asia/Kolkata");
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()).unwrap();
    let offset = (5 * HOUR + 30 * MINUTE) as i64;
    assert_eq!(resolved.ts_offset_ms, offset);
    assert_eq!(
        resolved.fixed_window,
        Some(FixedWindow::new(ms(2024, 3, 1, 0) - offset, ms(2024, 3, 2, 0) - offset).unwrap())
    );
    assert_eq!(resolved.window_ms(), DAY);
}

#[test]
fn test_history_last_interval() {
    let tw = Timewindow::history_last(DAY).with_interval(HOUR);
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()).unwrap();
    assert_eq!(resolved.fixed_window, Some(FixedWindow::new(ms(2024, 3, 14, 10), ms(2024, 3, 15, 10)).unwrap()));
    assert_eq!(resolved.aggregation.limit, 24);
}

#[test]
fn test_for_all_time() {
    let tw = Timewindow::for_all_time().with_interval(IntervalUnit::Quarter);
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()).unwrap();
    assert_eq!(resolved.start_ts, 0);
    assert_eq!(resolved.fixed_window.map(|w| w.end_time_ms), Some(ms(2024, 3, 15, 10)));
    // 1970-Q1 through 2024-Q1
    assert_eq!(resolved.aggregation.limit, 54 * 4 + 1);
}

#[test]
fn test_calendar_interval_from_policy() {
    let policy = FixedPolicy(Interval::Calendar(IntervalUnit::Month), 100);
    let tw = Timewindow::history_quick(QuickTimeInterval::PreviousYear);
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &policy).unwrap();
    assert_eq!(resolved.fixed_window, Some(FixedWindow::new(ms(2023, 1, 1, 0), ms(2024, 1, 1, 0)).unwrap()));
    assert_eq!(resolved.aggregation.interval, Interval::Calendar(IntervalUnit::Month));
    assert_eq!(resolved.aggregation.limit, 12);
}

#[test]
fn test_explicit_interval_may_exceed_limit() {
    let policy = FixedPolicy(Interval::Fixed(HOUR), 10);
    let tw = Timewindow::history_last(HOUR).with_interval(SECOND);
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &policy).unwrap();
    assert_eq!(resolved.aggregation.interval, Interval::Fixed(SECOND));
    assert_eq!(resolved.aggregation.limit, 3_600);
}

#[test]
fn test_state_data() {
    let tw = Timewindow::history_last(DAY).with_aggregation(AggregationType::Count, Some(100));
    let resolved = create_subscription_timewindow(&tw, true, &clock(), &DefaultLimitPolicy::default()).unwrap();
    assert_eq!(resolved.aggregation.agg_type, AggregationType::None);
    assert_eq!(resolved.aggregation.interval, Interval::Fixed(SECOND));
    assert!(resolved.aggregation.state_data);
}

#[test]
fn test_unknown_timezone() {
    let tw = Timewindow::history_last(DAY).with_timezone("Mars/Olympus_Mons");
    assert_matches!(
        create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()),
        Err(TwError::UnknownTimezone(_))
    );
}

#[test]
fn test_resolved_window_json() {
    let tw = Timewindow::history_fixed(1_000, 5_000).with_interval(1_000u64);
    let resolved = create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()).unwrap();
    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["startTs"], 1_000);
    assert_eq!(json["fixedWindow"]["endTimeMs"], 5_000);
    assert_eq!(json["aggregation"]["type"], "AVG");
    assert_eq!(json["aggregation"]["limit"], 4);
    assert!(json.get("realtimeWindowMs").is_none());
}

#[test]
fn test_full_range_fixed_window_is_out_of_range() {
    let json = r#"{
        "selectedTab": "HISTORY",
        "history": {
            "historyType": "FIXED",
            "fixedTimewindow": { "startTimeMs": -9223372036854775808, "endTimeMs": 9223372036854775807 }
        }
    }"#;
    let tw = Timewindow::from_json(json).unwrap();
    assert_matches!(
        create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()),
        Err(TwError::OutOfRange(_))
    );
}

#[test]
fn test_fixed_window_shift_past_i64_max_is_out_of_range() {
    // New York sits behind UTC, so the window moves forward by the offset
    let tw = Timewindow::history_fixed(0, i64::MAX).with_timezone("America/New_York");
    assert_matches!(
        create_subscription_timewindow(&tw, false, &clock(), &DefaultLimitPolicy::default()),
        Err(TwError::OutOfRange(_))
    );
}
