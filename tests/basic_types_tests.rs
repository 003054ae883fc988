use timewindow_resolver::config::{ConfigError, LogLevel};
use timewindow_resolver::error::TwError;
use timewindow_resolver::time::interval::{IntervalMath, IntervalUnit, AVG_MONTH, AVG_QUARTER, WEEK};
use timewindow_resolver::window::{AggregationType, ComparisonUnit};
use timewindow_resolver::{Interval, QuickTimeInterval};
use std::str::FromStr;

#[test]
fn test_interval_json_is_untagged() {
    let fixed: Interval = serde_json::from_str("60000").unwrap();
    assert_eq!(fixed, Interval::Fixed(60_000));
    let calendar: Interval = serde_json::from_str("\"MONTH\"").unwrap();
    assert_eq!(calendar, Interval::Calendar(IntervalUnit::Month));
    assert_eq!(serde_json::to_string(&Interval::Calendar(IntervalUnit::WeekIso)).unwrap(), "\"WEEK_ISO\"");
}

#[test]
fn test_interval_number_values() {
    assert_eq!(IntervalMath::number_value(&Interval::Calendar(IntervalUnit::Week)), WEEK);
    assert_eq!(IntervalMath::number_value(&Interval::Calendar(IntervalUnit::WeekIso)), WEEK);
    assert_eq!(IntervalMath::number_value(&Interval::Calendar(IntervalUnit::Month)), AVG_MONTH);
    assert_eq!(IntervalMath::number_value(&Interval::Calendar(IntervalUnit::Quarter)), AVG_QUARTER);
    assert_eq!(AVG_MONTH, 2_629_746_000);
    assert_eq!(AVG_QUARTER, 7_889_238_000);
}

#[test]
fn test_interval_math_extremes_keep_original_value() {
    let values = [
        Interval::Fixed(WEEK),
        Interval::Calendar(IntervalUnit::WeekIso),
        Interval::Calendar(IntervalUnit::Month),
        Interval::Fixed(1_000),
    ];
    assert_eq!(IntervalMath::max(&values), Some(Interval::Calendar(IntervalUnit::Month)));
    assert_eq!(IntervalMath::min(&values), Some(Interval::Fixed(1_000)));
    // equal numeric values resolve to the first occurrence
    assert_eq!(IntervalMath::max(&values[..2]), Some(Interval::Fixed(WEEK)));
    assert_eq!(IntervalMath::min(&[]), None);
}

#[test]
fn test_enum_names() {
    assert_eq!(AggregationType::default(), AggregationType::Avg);
    assert_eq!(AggregationType::Count.to_string(), "COUNT");
    assert_eq!(AggregationType::from_str("NONE").unwrap(), AggregationType::None);
    assert_eq!(QuickTimeInterval::CurrentQuarterSoFar.to_string(), "CURRENT_QUARTER_SO_FAR");
    assert_eq!(ComparisonUnit::from_str("year").unwrap(), ComparisonUnit::Year);
}

#[test]
fn test_log_level_display_and_parse() {
    assert_eq!(LogLevel::Debug.to_string(), "debug");
    assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
    assert!("bogus".parse::<LogLevel>().is_err());
}

#[test]
fn test_config_error_invalid_value_helper() {
    let err = ConfigError::invalid_value("f", 42, "nope");
    match err {
        ConfigError::InvalidValue { field, value, reason } => {
            assert_eq!(field, "f");
            assert_eq!(value, "42");
            assert_eq!(reason, "nope");
        }
        _ => panic!("wrong variant"),
    }
}

#[test]
fn test_twerror_helper_constructors() {
    let e = TwError::invalid_input("bad");
    assert!(matches!(e, TwError::InvalidInput(ref s) if s == "bad"));

    let e = TwError::unknown_timezone("Mars/Base");
    assert!(matches!(e, TwError::UnknownTimezone(ref s) if s == "Mars/Base"));

    let e = TwError::not_comparable("realtime");
    assert_eq!(e.to_string(), "Window is not comparable: realtime");

    let e = TwError::InvalidWindow { start_ms: 5, end_ms: 1 };
    assert_eq!(e.to_string(), "Invalid window: start 5 is after end 1");

    let e: TwError = u32::try_from(-1i64).unwrap_err().into();
    assert!(matches!(e, TwError::OutOfRange(_)));
}
