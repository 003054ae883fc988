use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use strum::IntoEnumIterator;
use timewindow_resolver::time::clock::ClockProvider;
use timewindow_resolver::time::interval::{DAY, HOUR};
use timewindow_resolver::QuickTimeInterval;

const ZONES: [&str; 5] = ["UTC", "Europe/Berlin", "America/New_York", "Asia/Kolkata", "Pacific/Auckland"];

fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp_millis()
}

#[test]
fn test_every_tag_resolves_start_before_end() {
    let instants = [
        Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 11, 3, 6, 15, 0).unwrap(),
        Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap(),
    ];
    for instant in instants {
        let clock = ClockProvider::fixed(instant, Tz::UTC);
        for zone in ZONES {
            let tz: Tz = zone.parse().unwrap();
            for tag in QuickTimeInterval::iter() {
                let (start, end) = tag.start_end(&tz, &clock).unwrap();
                assert!(start <= end, "{} in {} at {}: {} > {}", tag, zone, instant, start, end);
            }
        }
    }
}

#[test]
fn test_so_far_tags_end_now() {
    let instant = Utc.with_ymd_and_hms(2024, 5, 17, 8, 42, 13).unwrap();
    let clock = ClockProvider::fixed(instant, Tz::UTC);
    for zone in ZONES {
        let tz: Tz = zone.parse().unwrap();
        for tag in QuickTimeInterval::iter().filter(|tag| tag.is_so_far().unwrap()) {
            let (_, end) = tag.start_end(&tz, &clock).unwrap();
            assert_eq!(end, instant.timestamp_millis(), "{} in {}", tag, zone);
        }
    }
}

#[test]
fn test_current_month_so_far() {
    let clock = ClockProvider::fixed(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(), Tz::UTC);
    let bounds = QuickTimeInterval::CurrentMonthSoFar.start_end(&Tz::UTC, &clock).unwrap();
    assert_eq!(bounds, (ms(2024, 3, 1, 0), ms(2024, 3, 15, 10)));
}

#[test]
fn test_previous_half_year() {
    let clock = ClockProvider::fixed(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), Tz::UTC);
    let bounds = QuickTimeInterval::PreviousHalfYear.start_end(&Tz::UTC, &clock).unwrap();
    assert_eq!(bounds, (ms(2023, 7, 1, 0), ms(2024, 1, 1, 0)));
}

#[test]
fn test_previous_week_variants() {
    // Wednesday 2024-03-13
    let clock = ClockProvider::fixed(Utc.with_ymd_and_hms(2024, 3, 13, 9, 0, 0).unwrap(), Tz::UTC);
    let sunday = QuickTimeInterval::PreviousWeek.start_end(&Tz::UTC, &clock).unwrap();
    assert_eq!(sunday, (ms(2024, 3, 3, 0), ms(2024, 3, 10, 0)));
    let iso = QuickTimeInterval::PreviousWeekIso.start_end(&Tz::UTC, &clock).unwrap();
    assert_eq!(iso, (ms(2024, 3, 4, 0), ms(2024, 3, 11, 0)));
}

#[test]
fn test_current_day_across_spring_forward_is_23_hours() {
    let berlin: Tz = "Europe/Berlin".parse().unwrap();
    let clock = ClockProvider::fixed(Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap(), Tz::UTC);
    let (start, end) = QuickTimeInterval::CurrentDay.start_end(&berlin, &clock).unwrap();
    // local midnight is still CET (+01:00)
    assert_eq!(start, ms(2024, 3, 30, 23));
    assert_eq!(end - start, (DAY - HOUR) as i64);
}

#[test]
fn test_previous_month_in_new_york() {
    let ny: Tz = "America/New_York".parse().unwrap();
    // 2024-03-01T03:00Z is still February 29th in New York
    let clock = ClockProvider::fixed(Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap(), Tz::UTC);
    let (start, end) = QuickTimeInterval::PreviousMonth.start_end(&ny, &clock).unwrap();
    assert_eq!(start, ms(2024, 1, 1, 5));
    assert_eq!(end, ms(2024, 2, 1, 5));
}
