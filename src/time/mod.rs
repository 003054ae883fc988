// src/time/mod.rs

// Time-related building blocks: intervals, calendar arithmetic, clock and quick ranges
pub mod calendar;
pub mod clock;
pub mod interval;
pub mod quick;

pub use calendar::CalendarUnit;
pub use clock::{Clock, ClockProvider, FixedClock, SystemClock, TimezoneInfo};
pub use interval::{Interval, IntervalMath, IntervalUnit};
pub use quick::QuickTimeInterval;
