//! Datapoint limit policy.
//!
//! The policy decides how many datapoints a query may return and which
//! aggregation interval a window gets when the widget does not pin one.

use crate::config::LimitsConfig;
use crate::time::interval::{Interval, IntervalMath, IntervalUnit, DAY, HOUR, MINUTE, SECOND};
use crate::window::model::AggregationType;

/// Source of datapoint limits and default aggregation intervals.
pub trait DatapointsLimitPolicy {
    /// Maximum number of datapoints a single query may return.
    fn max_datapoints_limit(&self) -> u32;

    /// Default aggregation interval for a window of `window_ms`.
    fn bound_interval_to_timewindow(&self, window_ms: u64, agg_type: AggregationType) -> Interval;
}

/// Intervals offered when snapping a default interval.
const PREDEFINED_INTERVALS: [Interval; 22] = [
    Interval::Fixed(SECOND),
    Interval::Fixed(5 * SECOND),
    Interval::Fixed(10 * SECOND),
    Interval::Fixed(15 * SECOND),
    Interval::Fixed(30 * SECOND),
    Interval::Fixed(MINUTE),
    Interval::Fixed(2 * MINUTE),
    Interval::Fixed(5 * MINUTE),
    Interval::Fixed(10 * MINUTE),
    Interval::Fixed(15 * MINUTE),
    Interval::Fixed(30 * MINUTE),
    Interval::Fixed(HOUR),
    Interval::Fixed(2 * HOUR),
    Interval::Fixed(5 * HOUR),
    Interval::Fixed(10 * HOUR),
    Interval::Fixed(12 * HOUR),
    Interval::Fixed(DAY),
    Interval::Fixed(2 * DAY),
    Interval::Fixed(3 * DAY),
    Interval::Calendar(IntervalUnit::Week),
    Interval::Calendar(IntervalUnit::Month),
    Interval::Calendar(IntervalUnit::Quarter),
];

/// Limit policy driven by [`LimitsConfig`].
///
/// The default interval aims at `target_datapoints` buckets, never produces more
/// than `max_datapoints` of them, and is never finer than `min_interval_ms`.
#[derive(Debug, Clone)]
pub struct DefaultLimitPolicy {
    max_datapoints: u32,
    target_datapoints: u32,
    min_interval_ms: u64,
}

impl DefaultLimitPolicy {
    /// Creates a policy from explicit limits.
    pub fn new(max_datapoints: u32, target_datapoints: u32, min_interval_ms: u64) -> Self {
        Self {
            max_datapoints: max_datapoints.max(1),
            target_datapoints: target_datapoints.max(1),
            min_interval_ms: min_interval_ms.max(1),
        }
    }

    /// Creates a policy from the `[limits]` config section.
    pub fn from_config(config: &LimitsConfig) -> Self {
        Self::new(config.max_datapoints, config.target_datapoints, config.min_interval_ms)
    }

    fn target_interval_ms(&self, window_ms: u64) -> u64 {
        let max = u64::from(self.max_datapoints);
        let floor = window_ms / max + u64::from(window_ms % max != 0);
        (window_ms / u64::from(self.target_datapoints)).max(floor).max(self.min_interval_ms)
    }
}

impl Default for DefaultLimitPolicy {
    fn default() -> Self {
        Self::from_config(&LimitsConfig::default())
    }
}

impl DatapointsLimitPolicy for DefaultLimitPolicy {
    fn max_datapoints_limit(&self) -> u32 {
        self.max_datapoints
    }

    fn bound_interval_to_timewindow(&self, window_ms: u64, agg_type: AggregationType) -> Interval {
        if agg_type == AggregationType::None {
            return Interval::Fixed(SECOND);
        }
        let target = self.target_interval_ms(window_ms);
        let candidates: Vec<Interval> = PREDEFINED_INTERVALS
            .iter()
            .copied()
            .filter(|interval| interval.to_approx_ms() >= target)
            .collect();
        match IntervalMath::min(&candidates) {
            Some(interval) => interval,
            None => {
                let rounded = (target + SECOND - 1) / SECOND * SECOND;
                log::debug!("No predefined interval covers {} ms, using {} ms", target, rounded);
                Interval::Fixed(rounded)
            }
        }
    }
}
