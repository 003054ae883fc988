//! Value types flowing in and out of window resolution.
//!
//! [`Timewindow`] is the user-facing description persisted with a widget;
//! [`ResolvedWindow`] is the query-ready result handed to the transport layer.
//! Both serialize in camelCase to match the dashboard JSON.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{Result, TwError};
use crate::time::interval::{Interval, DAY, MINUTE};
use crate::time::quick::QuickTimeInterval;

/// Aggregation function applied per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    /// Minimum value per bucket
    Min,
    /// Maximum value per bucket
    Max,
    /// Average value per bucket
    Avg,
    /// Sum of values per bucket
    Sum,
    /// Number of values per bucket
    Count,
    /// Raw values, no bucketing
    None,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Avg
    }
}

/// Which tab of the time window editor is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimewindowTab {
    /// Rolling window that follows the clock
    Realtime,
    /// Window with fixed bounds
    History,
}

impl Default for TimewindowTab {
    fn default() -> Self {
        TimewindowTab::Realtime
    }
}

/// An explicit `[start, end]` range in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedWindow {
    /// Inclusive start
    pub start_time_ms: i64,
    /// End of the range
    pub end_time_ms: i64,
}

impl FixedWindow {
    /// Creates a window, rejecting `end < start`.
    pub fn new(start_time_ms: i64, end_time_ms: i64) -> Result<Self> {
        let window = Self { start_time_ms, end_time_ms };
        window.validate()?;
        Ok(window)
    }

    /// Checks the `start <= end` invariant.
    pub fn validate(&self) -> Result<()> {
        if self.end_time_ms < self.start_time_ms {
            return Err(TwError::InvalidWindow { start_ms: self.start_time_ms, end_ms: self.end_time_ms });
        }
        Ok(())
    }

    /// Width of the window in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `TwError::OutOfRange` when the width does not fit in an `i64`.
    pub fn width_ms(&self) -> Result<i64> {
        self.end_time_ms.checked_sub(self.start_time_ms).ok_or_else(|| {
            TwError::out_of_range(format!("width of [{}, {}]", self.start_time_ms, self.end_time_ms))
        })
    }

    /// Same window moved by `delta_ms`.
    ///
    /// # Errors
    ///
    /// Returns `TwError::OutOfRange` when either bound leaves the `i64` range.
    pub fn shifted(&self, delta_ms: i64) -> Result<Self> {
        let moved = |ts: i64| {
            ts.checked_add(delta_ms)
                .ok_or_else(|| TwError::out_of_range(format!("{ts} shifted by {delta_ms} ms")))
        };
        Ok(Self { start_time_ms: moved(self.start_time_ms)?, end_time_ms: moved(self.end_time_ms)? })
    }
}

/// Sub-mode of the realtime tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "realtimeType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RealtimeWindow {
    /// Rolling "last N ms"
    LastInterval {
        /// Window length in milliseconds
        #[serde(rename = "timewindowMs")]
        timewindow_ms: u64,
    },
    /// Named calendar range
    Interval {
        /// The calendar range
        #[serde(rename = "quickInterval")]
        quick_interval: QuickTimeInterval,
    },
}

/// Realtime tab configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Selected sub-mode
    #[serde(flatten)]
    pub window: RealtimeWindow,
    /// Explicit aggregation interval, if the widget pins one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<Interval>,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self { window: RealtimeWindow::LastInterval { timewindow_ms: MINUTE }, interval: None }
    }
}

/// Sub-mode of the history tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "historyType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryWindow {
    /// "Last N ms" frozen at resolution time
    LastInterval {
        /// Window length in milliseconds
        #[serde(rename = "timewindowMs")]
        timewindow_ms: u64,
    },
    /// Explicit bounds, stored relative to the selected zone
    Fixed {
        /// Stored bounds
        #[serde(rename = "fixedTimewindow")]
        fixed_timewindow: FixedWindow,
    },
    /// Named calendar range
    Interval {
        /// The calendar range
        #[serde(rename = "quickInterval")]
        quick_interval: QuickTimeInterval,
    },
    /// Everything up to now
    ForAllTime,
}

/// History tab configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Selected sub-mode
    #[serde(flatten)]
    pub window: HistoryWindow,
    /// Explicit aggregation interval, if the widget pins one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<Interval>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { window: HistoryWindow::LastInterval { timewindow_ms: DAY }, interval: None }
    }
}

/// Aggregation preferences of a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Aggregation function; AVG when unset
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub agg_type: Option<AggregationType>,
    /// Datapoint cap; the policy maximum when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// User-facing time window description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timewindow {
    /// Active tab
    #[serde(default)]
    pub selected_tab: TimewindowTab,
    /// Realtime tab settings
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// History tab settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// Aggregation preferences
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Selected IANA zone; the caller's local zone when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Timewindow {
    /// Rolling realtime window of the last `timewindow_ms`.
    pub fn realtime_last(timewindow_ms: u64) -> Self {
        Self {
            selected_tab: TimewindowTab::Realtime,
            realtime: RealtimeConfig { window: RealtimeWindow::LastInterval { timewindow_ms }, interval: None },
            ..Self::default()
        }
    }

    /// Realtime window following a calendar range.
    pub fn realtime_quick(quick_interval: QuickTimeInterval) -> Self {
        Self {
            selected_tab: TimewindowTab::Realtime,
            realtime: RealtimeConfig { window: RealtimeWindow::Interval { quick_interval }, interval: None },
            ..Self::default()
        }
    }

    /// History window of the last `timewindow_ms`.
    pub fn history_last(timewindow_ms: u64) -> Self {
        Self::history(HistoryWindow::LastInterval { timewindow_ms })
    }

    /// History window over a calendar range.
    pub fn history_quick(quick_interval: QuickTimeInterval) -> Self {
        Self::history(HistoryWindow::Interval { quick_interval })
    }

    /// History window with explicit bounds.
    pub fn history_fixed(start_time_ms: i64, end_time_ms: i64) -> Self {
        Self::history(HistoryWindow::Fixed { fixed_timewindow: FixedWindow { start_time_ms, end_time_ms } })
    }

    /// History window over all retained data.
    pub fn for_all_time() -> Self {
        Self::history(HistoryWindow::ForAllTime)
    }

    fn history(window: HistoryWindow) -> Self {
        Self {
            selected_tab: TimewindowTab::History,
            history: HistoryConfig { window, interval: None },
            ..Self::default()
        }
    }

    /// Sets the selected zone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Pins the aggregation interval of the active tab.
    pub fn with_interval(mut self, interval: impl Into<Interval>) -> Self {
        let interval = Some(interval.into());
        match self.selected_tab {
            TimewindowTab::Realtime => self.realtime.interval = interval,
            TimewindowTab::History => self.history.interval = interval,
        }
        self
    }

    /// Sets aggregation type and optional cap.
    pub fn with_aggregation(mut self, agg_type: AggregationType, limit: Option<u32>) -> Self {
        self.aggregation = AggregationConfig { agg_type: Some(agg_type), limit };
        self
    }

    /// Explicit interval of the active tab.
    pub fn selected_interval(&self) -> Option<Interval> {
        match self.selected_tab {
            TimewindowTab::Realtime => self.realtime.interval,
            TimewindowTab::History => self.history.interval,
        }
    }

    /// Parses a persisted JSON time window.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Resolved aggregation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSpec {
    /// Aggregation function
    #[serde(rename = "type")]
    pub agg_type: AggregationType,
    /// Bucket interval
    pub interval: Interval,
    /// Bucket count, or the raw datapoint cap when not aggregating
    pub limit: u32,
    /// Window length the interval and limit were computed for
    pub time_window_ms: u64,
    /// Raw state transitions were requested
    #[serde(default)]
    pub state_data: bool,
}

/// A query-ready window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWindow {
    /// First timestamp covered
    pub start_ts: i64,
    /// Absolute bounds of a history window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_window: Option<FixedWindow>,
    /// Rolling length of a realtime window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_window_ms: Option<u64>,
    /// Calendar range the window came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_interval: Option<QuickTimeInterval>,
    /// Selected zone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Offset between the selected zone and the caller's zone
    pub ts_offset_ms: i64,
    /// Aggregation parameters
    pub aggregation: AggregationSpec,
}

impl ResolvedWindow {
    /// Whether the window follows the clock.
    pub fn is_realtime(&self) -> bool {
        self.realtime_window_ms.is_some()
    }

    /// Whether the window has fixed bounds.
    pub fn is_history(&self) -> bool {
        self.fixed_window.is_some()
    }

    /// Length of the window the aggregation was computed for.
    pub fn window_ms(&self) -> u64 {
        self.aggregation.time_window_ms
    }
}
