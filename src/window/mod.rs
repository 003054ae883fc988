// src/window/mod.rs

//! Window resolution: from a widget time window to query-ready bounds,
//! aggregation buckets and comparison windows.

pub mod assembler;
pub mod bucket;
pub mod comparison;
pub mod limits;
pub mod model;

pub use assembler::create_subscription_timewindow;
pub use bucket::{bucket_for, count_buckets, tile, Bucket};
pub use comparison::{comparison_window, ComparisonSpec, ComparisonUnit};
pub use limits::{DatapointsLimitPolicy, DefaultLimitPolicy};
pub use model::{
    AggregationConfig, AggregationSpec, AggregationType, FixedWindow, HistoryConfig, HistoryWindow, RealtimeConfig,
    RealtimeWindow, ResolvedWindow, Timewindow, TimewindowTab,
};
