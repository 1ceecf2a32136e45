//! Chart data preparation for criblog.
//!
//! Converts extracted records into the ordered per-day series a rendering
//! backend consumes; the backend itself stays behind the `ChartRenderer`
//! trait.

pub mod intensity;
pub mod render;
pub mod series;

pub use intensity::Intensity;
pub use render::ChartRenderer;
pub use series::{
    prepare_summary, prepare_timeline, DayTimeline, FeedPoint, SleepSpan, SummarySeries,
    TimelineSeries,
};
