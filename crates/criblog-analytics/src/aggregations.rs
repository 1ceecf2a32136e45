//! Per-day aggregation of sleep and feed records.
//!
//! Walks an inclusive date range day by day and sums the records anchored
//! to each day, zero-filling days without data.

use chrono::{Duration, NaiveDate};
use criblog_core::error::{Error, Result};
use criblog_core::records::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Derived totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub day: NaiveDate,
    /// Total formula volume over the day, in milliliters.
    pub total_feed_ml: u32,
    /// Summed duration of sleep intervals anchored to this day, in hours.
    /// An interval spanning midnight contributes its full duration here.
    pub sleep_hours: f64,
    /// `24 − sleep_hours`. Can go negative when overlapping intervals
    /// exceed a day; kept as-is for display.
    pub awake_hours: f64,
}

/// Aggregate the dataset over `[start, end]` inclusive.
///
/// Produces one entry per calendar day in ascending order, zero-filled for
/// days without records. Fails with `NoDataset` only when the dataset
/// holds no records at all; a quiet window over a non-empty dataset still
/// yields the zero-filled range.
pub fn aggregate(dataset: &Dataset, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyStats>> {
    if dataset.is_empty() {
        return Err(Error::NoDataset);
    }

    let mut feed_by_day: HashMap<NaiveDate, u32> = HashMap::new();
    for feed in &dataset.feeds {
        *feed_by_day.entry(feed.day).or_insert(0) += feed.volume_ml;
    }

    // Minutes internally, converted once per day.
    let mut sleep_minutes_by_day: HashMap<NaiveDate, i64> = HashMap::new();
    for rec in &dataset.sleep {
        *sleep_minutes_by_day.entry(rec.day).or_insert(0) += (rec.end - rec.start).num_minutes();
    }

    tracing::debug!(
        %start,
        %end,
        sleep = dataset.sleep.len(),
        feeds = dataset.feeds.len(),
        "Aggregating dataset"
    );

    let mut stats = Vec::new();
    let mut day = start;
    while day <= end {
        let total_feed_ml = feed_by_day.get(&day).copied().unwrap_or(0);
        let sleep_hours = sleep_minutes_by_day.get(&day).copied().unwrap_or(0) as f64 / 60.0;
        stats.push(DailyStats {
            day,
            total_feed_ml,
            sleep_hours,
            awake_hours: 24.0 - sleep_hours,
        });
        day += Duration::days(1);
    }

    Ok(stats)
}
