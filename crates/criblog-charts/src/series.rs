//! Drawable per-day series for the rendering backend.
//!
//! Each day is normalized to its own 0..24 hour axis; the backend receives
//! plain numbers and intensity buckets and owns all visual decisions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use criblog_core::records::{FeedRecord, SleepRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::intensity::Intensity;

/// Minimum feed-volume axis ceiling (ml); keeps low-activity days from
/// auto-scaling into noise.
const MIN_FEED_AXIS_ML: u32 = 120;

/// Minimum sleep-hours axis ceiling.
const MIN_SLEEP_AXIS_HOURS: f64 = 15.0;

/// One sleep interval as hour offsets from its day's midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepSpan {
    pub start_hour: f64,
    /// Exceeds 24.0 for intervals that run past midnight; the backend's
    /// fixed 0..24 axis clips them.
    pub end_hour: f64,
}

/// One feeding event as an hour offset plus its intensity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedPoint {
    pub hour: f64,
    pub intensity: Intensity,
}

/// All drawable rows for the timeline chart, one per day, ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSeries {
    pub days: Vec<DayTimeline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTimeline {
    pub day: NaiveDate,
    pub sleeps: Vec<SleepSpan>,
    pub feeds: Vec<FeedPoint>,
}

impl DayTimeline {
    fn new(day: NaiveDate) -> Self {
        Self {
            day,
            sleeps: Vec::new(),
            feeds: Vec::new(),
        }
    }
}

/// Two aligned per-day series over a shared day axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySeries {
    pub days: Vec<NaiveDate>,
    /// Total feed volume per day; `None` for days with no feed records.
    pub feed_ml: Vec<Option<u32>>,
    /// Total sleep per day in hours; `None` for days with no sleep records.
    pub sleep_hours: Vec<Option<f64>>,
    /// Feed axis ceiling: `max(observed, 120)`. Floor is 0.
    pub feed_axis_max: f64,
    /// Sleep axis ceiling: `max(observed, 15)`. Floor is 0.
    pub sleep_axis_max: f64,
}

/// Build the timeline series: the sorted union of days present in either
/// record set, each with its sleep spans and feed points as offsets from
/// that day's own midnight. `None` when there is nothing to draw.
pub fn prepare_timeline(sleep: &[SleepRecord], feeds: &[FeedRecord]) -> Option<TimelineSeries> {
    if sleep.is_empty() && feeds.is_empty() {
        return None;
    }

    let mut by_day: BTreeMap<NaiveDate, DayTimeline> = BTreeMap::new();

    for rec in sleep {
        let midnight = rec.day.and_time(NaiveTime::MIN);
        by_day
            .entry(rec.day)
            .or_insert_with(|| DayTimeline::new(rec.day))
            .sleeps
            .push(SleepSpan {
                start_hour: hours_since(midnight, rec.start),
                end_hour: hours_since(midnight, rec.end),
            });
    }

    for feed in feeds {
        let midnight = feed.day.and_time(NaiveTime::MIN);
        by_day
            .entry(feed.day)
            .or_insert_with(|| DayTimeline::new(feed.day))
            .feeds
            .push(FeedPoint {
                hour: hours_since(midnight, feed.instant),
                intensity: Intensity::for_volume(feed.volume_ml),
            });
    }

    let series = TimelineSeries {
        days: by_day.into_values().collect(),
    };
    tracing::debug!(days = series.days.len(), "Prepared timeline series");
    Some(series)
}

/// Build the summary series: per-day feed and sleep totals as two aligned
/// sequences over the shared sorted day axis. A day with only one kind of
/// data appears once, with the other series absent at that point.
pub fn prepare_summary(sleep: &[SleepRecord], feeds: &[FeedRecord]) -> Option<SummarySeries> {
    if sleep.is_empty() && feeds.is_empty() {
        return None;
    }

    let mut feed_by_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for feed in feeds {
        *feed_by_day.entry(feed.day).or_insert(0) += feed.volume_ml;
    }

    // Minutes internally, hours on the way out.
    let mut sleep_minutes_by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for rec in sleep {
        *sleep_minutes_by_day.entry(rec.day).or_insert(0) += (rec.end - rec.start).num_minutes();
    }

    let days: Vec<NaiveDate> = feed_by_day
        .keys()
        .chain(sleep_minutes_by_day.keys())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let feed_ml: Vec<Option<u32>> = days.iter().map(|d| feed_by_day.get(d).copied()).collect();
    let sleep_hours: Vec<Option<f64>> = days
        .iter()
        .map(|d| sleep_minutes_by_day.get(d).map(|m| *m as f64 / 60.0))
        .collect();

    let observed_feed = feed_ml.iter().flatten().copied().max().unwrap_or(0);
    let feed_axis_max = f64::from(observed_feed.max(MIN_FEED_AXIS_ML));
    let sleep_axis_max = sleep_hours
        .iter()
        .flatten()
        .fold(MIN_SLEEP_AXIS_HOURS, |acc, h| acc.max(*h));

    tracing::debug!(days = days.len(), "Prepared summary series");
    Some(SummarySeries {
        days,
        feed_ml,
        sleep_hours,
        feed_axis_max,
        sleep_axis_max,
    })
}

fn hours_since(midnight: NaiveDateTime, instant: NaiveDateTime) -> f64 {
    (instant - midnight).num_seconds() as f64 / 3600.0
}
