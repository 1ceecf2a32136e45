use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observed sleep interval.
///
/// `day` is the calendar day the interval is grouped under — the start's
/// date after overnight correction, which can differ from the date of the
/// message that reported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub day: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SleepRecord {
    /// Anchor the record to the start's calendar day. Invariant: `end > start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            day: start.date(),
            start,
            end,
        }
    }

    /// Interval length in fractional hours.
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }
}

/// One observed feeding event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub day: NaiveDate,
    pub instant: NaiveDateTime,
    /// Formula volume in milliliters.
    pub volume_ml: u32,
}

impl FeedRecord {
    pub fn new(instant: NaiveDateTime, volume_ml: u32) -> Self {
        Self {
            day: instant.date(),
            instant,
            volume_ml,
        }
    }
}

/// The full set of records produced by one ingestion.
///
/// A later successful ingestion replaces the dataset wholesale — no merge,
/// no history. Transports hold it as an explicitly passed handle
/// (`Option<Dataset>` in the console, `Arc<RwLock<Option<Dataset>>>` in the
/// server) so the single-writer/any-reader contract stays visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub ingested_at: DateTime<Utc>,
    pub sleep: Vec<SleepRecord>,
    pub feeds: Vec<FeedRecord>,
}

impl Dataset {
    pub fn new(sleep: Vec<SleepRecord>, feeds: Vec<FeedRecord>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ingested_at: Utc::now(),
            sleep,
            feeds,
        }
    }

    /// True when the ingestion recognized nothing at all.
    pub fn is_empty(&self) -> bool {
        self.sleep.is_empty() && self.feeds.is_empty()
    }

    /// Earliest and latest anchor days across both record kinds.
    pub fn day_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let days = self
            .sleep
            .iter()
            .map(|r| r.day)
            .chain(self.feeds.iter().map(|r| r.day));
        days.fold(None, |acc, day| match acc {
            None => Some((day, day)),
            Some((lo, hi)) => Some((lo.min(day), hi.max(day))),
        })
    }

    /// Records whose anchor day falls inside `[start, end]` inclusive.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> (Vec<SleepRecord>, Vec<FeedRecord>) {
        let sleep = self
            .sleep
            .iter()
            .filter(|r| (start..=end).contains(&r.day))
            .cloned()
            .collect();
        let feeds = self
            .feeds
            .iter()
            .filter(|r| (start..=end).contains(&r.day))
            .cloned()
            .collect();
        (sleep, feeds)
    }
}
