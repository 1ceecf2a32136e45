//! Record recognizers for free-text message bodies.
//!
//! Two ordered, mutually exclusive patterns: a sleep interval
//! (`HH:MM-HH:MM … сон`) and a feeding event (`HH:MM … смесь … N`). A
//! message yields at most one record, and the sleep pattern wins when both
//! would match.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use tracing::warn;

use crate::archive::{Archive, RawMessage};
use crate::error::Result;
use crate::records::{Dataset, FeedRecord, SleepRecord};

/// Sleep pattern: two clock times joined by a dash or en-dash, with the
/// sleep token appearing anywhere later in the text (case-insensitive).
const SLEEP_PATTERN: &str = r"(?i)(\d{1,2}:\d{2})[-–](\d{1,2}:\d{2}).*сон";

/// Feed pattern: a clock time, the formula token, then a volume in ml.
const FEED_PATTERN: &str = r"(\d{1,2}:\d{2})\D+смесь[^\d]*(\d+)";

/// Sleep messages logged before this hour describe the previous night:
/// when an interval crosses midnight, both instants shift back one day so
/// the record anchors to the day the sleep started. Fixed at 04:00 to
/// match the logging habit of the archives this system consumes; a message
/// logged between 00:00 and 04:00 about a genuinely same-day interval will
/// drift one day back.
const NIGHT_CUTOFF_HOUR: u32 = 4;

/// A recognizer verdict for one message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognized {
    Sleep(SleepRecord),
    Feed(FeedRecord),
}

/// Compiled recognizers for sleep and feed messages.
pub struct Extractor {
    sleep: Regex,
    feed: Regex,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            sleep: Regex::new(SLEEP_PATTERN).expect("sleep pattern compiles"),
            feed: Regex::new(FEED_PATTERN).expect("feed pattern compiles"),
        }
    }

    /// Classify one message body against the ordered patterns.
    ///
    /// The sleep pattern is tried first and short-circuits — a body that
    /// matches it is never also tested against the feed pattern, even when
    /// its clock times turn out to be malformed (the message is dropped).
    /// Only the first match per pattern is taken.
    pub fn recognize(&self, body: &str, logged_at: NaiveDateTime) -> Option<Recognized> {
        if let Some(caps) = self.sleep.captures(body) {
            return self.sleep_record(&caps, logged_at).map(Recognized::Sleep);
        }
        if let Some(caps) = self.feed.captures(body) {
            return self.feed_record(&caps, logged_at).map(Recognized::Feed);
        }
        None
    }

    /// Run the recognizers over a batch of decoded messages.
    ///
    /// Non-`message` entries are ignored; a recognizer miss is not an
    /// error, the body simply contributes no record.
    pub fn extract(&self, messages: &[RawMessage]) -> (Vec<SleepRecord>, Vec<FeedRecord>) {
        let mut sleep = Vec::new();
        let mut feeds = Vec::new();
        for msg in messages {
            if !msg.is_message() {
                continue;
            }
            match self.recognize(&msg.body, msg.timestamp) {
                Some(Recognized::Sleep(rec)) => sleep.push(rec),
                Some(Recognized::Feed(rec)) => feeds.push(rec),
                None => {}
            }
        }
        (sleep, feeds)
    }

    fn sleep_record(
        &self,
        caps: &regex::Captures<'_>,
        logged_at: NaiveDateTime,
    ) -> Option<SleepRecord> {
        let (Some(start_time), Some(end_time)) = (parse_clock(&caps[1]), parse_clock(&caps[2]))
        else {
            warn!("Unparseable clock time in sleep message, skipping");
            return None;
        };

        let day = logged_at.date();
        let mut start = day.and_time(start_time);
        let mut end = day.and_time(end_time);

        // Interval crosses midnight (or is degenerate): the end belongs to
        // the next day. A report typed just after midnight is about the
        // previous night, so both instants move back one day.
        if end_time <= start_time {
            end += Duration::days(1);
            if logged_at.time().hour() < NIGHT_CUTOFF_HOUR {
                start -= Duration::days(1);
                end -= Duration::days(1);
            }
        }

        Some(SleepRecord::new(start, end))
    }

    fn feed_record(
        &self,
        caps: &regex::Captures<'_>,
        logged_at: NaiveDateTime,
    ) -> Option<FeedRecord> {
        let Some(time) = parse_clock(&caps[1]) else {
            warn!("Unparseable clock time in feed message, skipping");
            return None;
        };
        let volume_ml: u32 = caps[2].parse().ok()?;
        Some(FeedRecord::new(logged_at.date().and_time(time), volume_ml))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_clock(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

/// Parse a JSON chat export and extract a fresh dataset in one step.
pub fn ingest_json(raw: &str) -> Result<Dataset> {
    let archive = Archive::from_json(raw)?;
    let extractor = Extractor::new();
    let (sleep, feeds) = extractor.extract(&archive.messages);
    Ok(Dataset::new(sleep, feeds))
}
