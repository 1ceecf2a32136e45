//! Plain-text daily reports.
//!
//! One block per day: date label, feed volume, sleep hours, awake hours,
//! with a blank line between days.

use chrono::NaiveDate;
use criblog_core::error::Result;
use criblog_core::records::Dataset;

use crate::aggregations::{aggregate, DailyStats};

/// Report generator for the text transport surfaces.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render the daily report for `[start, end]` inclusive.
    ///
    /// `NoDataset` propagates so transports can word it differently from a
    /// range that merely holds zero records.
    pub fn daily_report(dataset: &Dataset, start: NaiveDate, end: NaiveDate) -> Result<String> {
        let stats = aggregate(dataset, start, end)?;
        Ok(Self::render(&stats))
    }

    fn render(stats: &[DailyStats]) -> String {
        let mut out = String::new();
        for (i, day) in stats.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("{}\n", day.day.format("%B %d, %Y")));
            out.push_str(&format!("  Feed: {} ml\n", day.total_feed_ml));
            out.push_str(&format!("  Sleep: {:.1} h\n", day.sleep_hours));
            out.push_str(&format!("  Awake: {:.1} h\n", day.awake_hours));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use criblog_core::error::Error;
    use criblog_core::records::{FeedRecord, SleepRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_report_block_format() {
        let dataset = Dataset::new(
            vec![SleepRecord::new(
                at(2024, 1, 10, 13, 0),
                at(2024, 1, 10, 15, 30),
            )],
            vec![FeedRecord::new(at(2024, 1, 10, 9, 0), 110)],
        );
        let report =
            ReportGenerator::daily_report(&dataset, date(2024, 1, 10), date(2024, 1, 10)).unwrap();
        assert!(report.contains("January 10, 2024"));
        assert!(report.contains("Feed: 110 ml"));
        assert!(report.contains("Sleep: 2.5 h"));
        assert!(report.contains("Awake: 21.5 h"));
    }

    #[test]
    fn test_days_separated_by_blank_line() {
        let dataset = Dataset::new(
            vec![],
            vec![
                FeedRecord::new(at(2024, 1, 10, 9, 0), 60),
                FeedRecord::new(at(2024, 1, 11, 9, 0), 90),
            ],
        );
        let report =
            ReportGenerator::daily_report(&dataset, date(2024, 1, 10), date(2024, 1, 11)).unwrap();
        let blocks: Vec<&str> = report.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("Feed: 60 ml"));
        assert!(blocks[1].contains("Feed: 90 ml"));
    }

    #[test]
    fn test_quiet_days_render_zeros() {
        let dataset = Dataset::new(
            vec![],
            vec![FeedRecord::new(at(2024, 1, 10, 9, 0), 60)],
        );
        let report =
            ReportGenerator::daily_report(&dataset, date(2024, 1, 11), date(2024, 1, 12)).unwrap();
        assert!(report.contains("Feed: 0 ml"));
        assert!(report.contains("Sleep: 0.0 h"));
        assert!(report.contains("Awake: 24.0 h"));
    }

    #[test]
    fn test_empty_dataset_propagates_no_dataset() {
        let dataset = Dataset::new(vec![], vec![]);
        let err =
            ReportGenerator::daily_report(&dataset, date(2024, 1, 10), date(2024, 1, 10))
                .unwrap_err();
        assert!(matches!(err, Error::NoDataset));
    }
}
