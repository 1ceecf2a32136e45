//! Rendering-backend seam.

use criblog_core::error::Result;

use crate::series::{SummarySeries, TimelineSeries};

/// Capability interface for the chart-rendering backend.
///
/// The backend takes prepared series and returns an encoded image buffer;
/// criblog never depends on a concrete implementation, so any renderer
/// (or a test fake) can be substituted.
pub trait ChartRenderer: Send + Sync {
    fn render_timeline(&self, series: &TimelineSeries) -> Result<Vec<u8>>;
    fn render_summary(&self, series: &SummarySeries) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{prepare_summary, prepare_timeline};
    use chrono::NaiveDate;
    use criblog_core::records::FeedRecord;

    /// Fake backend that echoes the series as JSON bytes.
    struct JsonFake;

    impl ChartRenderer for JsonFake {
        fn render_timeline(&self, series: &TimelineSeries) -> Result<Vec<u8>> {
            Ok(serde_json::to_vec(series)?)
        }

        fn render_summary(&self, series: &SummarySeries) -> Result<Vec<u8>> {
            Ok(serde_json::to_vec(series)?)
        }
    }

    #[test]
    fn test_backend_is_substitutable() {
        let instant = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let feeds = vec![FeedRecord::new(instant, 90)];

        let renderer: Box<dyn ChartRenderer> = Box::new(JsonFake);
        let timeline = prepare_timeline(&[], &feeds).unwrap();
        let summary = prepare_summary(&[], &feeds).unwrap();

        let bytes = renderer.render_timeline(&timeline).unwrap();
        assert!(!bytes.is_empty());
        let bytes = renderer.render_summary(&summary).unwrap();
        assert!(!bytes.is_empty());
    }
}
