//! Date-range arguments for the report and chart commands.
//!
//! A query takes no dates (whole dataset), one date (single day) or two
//! dates (inclusive range). `today` and `yesterday` shorthands are
//! accepted wherever a date is. Malformed tokens resolve to a
//! `BadDateArg` error rather than surfacing a raw parse failure.

use chrono::{Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::records::Dataset;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse command arguments into an optional inclusive day range.
///
/// `today` anchors the relative shorthands; it is injected so callers and
/// tests control the clock.
pub fn parse_range(args: &[&str], today: NaiveDate) -> Result<Option<(NaiveDate, NaiveDate)>> {
    match args {
        [] => Ok(None),
        [one] => {
            let day = parse_day(one, today)?;
            Ok(Some((day, day)))
        }
        [from, to] => {
            let from = parse_day(from, today)?;
            let to = parse_day(to, today)?;
            if from > to {
                return Err(Error::BadDateArg(format!("{from} is after {to}")));
            }
            Ok(Some((from, to)))
        }
        _ => Err(Error::BadDateArg("expected at most two dates".into())),
    }
}

/// Resolve a parsed range against the dataset, defaulting to its full
/// span. Fails with `NoDataset` when there is nothing to span.
pub fn resolve_range(
    dataset: &Dataset,
    parsed: Option<(NaiveDate, NaiveDate)>,
) -> Result<(NaiveDate, NaiveDate)> {
    match parsed {
        Some(range) => Ok(range),
        None => dataset.day_bounds().ok_or(Error::NoDataset),
    }
}

fn parse_day(token: &str, today: NaiveDate) -> Result<NaiveDate> {
    match token.to_lowercase().as_str() {
        "today" | "сегодня" => Ok(today),
        "yesterday" | "вчера" => Ok(today - Duration::days(1)),
        _ => NaiveDate::parse_from_str(token, DATE_FORMAT)
            .map_err(|_| Error::BadDateArg(token.to_string())),
    }
}
