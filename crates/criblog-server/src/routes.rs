use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use criblog_analytics::{aggregate, DailyStats, ReportGenerator};
use criblog_charts::{prepare_summary, prepare_timeline, SummarySeries, TimelineSeries};
use criblog_core::command::{parse_range, resolve_range};
use criblog_core::error::Error;
use criblog_core::records::Dataset;
use criblog_core::{Archive, Extractor};

use crate::state::AppState;

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Archive ingestion ───────────────────────────────────────────────────

pub fn archive_routes() -> Router<AppState> {
    Router::new().route("/v1/archive", post(upload_archive))
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    dataset_id: String,
    sleep_records: usize,
    feed_records: usize,
    skipped_messages: usize,
    message: String,
}

async fn upload_archive(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let archive = Archive::from_json(&body).map_err(error_response)?;
    let extractor = Extractor::new();
    let (sleep, feeds) = extractor.extract(&archive.messages);
    let dataset = Dataset::new(sleep, feeds);

    let message = if dataset.is_empty() {
        "No sleep or feed records recognized in this archive.".to_string()
    } else {
        format!(
            "Loaded {} sleep and {} feed records.",
            dataset.sleep.len(),
            dataset.feeds.len()
        )
    };
    tracing::info!(
        sleep = dataset.sleep.len(),
        feeds = dataset.feeds.len(),
        skipped = archive.skipped,
        "Ingested archive"
    );

    let response = IngestResponse {
        dataset_id: dataset.id.clone(),
        sleep_records: dataset.sleep.len(),
        feed_records: dataset.feeds.len(),
        skipped_messages: archive.skipped,
        message,
    };

    // Replace wholesale. A malformed archive errors out above and never
    // touches the held dataset.
    *state.dataset.write().await = Some(dataset);

    Ok(Json(response))
}

// ── Stats and reports ───────────────────────────────────────────────────

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/stats", get(daily_stats))
        .route("/v1/report", get(daily_report))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    from: Option<String>,
    to: Option<String>,
}

impl RangeQuery {
    /// Translate query params into the command-style argument list:
    /// nothing (whole dataset), `from` (single day), `from`+`to` (range).
    fn parse(&self, today: NaiveDate) -> Result<Option<(NaiveDate, NaiveDate)>, Error> {
        let mut args: Vec<&str> = Vec::new();
        if let Some(from) = &self.from {
            args.push(from);
        }
        if let Some(to) = &self.to {
            if self.from.is_none() {
                return Err(Error::BadDateArg("`to` given without `from`".into()));
            }
            args.push(to);
        }
        parse_range(&args, today)
    }
}

fn range_of(dataset: &Dataset, query: &RangeQuery) -> Result<(NaiveDate, NaiveDate), Error> {
    let parsed = query.parse(Local::now().date_naive())?;
    resolve_range(dataset, parsed)
}

async fn daily_stats(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DailyStats>>, (StatusCode, String)> {
    let guard = state.dataset.read().await;
    let dataset = guard
        .as_ref()
        .ok_or_else(|| error_response(Error::NoDataset))?;
    let (start, end) = range_of(dataset, &query).map_err(error_response)?;
    let stats = aggregate(dataset, start, end).map_err(error_response)?;
    Ok(Json(stats))
}

async fn daily_report(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<String, (StatusCode, String)> {
    let guard = state.dataset.read().await;
    let dataset = guard
        .as_ref()
        .ok_or_else(|| error_response(Error::NoDataset))?;
    let (start, end) = range_of(dataset, &query).map_err(error_response)?;
    let report = ReportGenerator::daily_report(dataset, start, end).map_err(error_response)?;
    Ok(report)
}

// ── Chart series ────────────────────────────────────────────────────────

pub fn chart_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/charts/timeline", get(timeline_chart))
        .route("/v1/charts/summary", get(summary_chart))
}

async fn timeline_chart(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<TimelineSeries>, (StatusCode, String)> {
    let guard = state.dataset.read().await;
    let dataset = guard
        .as_ref()
        .ok_or_else(|| error_response(Error::NoDataset))?;
    let (start, end) = range_of(dataset, &query).map_err(error_response)?;
    let (sleep, feeds) = dataset.slice(start, end);
    let series = prepare_timeline(&sleep, &feeds)
        .ok_or_else(|| error_response(Error::RangeEmpty { start, end }))?;
    Ok(Json(series))
}

async fn summary_chart(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<SummarySeries>, (StatusCode, String)> {
    let guard = state.dataset.read().await;
    let dataset = guard
        .as_ref()
        .ok_or_else(|| error_response(Error::NoDataset))?;
    let (start, end) = range_of(dataset, &query).map_err(error_response)?;
    let (sleep, feeds) = dataset.slice(start, end);
    let series = prepare_summary(&sleep, &feeds)
        .ok_or_else(|| error_response(Error::RangeEmpty { start, end }))?;
    Ok(Json(series))
}

// ── Error mapping ───────────────────────────────────────────────────────

/// Map a core error onto a status code and the user-facing wording. The
/// no-dataset, range-empty, bad-date and ingestion-failed signals must
/// stay distinguishable.
fn error_response(err: Error) -> (StatusCode, String) {
    match err {
        Error::NoDataset => (
            StatusCode::CONFLICT,
            "No dataset loaded. Upload an archive first.".into(),
        ),
        Error::RangeEmpty { start, end } => (
            StatusCode::NOT_FOUND,
            format!("No records between {start} and {end}."),
        ),
        Error::BadDateArg(arg) => (
            StatusCode::BAD_REQUEST,
            format!("Malformed date argument: {arg}. Use YYYY-MM-DD, today or yesterday."),
        ),
        Error::Archive(msg) => (StatusCode::BAD_REQUEST, format!("Ingestion failed: {msg}")),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}
