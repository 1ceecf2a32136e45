pub mod routes;
pub mod state;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use criblog_core::config::AppConfig;
use subtle::ConstantTimeEq;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Middleware that validates a bearer token from the Authorization header.
///
/// Uses constant-time comparison (`subtle::ConstantTimeEq`) to prevent
/// timing-based side-channel attacks that could leak the token.
async fn auth_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let expected = match &state.config.server.auth_token {
        Some(t) => t,
        None => return next.run(req).await,
    };

    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) if value.starts_with("Bearer ") => {
            let provided = &value[7..];
            // Constant-time comparison: both operands are compared in full,
            // regardless of where they first differ.
            if provided.as_bytes().ct_eq(expected.as_bytes()).into() {
                next.run(req).await
            } else {
                (StatusCode::UNAUTHORIZED, "Invalid or missing bearer token").into_response()
            }
        }
        _ => (StatusCode::UNAUTHORIZED, "Invalid or missing bearer token").into_response(),
    }
}

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    // Protected routes — require auth when a token is configured.
    let protected = Router::new()
        .merge(routes::archive_routes())
        .merge(routes::stats_routes())
        .merge(routes::chart_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public routes (health) — never require auth.
    let public = Router::new().merge(routes::health_routes());

    let mut app = Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state.clone());

    // Middleware stack.
    app = app.layer(TraceLayer::new_for_http());

    // CORS configuration.
    if config.server.cors {
        let cors = if config.server.auth_token.is_some() {
            // Restrictive CORS when auth is enabled.
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_origin(Any)
        } else {
            // Permissive CORS for local dev (no auth).
            CorsLayer::permissive()
        };
        app = app.layer(cors);
    }

    app
}

/// Start the HTTP server.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::new(config.clone());
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    if config.server.auth_token.is_none() {
        tracing::warn!("No auth_token configured — server is unauthenticated!");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const ARCHIVE: &str = r#"{"messages":[
        {"type":"message","date":"2024-01-10T15:05:00","text":"13:00-15:00 сон"},
        {"type":"message","date":"2024-01-10T17:02:00","text":"17:00 смесь 80"},
        {"type":"message","date":"2024-01-11T00:15:00","text":"23:30-06:00 сон"}
    ]}"#;

    fn test_router(auth_token: Option<String>) -> Router {
        let mut config = AppConfig::default();
        config.server.auth_token = auth_token;
        build_router(AppState::new(config))
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_archive(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/archive")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_no_auth_required() {
        let app = test_router(Some("secret-token".into()));
        let resp = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_without_token() {
        let app = test_router(Some("secret-token".into()));
        let resp = app.oneshot(get("/v1/stats")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_accepts_correct_token() {
        let app = test_router(Some("secret-token".into()));
        let req = Request::builder()
            .uri("/v1/stats")
            .header("authorization", "Bearer secret-token")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        // Auth passed; 409 because no dataset is loaded yet.
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_stats_without_dataset_is_distinct_signal() {
        let app = test_router(None);
        let resp = app.oneshot(get("/v1/stats")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(body_text(resp).await.contains("No dataset loaded"));
    }

    #[tokio::test]
    async fn test_upload_then_stats() {
        let app = test_router(None);

        let resp = app.clone().oneshot(post_archive(ARCHIVE)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let text = body_text(resp).await;
        assert!(text.contains("\"sleep_records\":2"));
        assert!(text.contains("\"feed_records\":1"));

        let resp = app
            .oneshot(get("/v1/stats?from=2024-01-10&to=2024-01-11"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let text = body_text(resp).await;
        assert!(text.contains("2024-01-10"));
        assert!(text.contains("2024-01-11"));
    }

    #[tokio::test]
    async fn test_report_renders_text_blocks() {
        let app = test_router(None);
        app.clone().oneshot(post_archive(ARCHIVE)).await.unwrap();

        let resp = app
            .oneshot(get("/v1/report?from=2024-01-10"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let text = body_text(resp).await;
        assert!(text.contains("January 10, 2024"));
        assert!(text.contains("Feed: 80 ml"));
        // 13:00-15:00 plus the re-anchored 23:30-06:00 night.
        assert!(text.contains("Sleep: 8.5 h"));
    }

    #[tokio::test]
    async fn test_malformed_archive_keeps_previous_dataset() {
        let app = test_router(None);
        app.clone().oneshot(post_archive(ARCHIVE)).await.unwrap();

        let resp = app
            .clone()
            .oneshot(post_archive(r#"{"name":"no messages key"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("Ingestion failed"));

        // The earlier dataset still answers queries.
        let resp = app
            .oneshot(get("/v1/stats?from=2024-01-10"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_archive_is_nothing_recognized() {
        let app = test_router(None);
        let resp = app
            .oneshot(post_archive(r#"{"messages":[]}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let text = body_text(resp).await;
        assert!(text.contains("No sleep or feed records recognized"));
    }

    #[tokio::test]
    async fn test_chart_range_empty_is_distinct_signal() {
        let app = test_router(None);
        app.clone().oneshot(post_archive(ARCHIVE)).await.unwrap();

        let resp = app
            .oneshot(get("/v1/charts/timeline?from=2023-06-01&to=2023-06-02"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_text(resp).await.contains("No records between"));
    }

    #[tokio::test]
    async fn test_timeline_series_shape() {
        let app = test_router(None);
        app.clone().oneshot(post_archive(ARCHIVE)).await.unwrap();

        let resp = app
            .oneshot(get("/v1/charts/timeline?from=2024-01-10&to=2024-01-11"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let text = body_text(resp).await;
        assert!(text.contains("\"start_hour\""));
        assert!(text.contains("\"intensity\""));
        // The overnight record logged at 00:15 re-anchors to Jan 10.
        assert!(text.contains("2024-01-10"));
    }

    #[tokio::test]
    async fn test_summary_series_axis_floors() {
        let app = test_router(None);
        app.clone().oneshot(post_archive(ARCHIVE)).await.unwrap();

        let resp = app.oneshot(get("/v1/charts/summary")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let text = body_text(resp).await;
        assert!(text.contains("\"feed_axis_max\":120"));
        assert!(text.contains("\"sleep_axis_max\":15"));
    }

    #[tokio::test]
    async fn test_malformed_date_is_bad_request() {
        let app = test_router(None);
        app.clone().oneshot(post_archive(ARCHIVE)).await.unwrap();

        let resp = app
            .oneshot(get("/v1/stats?from=10.01.2024"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("Malformed date argument"));
    }
}
