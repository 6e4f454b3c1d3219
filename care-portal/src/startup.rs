use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware,
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{health_check, index, navigate},
    basic_health::{basic_health_page, basic_health_submit},
    chatbot::{chatbot_page, send_message},
    facilities::{
        facilities_page, facilities_state, map_ready, report_location, start_search,
    },
    metrics::metrics,
    report::{analyze_report, report_page},
};
use crate::AppState;

/// Session cookie options.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub secure_cookies: bool,
    pub idle_minutes: i64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            secure_cookies: false,
            idle_minutes: 24 * 60,
        }
    }
}

pub fn build_router(state: AppState, options: SessionOptions) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(options.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(options.idle_minutes)));

    Router::new()
        .route("/", get(index))
        .route("/navigate/:page_key", get(navigate))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route(
            "/basic-health",
            get(basic_health_page).post(basic_health_submit),
        )
        .route("/chatbot", get(chatbot_page))
        .route("/api/chat", post(send_message))
        .route("/report-analyzer", get(report_page))
        .route("/api/report/analyze", post(analyze_report))
        .route("/find-facilities", get(facilities_page))
        .route("/api/facilities", get(facilities_state))
        .route("/api/facilities/map-ready", post(map_ready))
        .route("/api/facilities/search", post(start_search))
        .route("/api/facilities/location", post(report_location))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
