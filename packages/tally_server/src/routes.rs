use axum::{Router, http::Method, routing::get};
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{MakeSpan, TraceLayer};
use uuid::Uuid;

use crate::AppState;
use crate::handlers;

/// Custom span maker that adds a unique request ID to each incoming request
#[derive(Clone)]
struct RequestIdMakeSpan;

impl<B> MakeSpan<B> for RequestIdMakeSpan {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> tracing::Span {
        let request_id = Uuid::new_v4().to_string();
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// Build the HTTP router. Static assets, when configured, are the fallback.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/tally", get(handlers::tally_handler))
        .route("/health", get(handlers::health_handler))
        .route("/health/live", get(handlers::health_live_handler))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => {
            let index = dir.join("index.html");
            app.fallback_service(ServeDir::new(dir).not_found_service(ServeFile::new(index)))
        }
        None => app,
    };

    app.layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
}
