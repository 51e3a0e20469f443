//! Axum router wiring.
//!
//! ```text
//! /
//! ├── /              - branch/version directory (JSON)
//! ├── /health        - liveness probe
//! ├── /overview      - legacy 301 to /json/v1/overview.json
//! └── /json/…        - pre-generated documents from disk, with dynamic
//!                      /json/v1 generation as fallback
//! ```
//!
//! A doubled path separator anywhere is answered with a 301 to the
//! collapsed form before routing.

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::handlers;
use crate::state::AppState;

/// Build the complete router over the shared state.
pub fn build_router(state: AppState) -> Router {
    let json_dir = state.settings().public_path.join("json");

    // Pre-generated documents win; the dynamic routes only see paths with
    // no matching file on disk.
    let dynamic_json = Router::new()
        .route("/v1/{*rest}", get(handlers::json_v1))
        .with_state(state.clone());

    Router::new()
        .route("/", get(handlers::directory))
        .route("/health", get(handlers::health))
        .route("/overview", get(handlers::overview_redirect))
        .nest_service("/json", ServeDir::new(json_dir).fallback(dynamic_json))
        .layer(middleware::from_fn(collapse_double_slashes))
        .with_state(state)
}

async fn collapse_double_slashes(req: Request, next: Next) -> Response {
    if let Some(mut location) = collapsed_path(req.uri().path()) {
        if let Some(query) = req.uri().query() {
            location.push('?');
            location.push_str(query);
        }
        return handlers::moved_permanently(&location);
    }
    next.run(req).await
}

/// The single-separator form of `path`, or `None` if it is already clean.
fn collapsed_path(path: &str) -> Option<String> {
    if !path.contains("//") {
        return None;
    }
    let mut collapsed = String::with_capacity(path.len());
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        collapsed.push('/');
        collapsed.push_str(segment);
    }
    if collapsed.is_empty() {
        collapsed.push('/');
    }
    Some(collapsed)
}
