//! Request handlers and error mapping.

use axum::Json;
use axum::extract::{OriginalUri, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use fis_core::aggregate::AggregateError;
use fis_core::store::StoreError;
use fis_schema::TargetPath;
use serde_json::{Value, json};
use thiserror::Error;

use crate::state::AppState;

/// Boundary error mapping core failures to HTTP statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The request path does not name a known document shape.
    #[error("not found")]
    UnknownPath,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Aggregate(AggregateError::NotFound(_)) | Self::UnknownPath => {
                StatusCode::NOT_FOUND
            }
            Self::Aggregate(AggregateError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            Self::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (status, Json(json!({"detail": self.to_string()}))).into_response()
    }
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}

/// Branch/version directory view, cached by request path.
pub async fn directory(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Value>, ApiError> {
    let ttl = state.settings().cache_ttl;
    let value = state
        .cache()
        .get_or_compute(uri.path(), ttl, || async {
            let directory = fis_core::directory::build_directory(state.store()).await?;
            Ok::<_, ApiError>(serde_json::to_value(directory).expect("directory serializes"))
        })
        .await?;
    Ok(Json(value))
}

/// Legacy overview location.
pub async fn overview_redirect() -> Response {
    moved_permanently("/json/v1/overview.json")
}

/// A dynamic `/json/v1` document request, parsed from the path shape.
#[derive(Debug, PartialEq)]
enum IndexRequest {
    /// `{target_path}/index.json`
    Target(TargetPath),
    /// `{target_path}/{arch}-index.json`
    Arch(TargetPath, String),
}

/// Dynamic `/json/v1/…` documents, cached by request path.
///
/// Only reached when no pre-generated document matched on disk.
pub async fn json_v1(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(rest): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let request = parse_index_request(&rest).ok_or(ApiError::UnknownPath)?;
    let ttl = state.settings().cache_ttl;
    let value = state
        .cache()
        .get_or_compute(uri.path(), ttl, || async {
            match request {
                IndexRequest::Target(path) => {
                    let document = state.aggregator().target_index(&path).await?;
                    Ok::<_, ApiError>(serde_json::to_value(document).expect("document serializes"))
                }
                IndexRequest::Arch(path, arch) => {
                    let packages = state.aggregator().arch_index(&path, &arch).await?;
                    Ok(serde_json::to_value(packages).expect("manifest serializes"))
                }
            }
        })
        .await?;
    Ok(Json(value))
}

fn parse_index_request(rest: &str) -> Option<IndexRequest> {
    let (dir, file) = rest.rsplit_once('/')?;
    if file == "index.json" {
        return TargetPath::new(dir).ok().map(IndexRequest::Target);
    }
    let arch = file.strip_suffix("-index.json")?;
    if arch.is_empty() {
        return None;
    }
    TargetPath::new(dir)
        .ok()
        .map(|path| IndexRequest::Arch(path, arch.to_string()))
}

/// 301 with an explicit Location. Axum's `Redirect::permanent` answers
/// 308; this surface promises 301.
pub(crate) fn moved_permanently(location: &str) -> Response {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}
