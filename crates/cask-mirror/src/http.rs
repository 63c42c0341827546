use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use cask_fetch::{ApiResponse, CacheError, DownloadError, Downloader, ListOptions};
use cask_version::Version;
use tracing::warn;

use crate::mirror::Mirror;

/// HTTP surface of a mirror, compatible with the downloader's defaults:
///
/// - `GET /api.json` serves the version listing
/// - `GET /v{version}/{artifact}` serves one artifact (the `v` prefix is
///   optional)
///
/// Unknown versions and artifacts are 404, upstream failures are 502, and
/// anything else is 400.
pub fn router(mirror: Arc<Mirror>) -> Router {
    Router::new()
        .route("/api.json", get(serve_listing))
        .route("/:version/:artifact", get(serve_artifact))
        .fallback(|| async { StatusCode::BAD_REQUEST })
        .with_state(mirror)
}

/// Serves the mirror on an already-bound listener.
pub async fn serve(mirror: Arc<Mirror>, listener: tokio::net::TcpListener) -> std::io::Result<()> {
    axum::serve(listener, router(mirror)).await
}

async fn serve_listing(State(mirror): State<Arc<Mirror>>) -> Response {
    match mirror.list_versions(ListOptions::default()).await {
        Ok(versions) => Json(ApiResponse { versions }).into_response(),
        Err(err) => bad_gateway(err),
    }
}

async fn serve_artifact(
    State(mirror): State<Arc<Mirror>>,
    Path((version, artifact)): Path<(String, String)>,
) -> Response {
    // The canonical layout uses a `v` prefix but bare versions are served
    // too, matching what mirrors in the wild accept.
    let raw = version.strip_prefix('v').unwrap_or(&version);
    let Ok(version) = raw.parse::<Version>() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let listing = match mirror.list_versions(ListOptions::default()).await {
        Ok(listing) => listing,
        Err(err) => return bad_gateway(err),
    };
    let Some(entry) = listing.into_iter().find(|entry| entry.id == version) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match mirror.download_artifact(&entry, &artifact).await {
        Ok(data) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            data,
        )
            .into_response(),
        Err(DownloadError::NoSuchArtifact(_))
        | Err(DownloadError::Cache(CacheError::Miss(_))) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => bad_gateway(err),
    }
}

fn bad_gateway(err: DownloadError) -> Response {
    warn!(error = %err, "mirror request failed upstream");
    StatusCode::BAD_GATEWAY.into_response()
}
