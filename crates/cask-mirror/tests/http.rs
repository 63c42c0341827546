use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cask_fetch::{ApiResponse, CacheStorage, FilesystemStorage};
use cask_mirror::{Mirror, MirrorConfig, ReleaseBuilder, router};
use cask_platform::{Architecture, Platform};
use cask_verify::SecretKey;
use tower::ServiceExt;

async fn served_mirror(dir: &std::path::Path) -> (axum::Router, Vec<u8>) {
    let key = SecretKey::from_bytes([23u8; 32]);
    let storage: Arc<dyn CacheStorage> = Arc::new(FilesystemStorage::new(dir).unwrap());
    let mirror = Mirror::new(
        MirrorConfig::new().with_public_key(key.public_key().to_armored()),
        Some(storage),
        None,
    )
    .unwrap();

    let binary = b"served binary".to_vec();
    let mut builder = ReleaseBuilder::new(key);
    builder
        .package_binary(Platform::Linux, Architecture::Amd64, binary.clone(), vec![])
        .unwrap();
    builder
        .build(&"1.2.0".parse().unwrap(), &mirror)
        .await
        .unwrap();

    (router(Arc::new(mirror)), binary)
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn listing_endpoint_serves_json() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = served_mirror(dir.path()).await;

    let (status, body) = get(&app, "/api.json").await;
    assert_eq!(status, StatusCode::OK);

    let response: ApiResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.versions.len(), 1);
    assert_eq!(response.versions[0].id.to_string(), "1.2.0");
}

#[tokio::test]
async fn artifacts_are_served_as_octet_streams() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = served_mirror(dir.path()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1.2.0/cask_1.2.0_SHA256SUMS")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.ends_with(b"cask_1.2.0_linux_amd64.tar.gz\n"));
}

#[tokio::test]
async fn unknown_versions_and_artifacts_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = served_mirror(dir.path()).await;

    let (status, _) = get(&app, "/v9.9.9/cask_9.9.9_SHA256SUMS").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/vnot-a-version/file").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/v1.2.0/absent.file").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn the_version_prefix_is_optional() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = served_mirror(dir.path()).await;

    let (prefixed, body_a) = get(&app, "/v1.2.0/cask_1.2.0_SHA256SUMS").await;
    let (bare, body_b) = get(&app, "/1.2.0/cask_1.2.0_SHA256SUMS").await;
    assert_eq!(prefixed, StatusCode::OK);
    assert_eq!(bare, StatusCode::OK);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn stored_but_unlisted_files_are_not_served() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = served_mirror(dir.path()).await;

    // A file dropped into the storage tree without going through
    // create_version_asset is invisible to the mirror.
    std::fs::write(dir.path().join("v1.2.0").join("rogue.bin"), b"rogue").unwrap();

    let (status, _) = get(&app, "/v1.2.0/rogue.bin").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_paths_are_bad_requests() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = served_mirror(dir.path()).await;

    let (status, _) = get(&app, "/unexpected").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/a/b/c").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
