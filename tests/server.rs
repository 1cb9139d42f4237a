//! Http api tests against an in memory repository

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use chrono::{TimeZone, Utc};
use release_tagger::client::memory::{MemoryRegistryApi, StoredImageBuilder};
use release_tagger::config::ReleaseConfig;
use release_tagger::models::{ErrorMessage, Image};
use release_tagger::server::router;
use release_tagger::service::ReleaseService;
use release_tagger::uri::RepositoryAddress;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

const URI: &str = "000000000000.dkr.ecr.ap-northeast-1.amazonaws.com/repository1";
const DIGEST1: &str = "sha256:4d2653f861f1c4cb187f1a61f97b9af7adec9ec1986d8e253052cfa60fd7372f";
const DIGEST2: &str = "sha256:20b39162cb057eab7168652ab012ae3712f164bf2b4ef09e6541fca4ead3df62";
const DIGEST3: &str = "sha256:9a0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b";

fn test_api() -> Arc<MemoryRegistryApi> {
    let address: RepositoryAddress = URI.parse().unwrap();
    Arc::new(
        MemoryRegistryApi::new(&address)
            .with_image(
                StoredImageBuilder::default()
                    .digest(DIGEST1)
                    .manifest(r#"{"schemaVersion":2,"config":{"digest":"sha256:c1"}}"#)
                    .pushed_at(Utc.with_ymd_and_hms(2022, 9, 2, 5, 27, 2).unwrap())
                    .size_bytes(10017365_i64)
                    .tags(vec!["latest".to_string()])
                    .build()
                    .unwrap(),
            )
            .with_image(
                StoredImageBuilder::default()
                    .digest(DIGEST2)
                    .manifest(r#"{"schemaVersion":2,"config":{"digest":"sha256:c2"}}"#)
                    .pushed_at(Utc.with_ymd_and_hms(2022, 9, 2, 5, 7, 10).unwrap())
                    .size_bytes(10017367_i64)
                    .tags(vec!["old".to_string(), "release".to_string()])
                    .build()
                    .unwrap(),
            )
            .with_image(
                StoredImageBuilder::default()
                    .digest(DIGEST3)
                    .manifest(r#"{"schemaVersion":2,"config":{"digest":"sha256:c3"}}"#)
                    .pushed_at(Utc.with_ymd_and_hms(2022, 9, 3, 0, 0, 0).unwrap())
                    .size_bytes(512_i64)
                    .build()
                    .unwrap(),
            ),
    )
}

fn test_app(uri: &str, api: Arc<MemoryRegistryApi>) -> axum::Router {
    let config = ReleaseConfig::from_uri(uri, None).unwrap();
    router(ReleaseService::new(&config, api))
}

fn post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/images")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get() -> Request<Body> {
    Request::builder()
        .uri("/images")
        .body(Body::empty())
        .unwrap()
}

async fn json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_get_images() {
    let app = test_app(URI, test_api());

    let response = app.oneshot(get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = json(response).await;
    let images = body.as_array().unwrap();
    // The untagged image is left out
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["digest"], DIGEST1);
    assert_eq!(images[0]["pushedAt"], "2022-09-02T05:27:02Z");
    assert_eq!(images[0]["repositoryName"], "repository1");
    assert_eq!(images[0]["size"].as_f64(), Some(10017365.0));
    assert_eq!(images[0]["tags"], serde_json::json!(["latest"]));
    assert_eq!(images[1]["digest"], DIGEST2);
    assert_eq!(images[1]["tags"], serde_json::json!(["old", "release"]));
}

#[tokio::test]
async fn test_post_images_moves_release_tag() {
    let api = test_api();
    let app = test_app(URI, api.clone());

    let response = app.oneshot(post(r#"{"tag": "latest"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let images: Vec<Image> = json(response).await;
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].digest, DIGEST1);
    assert_eq!(images[0].tags, vec!["latest", "release"]);
    assert_eq!(images[1].digest, DIGEST2);
    assert_eq!(images[1].tags, vec!["old"]);

    let published = api.published();
    assert_eq!(published.len(), 1);
    assert_eq!(
        published[0].0.as_str(),
        r#"{"schemaVersion":2,"config":{"digest":"sha256:c1"}}"#
    );
    assert_eq!(published[0].1, "release");
}

#[tokio::test]
async fn test_post_images_repeated() {
    let api = test_api();
    let app = test_app(URI, api.clone());

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post(r#"{"tag": "latest"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(api.digest_for("release").as_deref(), Some(DIGEST1));
    assert_eq!(api.published().len(), 2);
}

#[tokio::test]
async fn test_post_images_unknown_tag() {
    let api = test_api();
    let app = test_app(URI, api.clone());

    let response = app.oneshot(post(r#"{"tag": "missing"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorMessage = json(response).await;
    assert!(error.message.starts_with("failed to set tag"));
    assert!(error.message.contains("missing"));
    assert!(api.published().is_empty());
    assert_eq!(api.digest_for("release").as_deref(), Some(DIGEST2));
}

#[tokio::test]
async fn test_post_images_malformed_body() {
    let api = test_api();
    let app = test_app(URI, api.clone());

    for body in [r#"{"tag": "latest""#, r#"{"label": "latest"}"#, r#"{"tag": ""}"#] {
        let response = app.clone().oneshot(post(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let error: ErrorMessage = json(response).await;
        assert!(error.message.starts_with("malformed request parameters"));
    }

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/images")
                .body(Body::from(r#"{"tag": "latest"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(api.published().is_empty());
}

#[tokio::test]
async fn test_get_images_remote_failure() {
    // The repository double rejects calls addressed to another registry
    let app = test_app(
        "111111111111.dkr.ecr.ap-northeast-1.amazonaws.com/repository1",
        test_api(),
    );

    let response = app.oneshot(get()).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorMessage = json(response).await;
    assert!(error.message.contains("repository1"));
}
