//! Validation runs before any storage access, so these exercise the full
//! router without a live database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn submit(body: &str) -> (StatusCode, Value) {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/applications")
                .header("content-type", "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn empty_submission_reports_every_missing_field() {
    let (status, json) = submit("{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_failed");

    let errors = json["errors"].as_object().expect("field error map");
    for field in [
        "name",
        "email",
        "portfolioLink",
        "coverNote",
        "weeklyAvailability",
        "jobSlug",
    ] {
        assert!(errors.contains_key(field), "missing violation for {field}");
    }
}

#[tokio::test]
async fn malformed_email_is_reported_alongside_other_violations() {
    let (status, json) = submit(r#"{"name":"Jane Doe","email":"not-an-email"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = json["errors"].as_object().unwrap();
    assert_eq!(errors["email"], "Please enter a valid email address");
    assert!(!errors.contains_key("name"));
    assert!(errors.contains_key("jobSlug"));
}

#[tokio::test]
async fn invalid_status_names_the_allowed_set() {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/applications/7")
                .header("content-type", "application/json")
                .header(header::COOKIE, "careers_admin=authenticated")
                .body(Body::from(r#"{"status":"archived"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("new, reviewing, interviewed, rejected, hired"));
}

#[tokio::test]
async fn bad_status_filter_on_the_listing_is_rejected() {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/applications?status=bogus")
                .header(header::COOKIE, "careers_admin=authenticated")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
