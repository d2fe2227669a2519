use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/admin/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let response = app
        .oneshot(login_request(r#"{"password":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_password_is_a_bad_request() {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let response = app.oneshot(login_request(r#"{}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn correct_password_sets_a_hardened_session_cookie() {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let response = app
        .oneshot(login_request(r#"{"password":"test-secret"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the session cookie")
        .to_str()
        .unwrap()
        .to_owned();

    assert!(cookie.starts_with("careers_admin=authenticated"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=86400"));
}

#[tokio::test]
async fn session_probe_reflects_the_cookie() {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let anonymous = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(anonymous.status(), StatusCode::OK);
    let bytes = anonymous.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["authenticated"], false);

    let authenticated = app
        .oneshot(
            Request::builder()
                .uri("/admin/session")
                .header(header::COOKIE, "careers_admin=authenticated")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let bytes = authenticated.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["authenticated"], true);
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let state = careers_api::test_state("test-secret");
    let app = careers_api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/admin/login")
                .header(header::COOKIE, "careers_admin=authenticated")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("logout must clear the session cookie")
        .to_str()
        .unwrap();

    assert!(cookie.starts_with("careers_admin="));
    assert!(cookie.contains("Max-Age=0"));
}
