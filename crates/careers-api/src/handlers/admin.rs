//! Operator login/logout and catalog seeding.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use careers_common::db::seed_jobs;

use crate::auth::{is_authenticated, AdminSession};
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// Exchange the shared secret for the session cookie.
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("password is required".into()))?;

    if !state.config.session.verify_password(password) {
        return Err(ApiError::Unauthorized("invalid password".into()));
    }

    info!("operator session opened");
    let jar = jar.add(state.config.session.session_cookie());

    Ok((jar, Json(json!({ "message": "authentication successful" }))))
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.add(state.config.session.logout_cookie());
    (jar, Json(json!({ "message": "logged out" })))
}

/// Session probe for the admin UI; always 200.
pub async fn session(jar: CookieJar) -> Json<serde_json::Value> {
    Json(json!({ "authenticated": is_authenticated(&jar) }))
}

/// Idempotent starter-catalog seeding; existing slugs are left untouched.
pub async fn seed(
    State(state): State<SharedState>,
    _session: AdminSession,
) -> Result<Json<serde_json::Value>, ApiError> {
    let inserted = seed_jobs(&state.pool).await?;
    info!(inserted, "seeded job catalog");
    Ok(Json(json!({ "seeded": inserted })))
}
