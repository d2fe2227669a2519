use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use careers_common::api::application::{
    should_notify, ApplicationFilter, ApplicationListResponse, ApplicationRow, ApplicationStatus,
    StatusUpdate, SubmitApplication, SubmitReceipt, TrackingResponse,
};
use careers_common::csv::render_applications_csv;
use careers_common::db::{
    create_application, find_by_tracking_code, list_applications as fetch_applications, set_status,
};
use careers_common::intake::{self, NewApplication};

use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::SharedState;

/// Public intake endpoint: full server-side validation, job resolution, the
/// dedup guard, and a best-effort confirmation email.
pub async fn submit(
    State(state): State<SharedState>,
    Json(payload): Json<SubmitApplication>,
) -> Result<(StatusCode, Json<SubmitReceipt>), ApiError> {
    let errors = intake::validate(&state.config.intake, &payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let application = NewApplication::from_submission(&payload);
    let created = create_application(&state.pool, &application).await?;

    // Decoupled from the response: a slow or failing mail provider must never
    // block or fail a submission.
    state.notifier.submission_confirmed(
        &created.email,
        &created.name,
        &created.job_title,
        &created.tracking_code,
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitReceipt {
            application_id: created.id,
            tracking_code: created.tracking_code,
        }),
    ))
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, ApiError> {
    ApplicationStatus::from_str(raw).map_err(|_| {
        ApiError::BadRequest(format!(
            "invalid status: {raw}; allowed values: {}",
            ApplicationStatus::allowed_values()
        ))
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateResponse {
    pub application: ApplicationRow,
}

/// Operator status write. Fires a status-update notification only when the
/// value actually changed to something other than "new".
pub async fn update_status(
    State(state): State<SharedState>,
    _session: AdminSession,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<StatusUpdateResponse>, ApiError> {
    let status = parse_status(payload.status.trim())?;

    let change = set_status(&state.pool, id, status).await?;

    if should_notify(change.previous, status) {
        state.notifier.status_changed(
            &change.application.email,
            &change.application.name,
            &change.application.job_title,
            status,
            &change.application.tracking_code,
        );
    }

    Ok(Json(StatusUpdateResponse {
        application: change.application,
    }))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub job_id: Option<i64>,
    pub status: Option<String>,
}

fn parse_filter(params: &ListParams) -> Result<ApplicationFilter, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?;

    Ok(ApplicationFilter {
        job_id: params.job_id,
        status,
    })
}

pub async fn list(
    State(state): State<SharedState>,
    _session: AdminSession,
    Query(params): Query<ListParams>,
) -> Result<Json<ApplicationListResponse>, ApiError> {
    let filter = parse_filter(&params)?;
    let applications = fetch_applications(&state.pool, &filter).await?;
    Ok(Json(ApplicationListResponse { applications }))
}

/// CSV export of the (optionally filtered) listing; the filename carries the
/// export date.
pub async fn export(
    State(state): State<SharedState>,
    _session: AdminSession,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = parse_filter(&params)?;
    let applications = fetch_applications(&state.pool, &filter).await?;
    let csv = render_applications_csv(&applications);

    let filename = format!("applications-{}.csv", Utc::now().format("%Y-%m-%d"));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}

/// Public tracking lookup. Unknown codes are a generic 404; a bearer of the
/// wrong code learns nothing about whose application exists.
pub async fn track(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<TrackingResponse>, ApiError> {
    let view = find_by_tracking_code(&state.pool, &code)
        .await?
        .ok_or_else(|| ApiError::NotFound("application not found".into()))?;

    Ok(Json(TrackingResponse { application: view }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_outside_the_set_are_rejected_with_the_allowed_list() {
        let err = parse_status("archived").unwrap_err();
        match err {
            ApiError::BadRequest(msg) => {
                assert!(msg.contains("archived"));
                assert!(msg.contains("new, reviewing, interviewed, rejected, hired"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn every_member_of_the_set_parses() {
        for raw in ["new", "reviewing", "interviewed", "rejected", "hired"] {
            assert!(parse_status(raw).is_ok(), "{raw} should parse");
        }
    }

    #[test]
    fn list_filter_validates_the_status_param() {
        let params = ListParams {
            job_id: Some(3),
            status: Some("reviewing".into()),
        };
        let filter = parse_filter(&params).unwrap();
        assert_eq!(filter.job_id, Some(3));
        assert_eq!(filter.status, Some(ApplicationStatus::Reviewing));

        let params = ListParams {
            job_id: None,
            status: Some("bogus".into()),
        };
        assert!(parse_filter(&params).is_err());
    }
}
