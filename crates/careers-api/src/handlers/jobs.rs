use axum::{
    extract::{Path, Query, State},
    Json,
};
use careers_common::api::job::{JobDetailResponse, JobFilter, JobListResponse};
use careers_common::db::{get_job_by_slug, list_jobs as fetch_listed_jobs};

use crate::error::ApiError;
use crate::SharedState;

pub async fn list_jobs(
    State(state): State<SharedState>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<JobListResponse>, ApiError> {
    let jobs = fetch_listed_jobs(&state.pool, &filter).await?;
    Ok(Json(JobListResponse { jobs }))
}

pub async fn get_job(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<JobDetailResponse>, ApiError> {
    let job = get_job_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("job not found".into()))?;

    Ok(Json(JobDetailResponse { job }))
}
