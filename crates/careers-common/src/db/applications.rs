//! Application persistence: intake insert with the dedup guard, the status
//! lifecycle write, operator listings, and the public tracking lookup.

use std::str::FromStr;

use deadpool_postgres::PoolError;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::Error as PgError;
use tokio_postgres::Row;
use tracing::{instrument, warn};

use crate::api::application::{
    ApplicationFilter, ApplicationRow, ApplicationStatus, TrackingView,
};
use crate::db::PgPool;
use crate::intake::NewApplication;
use crate::tracking::new_tracking_code;

/// Fresh-code retries after a tracking-code collision. At 48 bits a single
/// collision is already vanishingly rare; two in a row means something is
/// wrong with the entropy source and we give up loudly.
const TRACKING_CODE_ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ApplicationStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to map application row: {0}")]
    Mapping(String),
    #[error("job not found or closed: {0}")]
    JobNotFound(String),
    #[error("application not found: {0}")]
    NotFound(i64),
    #[error("an application for this job already exists for this email")]
    Duplicate,
}

/// What the insert conflicted on, derived from the violated constraint.
#[derive(Debug, PartialEq, Eq)]
enum InsertConflict {
    /// The (email, job) pair already has an application — a racing duplicate
    /// submission that slipped past the pre-check.
    DuplicateApplication,
    /// The freshly minted tracking code is already taken; retry with a new one.
    TrackingCollision,
}

fn classify_conflict(constraint: Option<&str>) -> InsertConflict {
    match constraint {
        Some("uq_applications_tracking_code") => InsertConflict::TrackingCollision,
        // A unique violation with no (or any other) constraint name can only
        // mean the dedup constraint fired; report it as the same conflict a
        // non-racing duplicate would get.
        _ => InsertConflict::DuplicateApplication,
    }
}

fn unique_violation(err: &PgError) -> Option<InsertConflict> {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        Some(classify_conflict(
            err.as_db_error().and_then(|db| db.constraint()),
        ))
    } else {
        None
    }
}

/// Result of a successful intake insert, with enough context for the
/// confirmation notification.
#[derive(Debug, Clone)]
pub struct CreatedApplication {
    pub id: i64,
    pub tracking_code: String,
    pub name: String,
    pub email: String,
    pub job_title: String,
}

/// Result of a status write: the refreshed record plus the value it replaced,
/// so the caller can decide whether a notification is due.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub application: ApplicationRow,
    pub previous: ApplicationStatus,
}

fn application_from_row(row: &Row) -> Result<ApplicationRow, ApplicationStorageError> {
    let raw_status: String = row.get("status");
    let status = ApplicationStatus::from_str(&raw_status).map_err(|_| {
        ApplicationStorageError::Mapping(format!("unexpected status value: {raw_status}"))
    })?;

    Ok(ApplicationRow {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        college: row.get("college"),
        year: row.get("year_of_study"),
        location: row.get("location"),
        availability: row.get("availability"),
        start_timeline: row.get("start_timeline"),
        portfolio_link: row.get("portfolio_link"),
        resume_url: row.get("resume_url"),
        experience_summary: row.get("experience_summary"),
        motivation: row.get("motivation"),
        problem_interest: row.get("problem_interest"),
        exam_background: row.get("exam_background"),
        teaching_experience: row.get("teaching_experience"),
        commitment_confirmed: row.get("commitment_confirmed"),
        referral_source: row.get("referral_source"),
        job_id: row.get("job_id"),
        job_title: row.get("job_title"),
        job_slug: row.get("job_slug"),
        status,
        tracking_code: row.get("tracking_code"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const APPLICATION_COLUMNS: &str = "a.id, a.name, a.email, a.phone, a.college, a.year_of_study, \
    a.location, a.availability, a.start_timeline, a.portfolio_link, a.resume_url, \
    a.experience_summary, a.motivation, a.problem_interest, a.exam_background, \
    a.teaching_experience, a.commitment_confirmed, a.referral_source, a.job_id, \
    j.title AS job_title, j.slug AS job_slug, a.status, a.tracking_code, \
    a.created_at, a.updated_at";

/// Intake: resolve the job, guard against duplicates, persist with a fresh
/// tracking code and status "new".
///
/// The pre-check only exists for a friendlier error on the common path; two
/// submissions can race past it, so `uq_applications_email_job` is the
/// authoritative arbiter and its violation is reported as the same duplicate.
#[instrument(skip(pool, application), fields(job_slug = %application.job_slug))]
pub async fn create_application(
    pool: &PgPool,
    application: &NewApplication,
) -> Result<CreatedApplication, ApplicationStorageError> {
    let client = pool.get().await?;

    let job = client
        .query_opt(
            "SELECT id, title FROM careers.jobs WHERE slug = $1 AND is_open = TRUE",
            &[&application.job_slug],
        )
        .await?
        .ok_or_else(|| ApplicationStorageError::JobNotFound(application.job_slug.clone()))?;

    let job_id: i64 = job.get("id");
    let job_title: String = job.get("title");

    let existing = client
        .query_opt(
            "SELECT 1 FROM careers.applications WHERE email = $1 AND job_id = $2",
            &[&application.email, &job_id],
        )
        .await?;
    if existing.is_some() {
        return Err(ApplicationStorageError::Duplicate);
    }

    let stmt = client
        .prepare_cached(
            "INSERT INTO careers.applications (
                name, email, phone, college, year_of_study, location, availability,
                start_timeline, portfolio_link, resume_url, experience_summary, motivation,
                problem_interest, exam_background, teaching_experience, commitment_confirmed,
                referral_source, job_id, status, tracking_code
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, 'new', $19
            )
            RETURNING id",
        )
        .await?;

    for _ in 0..TRACKING_CODE_ATTEMPTS {
        let tracking_code = new_tracking_code();

        let inserted = client
            .query_one(
                &stmt,
                &[
                    &application.name,
                    &application.email,
                    &application.phone,
                    &application.college,
                    &application.year,
                    &application.location,
                    &application.availability,
                    &application.start_timeline,
                    &application.portfolio_link,
                    &application.resume_url,
                    &application.experience_summary,
                    &application.motivation,
                    &application.problem_interest,
                    &application.exam_background,
                    &application.teaching_experience,
                    &application.commitment_confirmed,
                    &application.referral_source,
                    &job_id,
                    &tracking_code,
                ],
            )
            .await;

        match inserted {
            Ok(row) => {
                return Ok(CreatedApplication {
                    id: row.get("id"),
                    tracking_code,
                    name: application.name.clone(),
                    email: application.email.clone(),
                    job_title: job_title.clone(),
                })
            }
            Err(err) => match unique_violation(&err) {
                Some(InsertConflict::DuplicateApplication) => {
                    return Err(ApplicationStorageError::Duplicate)
                }
                Some(InsertConflict::TrackingCollision) => {
                    warn!(job_id, "tracking code collision; minting a fresh one");
                    continue;
                }
                None => return Err(err.into()),
            },
        }
    }

    Err(ApplicationStorageError::Mapping(
        "exhausted tracking code attempts".into(),
    ))
}

/// Lifecycle write: persist the requested status, bump `updated_at`, and
/// return the refreshed record together with the previous value. Membership in
/// the closed status set is the caller's contract; the CHECK constraint backs
/// it up.
#[instrument(skip(pool))]
pub async fn set_status(
    pool: &PgPool,
    id: i64,
    status: ApplicationStatus,
) -> Result<StatusChange, ApplicationStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let row = tx
        .query_opt(
            &format!(
                "SELECT {APPLICATION_COLUMNS}
                 FROM careers.applications a
                 JOIN careers.jobs j ON j.id = a.job_id
                 WHERE a.id = $1
                 FOR UPDATE OF a"
            ),
            &[&id],
        )
        .await?
        .ok_or(ApplicationStorageError::NotFound(id))?;

    let mut application = application_from_row(&row)?;
    let previous = application.status;

    let updated = tx
        .query_one(
            "UPDATE careers.applications
             SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING updated_at",
            &[&id, &status.as_ref()],
        )
        .await?;

    tx.commit().await?;

    application.status = status;
    application.updated_at = updated.get("updated_at");

    Ok(StatusChange {
        application,
        previous,
    })
}

/// Operator listing, newest first, with the job reference resolved.
#[instrument(skip(pool, filter))]
pub async fn list_applications(
    pool: &PgPool,
    filter: &ApplicationFilter,
) -> Result<Vec<ApplicationRow>, ApplicationStorageError> {
    let client = pool.get().await?;

    let status_str = filter.status.map(|status| status.as_ref().to_owned());

    let mut conditions = vec!["TRUE".to_string()];
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

    if let Some(job_id) = &filter.job_id {
        params.push(job_id);
        conditions.push(format!("a.job_id = ${}", params.len()));
    }

    if let Some(status) = &status_str {
        params.push(status);
        conditions.push(format!("a.status = ${}", params.len()));
    }

    let query = format!(
        "SELECT {APPLICATION_COLUMNS}
         FROM careers.applications a
         JOIN careers.jobs j ON j.id = a.job_id
         WHERE {}
         ORDER BY a.created_at DESC",
        conditions.join(" AND ")
    );

    let rows = client.query(&query, &params).await?;
    rows.iter().map(application_from_row).collect()
}

/// Public tracking lookup by exact handle. Unknown handles are `None`; the
/// projection is the narrowed [`TrackingView`], never the full record.
#[instrument(skip(pool, code))]
pub async fn find_by_tracking_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<TrackingView>, ApplicationStorageError> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            "SELECT a.name, a.status, j.title AS job_title, j.category AS job_category,
                    a.created_at, a.updated_at
             FROM careers.applications a
             JOIN careers.jobs j ON j.id = a.job_id
             WHERE a.tracking_code = $1",
            &[&code],
        )
        .await?;

    row.map(|row| {
        let raw_status: String = row.get("status");
        let status = ApplicationStatus::from_str(&raw_status).map_err(|_| {
            ApplicationStorageError::Mapping(format!("unexpected status value: {raw_status}"))
        })?;

        Ok(TrackingView {
            name: row.get("name"),
            status,
            job_title: row.get("job_title"),
            job_category: row.get("job_category"),
            applied_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    })
    .transpose()
}
