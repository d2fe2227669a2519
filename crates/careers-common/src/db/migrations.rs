use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::{DbPoolError, PgPool};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to build pool: {0}")]
    PoolBuild(#[from] DbPoolError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    id: 1,
    description: "job catalog + applications with dedup and tracking constraints",
    sql: r#"
CREATE TABLE IF NOT EXISTS careers.jobs (
    id BIGSERIAL PRIMARY KEY,
    slug TEXT NOT NULL,
    title TEXT NOT NULL,
    short_description TEXT NOT NULL,
    full_description TEXT NOT NULL,
    responsibilities TEXT[] NOT NULL DEFAULT '{}',
    requirements TEXT[] NOT NULL DEFAULT '{}',
    nice_to_have TEXT[] NOT NULL DEFAULT '{}',
    category TEXT NOT NULL,
    tags TEXT[] NOT NULL DEFAULT '{}',
    location TEXT NOT NULL DEFAULT 'Remote',
    job_type TEXT NOT NULL DEFAULT 'Part-time',
    is_open BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_jobs_slug UNIQUE (slug)
);

CREATE TABLE IF NOT EXISTS careers.applications (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    college TEXT NOT NULL DEFAULT '',
    year_of_study TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    availability TEXT NOT NULL DEFAULT '',
    start_timeline TEXT NOT NULL DEFAULT '',
    portfolio_link TEXT NOT NULL,
    resume_url TEXT,
    experience_summary TEXT NOT NULL DEFAULT '',
    motivation TEXT NOT NULL DEFAULT '',
    problem_interest TEXT NOT NULL DEFAULT '',
    exam_background TEXT,
    teaching_experience TEXT,
    commitment_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
    referral_source TEXT,
    job_id BIGINT NOT NULL REFERENCES careers.jobs(id),
    status TEXT NOT NULL DEFAULT 'new',
    tracking_code TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_applications_email_job UNIQUE (email, job_id),
    CONSTRAINT uq_applications_tracking_code UNIQUE (tracking_code),
    CONSTRAINT chk_applications_status
        CHECK (status IN ('new', 'reviewing', 'interviewed', 'rejected', 'hired'))
);

CREATE INDEX IF NOT EXISTS idx_applications_job_status
    ON careers.applications(job_id, status, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_applications_created
    ON careers.applications(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_jobs_open_created
    ON careers.jobs(created_at DESC)
    WHERE is_open = TRUE;
"#,
}];

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS careers;
             CREATE TABLE IF NOT EXISTS careers.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM careers.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO careers.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_ids_are_unique_and_ordered() {
        let mut previous = 0;
        for migration in MIGRATIONS {
            assert!(migration.id > previous, "ids must strictly increase");
            previous = migration.id;
        }
    }

    #[test]
    fn initial_migration_declares_the_dedup_constraints() {
        let sql = MIGRATIONS[0].sql;
        assert!(sql.contains("uq_applications_email_job UNIQUE (email, job_id)"));
        assert!(sql.contains("uq_applications_tracking_code UNIQUE (tracking_code)"));
        assert!(sql.contains("chk_applications_status"));
    }
}
