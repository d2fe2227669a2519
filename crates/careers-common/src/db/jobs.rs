use deadpool_postgres::PoolError;
use tokio_postgres::types::ToSql;
use tokio_postgres::Error as PgError;
use tokio_postgres::Row;
use tracing::instrument;

use crate::api::job::{JobDetail, JobFilter, JobSummary};
use crate::db::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum JobStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

fn summary_from_row(row: &Row) -> JobSummary {
    JobSummary {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        short_description: row.get("short_description"),
        category: row.get("category"),
        tags: row.get("tags"),
        location: row.get("location"),
        job_type: row.get("job_type"),
        created_at: row.get("created_at"),
    }
}

fn detail_from_row(row: &Row) -> JobDetail {
    JobDetail {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        short_description: row.get("short_description"),
        full_description: row.get("full_description"),
        responsibilities: row.get("responsibilities"),
        requirements: row.get("requirements"),
        nice_to_have: row.get("nice_to_have"),
        category: row.get("category"),
        tags: row.get("tags"),
        location: row.get("location"),
        job_type: row.get("job_type"),
        is_open: row.get("is_open"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// List open postings, newest first. Filters compose; `search` is a
/// case-insensitive substring match on title and short description.
#[instrument(skip(pool, filter))]
pub async fn list_jobs(pool: &PgPool, filter: &JobFilter) -> Result<Vec<JobSummary>, JobStorageError> {
    let client = pool.get().await?;

    let search_pattern = filter
        .search
        .as_ref()
        .map(|term| format!("%{}%", term.trim()));

    let mut conditions = vec!["is_open = TRUE".to_string()];
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

    if let Some(category) = &filter.category {
        params.push(category);
        conditions.push(format!("category = ${}", params.len()));
    }

    if let Some(tag) = &filter.tag {
        params.push(tag);
        conditions.push(format!("${} = ANY(tags)", params.len()));
    }

    if let Some(pattern) = &search_pattern {
        params.push(pattern);
        conditions.push(format!(
            "(title ILIKE ${n} OR short_description ILIKE ${n})",
            n = params.len()
        ));
    }

    let query = format!(
        "SELECT id, slug, title, short_description, category, tags, location, job_type, created_at
         FROM careers.jobs
         WHERE {}
         ORDER BY created_at DESC",
        conditions.join(" AND ")
    );

    let rows = client.query(&query, &params).await?;
    Ok(rows.iter().map(summary_from_row).collect())
}

/// Fetch a single open posting by slug. Closed or unknown slugs both come back
/// as `None`; callers present one "not accepting applications" message.
#[instrument(skip(pool))]
pub async fn get_job_by_slug(pool: &PgPool, slug: &str) -> Result<Option<JobDetail>, JobStorageError> {
    let client = pool.get().await?;

    let row = client
        .query_opt(
            "SELECT id, slug, title, short_description, full_description, responsibilities,
                    requirements, nice_to_have, category, tags, location, job_type, is_open,
                    created_at, updated_at
             FROM careers.jobs
             WHERE slug = $1 AND is_open = TRUE",
            &[&slug],
        )
        .await?;

    Ok(row.as_ref().map(detail_from_row))
}

struct SeedJob {
    slug: &'static str,
    title: &'static str,
    short_description: &'static str,
    full_description: &'static str,
    responsibilities: &'static [&'static str],
    requirements: &'static [&'static str],
    nice_to_have: &'static [&'static str],
    category: &'static str,
    tags: &'static [&'static str],
    location: &'static str,
    job_type: &'static str,
}

const SEED_JOBS: &[SeedJob] = &[
    SeedJob {
        slug: "founding-full-stack-engineer",
        title: "Founding Full-Stack Engineer",
        short_description: "Build the core platform from the ground up. High ownership, high impact.",
        full_description: "As a Founding Full-Stack Engineer you will be one of the first engineers \
            on the team, shaping the technical foundation and working directly with the founders to \
            build, scale, and iterate on the core product.",
        responsibilities: &[
            "Architect and build scalable full-stack applications.",
            "Design and implement RESTful APIs and database schemas.",
            "Collaborate on product design and UX decisions.",
            "Ensure code quality through reviews and testing.",
        ],
        requirements: &[
            "3+ years of experience with modern web frameworks.",
            "Strong understanding of database design.",
            "Ability to ship features end-to-end independently.",
        ],
        nice_to_have: &["Experience in an early-stage startup.", "Open source contributions."],
        category: "Tech",
        tags: &["Full-Stack", "Startup", "Engineering"],
        location: "Remote",
        job_type: "Full-time",
    },
    SeedJob {
        slug: "frontend-engineer",
        title: "Frontend Engineer",
        short_description: "Craft beautiful, responsive, and high-performance user interfaces.",
        full_description: "We are looking for a Frontend Engineer with a keen eye for design and a \
            passion for building smooth, interactive user experiences across all devices.",
        responsibilities: &[
            "Develop and maintain the user interface.",
            "Build reusable components and front-end libraries.",
            "Optimize applications for maximum speed.",
        ],
        requirements: &[
            "2+ years of experience with React and modern CSS.",
            "Strong understanding of the DOM, HTML5, and CSS3.",
            "Attention to detail and a passion for UI perfection.",
        ],
        nice_to_have: &["Experience with animation libraries.", "Design background."],
        category: "Tech",
        tags: &["Frontend", "React", "UI/UX"],
        location: "Remote",
        job_type: "Full-time",
    },
    SeedJob {
        slug: "campus-ambassador",
        title: "Campus Ambassador",
        short_description: "Represent us on your campus and build a community of builders.",
        full_description: "The Campus Ambassador program is your chance to be our face at your \
            college, helping us reach students and build a community of passionate individuals.",
        responsibilities: &[
            "Promote programs and events on campus.",
            "Organize workshops and meetups.",
            "Gather feedback from students.",
        ],
        requirements: &[
            "Currently enrolled at a college or university.",
            "Strong communication skills.",
        ],
        nice_to_have: &["Prior community or club leadership."],
        category: "Outreach",
        tags: &["Community", "Marketing", "Leadership"],
        location: "On-site",
        job_type: "Internship",
    },
];

/// Idempotent starter catalog. Existing slugs are left untouched so operator
/// edits (including closing a posting) survive a re-seed.
#[instrument(skip(pool))]
pub async fn seed_jobs(pool: &PgPool) -> Result<u64, JobStorageError> {
    let client = pool.get().await?;

    let stmt = client
        .prepare_cached(
            "INSERT INTO careers.jobs (
                slug, title, short_description, full_description, responsibilities,
                requirements, nice_to_have, category, tags, location, job_type
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (slug) DO NOTHING",
        )
        .await?;

    let mut inserted = 0;
    for job in SEED_JOBS {
        let responsibilities: Vec<&str> = job.responsibilities.to_vec();
        let requirements: Vec<&str> = job.requirements.to_vec();
        let nice_to_have: Vec<&str> = job.nice_to_have.to_vec();
        let tags: Vec<&str> = job.tags.to_vec();

        inserted += client
            .execute(
                &stmt,
                &[
                    &job.slug,
                    &job.title,
                    &job.short_description,
                    &job.full_description,
                    &responsibilities,
                    &requirements,
                    &nice_to_have,
                    &job.category,
                    &tags,
                    &job.location,
                    &job.job_type,
                ],
            )
            .await?;
    }

    Ok(inserted)
}
