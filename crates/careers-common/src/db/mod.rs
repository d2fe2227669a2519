pub mod applications;
pub mod jobs;
pub mod migrations;
pub mod pool;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use applications::{
    create_application, find_by_tracking_code, list_applications, set_status,
    ApplicationStorageError, CreatedApplication, StatusChange,
};
pub use jobs::{get_job_by_slug, list_jobs, seed_jobs, JobStorageError};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};
