use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional filters for the public job listing. All filters compose with an
/// implicit `is_open = TRUE`; closed postings never appear in listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    /// Case-insensitive substring match against title and short description.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub short_description: String,
    /// May embed rich-text markup; rendered as-is by the presentation layer.
    pub full_description: String,
    pub responsibilities: Vec<String>,
    pub requirements: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDetailResponse {
    pub job: JobDetail,
}
