use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Closed status enumeration. "new" is the only initial state; any state may
/// move to any other at operator discretion, including no-ops.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
    New,
    Reviewing,
    Interviewed,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    /// Human-readable list of every accepted value, for validation messages.
    pub fn allowed_values() -> String {
        Self::iter()
            .map(|status| status.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A status-update notification goes out only when the value actually changed
/// and the new value is not "new". Re-saving the same status or resetting to
/// "new" would otherwise spam the applicant with no-op mail, and "new" already
/// has its own submission-confirmation template.
pub fn should_notify(previous: ApplicationStatus, new: ApplicationStatus) -> bool {
    previous != new && new != ApplicationStatus::New
}

/// Raw intake payload as posted by the application form. Every field is
/// optional at the wire level; `intake::validate` decides which are required
/// for the configured form variant and reports the full violation set.
///
/// Two form revisions are in circulation: the minimal one speaks of a
/// `coverNote` and `weeklyAvailability`, the extended one of `motivation` and
/// `availability`. Both wordings land in the same fields via serde aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplication {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub year: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "weeklyAvailability")]
    pub availability: Option<String>,
    pub start_timeline: Option<String>,
    pub portfolio_link: Option<String>,
    pub resume_url: Option<String>,
    pub experience_summary: Option<String>,
    #[serde(alias = "coverNote")]
    pub motivation: Option<String>,
    pub problem_interest: Option<String>,
    pub exam_background: Option<String>,
    pub teaching_experience: Option<String>,
    pub commitment_confirmed: Option<bool>,
    pub referral_source: Option<String>,
    pub job_slug: Option<String>,
}

/// Returned to the applicant on a successful submission. The tracking code is
/// the only credential for later self-service lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub application_id: i64,
    pub tracking_code: String,
}

/// Operator-requested status change.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Optional filters for the operator listing and CSV export.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFilter {
    pub job_id: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

/// Full application record as shown to operators, with the job reference
/// resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub year: String,
    pub location: String,
    pub availability: String,
    pub start_timeline: String,
    pub portfolio_link: String,
    pub resume_url: Option<String>,
    pub experience_summary: String,
    pub motivation: String,
    pub problem_interest: String,
    pub exam_background: Option<String>,
    pub teaching_experience: Option<String>,
    pub commitment_confirmed: bool,
    pub referral_source: Option<String>,
    pub job_id: i64,
    pub job_title: String,
    pub job_slug: String,
    pub status: ApplicationStatus,
    pub tracking_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationRow>,
}

/// Public projection served by the tracking endpoint. Deliberately narrowed:
/// no email, phone, links, or free-text answers ever cross this boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub name: String,
    pub status: ApplicationStatus,
    pub job_title: String,
    pub job_category: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingResponse {
    pub application: TrackingView,
}

/// Field-name → message map carried by a validation failure.
pub type FieldErrors = BTreeMap<String, String>;
