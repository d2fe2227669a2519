//! CSV rendering for the operator export.

use std::borrow::Cow;

use crate::api::application::ApplicationRow;

/// Standard CSV quoting: wrap in quotes and double internal quotes whenever a
/// field contains a comma, quote, or newline.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

const HEADERS: [&str; 10] = [
    "Name",
    "Email",
    "Phone",
    "Portfolio",
    "Resume",
    "Cover Note",
    "Weekly Availability",
    "Job Title",
    "Status",
    "Applied At",
];

pub fn render_applications_csv(rows: &[ApplicationRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADERS.join(","));

    for row in rows {
        let fields = [
            escape_field(&row.name),
            escape_field(&row.email),
            escape_field(&row.phone),
            escape_field(&row.portfolio_link),
            escape_field(row.resume_url.as_deref().unwrap_or("")),
            escape_field(&row.motivation),
            escape_field(&row.availability),
            escape_field(&row.job_title),
            escape_field(row.status.as_ref()),
            Cow::Owned(row.created_at.to_rfc3339()),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}
