//! Outbound applicant notifications.
//!
//! Delivery is best-effort and always decoupled from the request that
//! triggered it: the [`Notifier`] submits each send as a detached task and the
//! caller never learns whether it succeeded. Failures are logged, never
//! propagated.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::api::application::ApplicationStatus;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// The one capability the core consumes from the email collaborator.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a single HTML message. Returns whether delivery was accepted.
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool;
}

/// Mailer speaking the Resend HTTP API.
pub struct ResendMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self::with_endpoint(api_key, from, "https://api.resend.com/emails".into())
    }

    pub fn with_endpoint(api_key: String, from: String, endpoint: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(to, subject, "email sent");
                true
            }
            Ok(response) => {
                warn!(to, status = %response.status(), "email provider rejected message");
                false
            }
            Err(err) => {
                warn!(to, error = %err, "email send failed");
                false
            }
        }
    }
}

/// Stand-in used when no provider key is configured; drops everything.
pub struct NoopMailer;

#[async_trait]
impl EmailSender for NoopMailer {
    async fn send(&self, to: &str, _subject: &str, _html: &str) -> bool {
        warn!(to, "email delivery not configured; dropping message");
        false
    }
}

/// Test-support mailer that records every send instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    /// (to, subject) pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> bool {
        self.sent
            .lock()
            .expect("mailer lock poisoned")
            .push((to.to_owned(), subject.to_owned()));
        true
    }
}

/// Fire-and-forget notification dispatch. Each call returns immediately; the
/// actual send happens on a detached task whose outcome is only logged.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
    base_url: String,
}

impl Notifier {
    pub fn new(sender: Arc<dyn EmailSender>, base_url: String) -> Self {
        Self { sender, base_url }
    }

    fn tracking_url(&self, tracking_code: &str) -> String {
        format!("{}/track/{tracking_code}", self.base_url.trim_end_matches('/'))
    }

    fn dispatch(&self, to: String, subject: String, html: String) {
        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            if !sender.send(&to, &subject, &html).await {
                warn!(to, subject, "notification was not delivered");
            }
        });
    }

    pub fn submission_confirmed(&self, to: &str, name: &str, job_title: &str, tracking_code: &str) {
        let subject = format!("Application Received - {job_title}");
        let html = render_confirmation_email(name, job_title, &self.tracking_url(tracking_code));
        self.dispatch(to.to_owned(), subject, html);
    }

    pub fn status_changed(
        &self,
        to: &str,
        name: &str,
        job_title: &str,
        status: ApplicationStatus,
        tracking_code: &str,
    ) {
        let subject = format!("Application Update - {job_title}");
        let html =
            render_status_update_email(name, job_title, status, &self.tracking_url(tracking_code));
        self.dispatch(to.to_owned(), subject, html);
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn wrap_email(heading: &str, intro: &str, body: &str, cta_label: &str, cta_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 40px 20px; background-color: #f8fafc;">
  <div style="max-width: 500px; margin: 0 auto; background: white; border-radius: 8px; padding: 32px;">
    <h1 style="margin: 0 0 8px; font-size: 24px; color: #0f172a;">{heading}</h1>
    <p style="margin: 0 0 24px; color: #64748b; font-size: 14px;">{intro}</p>
    {body}
    <a href="{cta_url}" style="display: inline-block; background: #0f172a; color: white; text-decoration: none; padding: 12px 24px; border-radius: 9999px; font-size: 14px;">{cta_label}</a>
    <p style="margin: 24px 0 0; color: #94a3b8; font-size: 12px;">Or copy this link: {cta_url}</p>
  </div>
</body>
</html>"#
    )
}

/// Self-contained HTML for the submission confirmation.
pub fn render_confirmation_email(name: &str, job_title: &str, tracking_url: &str) -> String {
    let body = format!(
        "<p style=\"color: #334155; line-height: 1.6;\">Hi {},</p>\
         <p style=\"color: #334155; line-height: 1.6;\">We've received your application for the \
         <strong>{}</strong> position. Our team will review your profile and get back to you \
         within <strong>5-7 business days</strong>.</p>\
         <p style=\"color: #334155; line-height: 1.6;\">You can track your application status anytime:</p>",
        escape_html(name),
        escape_html(job_title),
    );

    wrap_email(
        "Application Received",
        "Thank you for applying",
        &body,
        "Track Application",
        tracking_url,
    )
}

fn status_copy(status: ApplicationStatus) -> (&'static str, &'static str) {
    match status {
        ApplicationStatus::Reviewing => (
            "Application Under Review",
            "Great news! Your application is now being reviewed by our team. We'll be in touch soon.",
        ),
        ApplicationStatus::Interviewed => (
            "Interview Stage",
            "Congratulations! You've moved to the interview stage. We'll reach out with next steps shortly.",
        ),
        ApplicationStatus::Hired => (
            "Congratulations!",
            "We're thrilled to offer you the position! We'll be sending more details soon.",
        ),
        ApplicationStatus::Rejected => (
            "Application Update",
            "Thank you for your interest. After careful consideration, we've decided to move forward \
             with other candidates. We encourage you to apply for future openings.",
        ),
        ApplicationStatus::New => (
            "Application Update",
            "Your application status has been updated.",
        ),
    }
}

/// Self-contained HTML for a status-change notification.
pub fn render_status_update_email(
    name: &str,
    job_title: &str,
    status: ApplicationStatus,
    tracking_url: &str,
) -> String {
    let (heading, message) = status_copy(status);
    let body = format!(
        "<p style=\"color: #334155; line-height: 1.6;\">Hi {},</p>\
         <p style=\"color: #334155; line-height: 1.6;\">{}</p>",
        escape_html(name),
        message,
    );

    wrap_email(heading, &escape_html(job_title), &body, "View Application Status", tracking_url)
}
