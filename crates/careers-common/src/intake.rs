//! Server-side intake validation and normalization.
//!
//! Client-side form checks are a UX nicety only; everything here runs again
//! on every submission. Violations are collected in full before failing so
//! the form can render per-field messages in one round trip.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use strum::EnumString;

use crate::api::application::{FieldErrors, SubmitApplication};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Which revision of the intake form is being served. The required-field set
/// has drifted across revisions, so it is configuration rather than code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FormVariant {
    /// name / email / portfolio link / cover note / weekly availability.
    Minimal,
    /// Adds phone, college, year, city, start timeline, a minimum-length
    /// experience summary, and an explicit commitment checkbox.
    Extended,
}

#[derive(Debug, Clone, Copy)]
pub struct IntakeConfig {
    pub variant: FormVariant,
    /// Minimum character count for the experience summary (extended variant).
    /// Observed thresholds are 50 and 100 depending on deployment.
    pub min_experience_chars: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            variant: FormVariant::Minimal,
            min_experience_chars: 50,
        }
    }
}

impl FromStr for IntakeConfig {
    type Err = strum::ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            variant: FormVariant::from_str(raw)?,
            ..Self::default()
        })
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn require(errors: &mut FieldErrors, field: &str, value: &Option<String>, message: &str) {
    if trimmed(value).is_none() {
        errors.insert(field.to_owned(), message.to_owned());
    }
}

/// Check every field the configured form variant requires and return the full
/// violation map. An empty map means the submission may proceed.
pub fn validate(config: &IntakeConfig, submission: &SubmitApplication) -> FieldErrors {
    let mut errors = FieldErrors::new();

    require(&mut errors, "name", &submission.name, "Name is required");

    match trimmed(&submission.email) {
        None => {
            errors.insert("email".into(), "Email is required".into());
        }
        Some(email) if !EMAIL_RE.is_match(email) => {
            errors.insert("email".into(), "Please enter a valid email address".into());
        }
        Some(_) => {}
    }

    require(
        &mut errors,
        "portfolioLink",
        &submission.portfolio_link,
        "Portfolio link is required",
    );
    require(&mut errors, "jobSlug", &submission.job_slug, "Job is required");

    match config.variant {
        FormVariant::Minimal => {
            require(
                &mut errors,
                "coverNote",
                &submission.motivation,
                "Cover note is required",
            );
            require(
                &mut errors,
                "weeklyAvailability",
                &submission.availability,
                "Weekly availability is required",
            );
        }
        FormVariant::Extended => {
            require(&mut errors, "phone", &submission.phone, "Phone number is required");
            require(
                &mut errors,
                "college",
                &submission.college,
                "College/Organization is required",
            );
            require(&mut errors, "year", &submission.year, "Year is required");
            require(
                &mut errors,
                "location",
                &submission.location,
                "Current location is required",
            );
            require(
                &mut errors,
                "availability",
                &submission.availability,
                "Availability is required",
            );
            require(
                &mut errors,
                "startTimeline",
                &submission.start_timeline,
                "Start timeline is required",
            );
            require(
                &mut errors,
                "resumeUrl",
                &submission.resume_url,
                "Resume link is required",
            );
            require(
                &mut errors,
                "motivation",
                &submission.motivation,
                "Motivation is required",
            );
            require(
                &mut errors,
                "problemInterest",
                &submission.problem_interest,
                "Problem interest is required",
            );

            match trimmed(&submission.experience_summary) {
                None => {
                    errors.insert(
                        "experienceSummary".into(),
                        "Experience summary is required".into(),
                    );
                }
                Some(summary) if summary.chars().count() < config.min_experience_chars => {
                    errors.insert(
                        "experienceSummary".into(),
                        format!(
                            "Experience summary must be at least {} characters",
                            config.min_experience_chars
                        ),
                    );
                }
                Some(_) => {}
            }

            if submission.commitment_confirmed != Some(true) {
                errors.insert(
                    "commitmentConfirmed".into(),
                    "You must confirm your commitment".into(),
                );
            }
        }
    }

    errors
}

/// A validated, normalized application ready for persistence. Construct only
/// after `validate` returned an empty map.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub name: String,
    /// Trimmed and lowercased; one half of the dedup identity.
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
    pub job_slug: String,
}

fn clean(value: &Option<String>) -> String {
    trimmed(value).unwrap_or_default().to_owned()
}

fn clean_opt(value: &Option<String>) -> Option<String> {
    trimmed(value).map(str::to_owned)
}

impl NewApplication {
    pub fn from_submission(submission: &SubmitApplication) -> Self {
        Self {
            name: clean(&submission.name),
            email: clean(&submission.email).to_lowercase(),
            phone: clean(&submission.phone),
            college: clean(&submission.college),
            year: clean(&submission.year),
            location: clean(&submission.location),
            availability: clean(&submission.availability),
            start_timeline: clean(&submission.start_timeline),
            portfolio_link: clean(&submission.portfolio_link),
            resume_url: clean_opt(&submission.resume_url),
            experience_summary: clean(&submission.experience_summary),
            motivation: clean(&submission.motivation),
            problem_interest: clean(&submission.problem_interest),
            exam_background: clean_opt(&submission.exam_background),
            teaching_experience: clean_opt(&submission.teaching_experience),
            commitment_confirmed: submission.commitment_confirmed.unwrap_or(false),
            referral_source: clean_opt(&submission.referral_source),
            job_slug: clean(&submission.job_slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_submission() -> SubmitApplication {
        SubmitApplication {
            name: Some("Jane Doe".into()),
            email: Some("JANE@Example.com ".into()),
            portfolio_link: Some("https://x.dev".into()),
            motivation: Some("I want to build this.".into()),
            availability: Some("10-20 hours".into()),
            job_slug: Some("frontend-engineer".into()),
            ..Default::default()
        }
    }

    fn extended_submission() -> SubmitApplication {
        SubmitApplication {
            phone: Some("+91 98765 43210".into()),
            college: Some("IIT Delhi".into()),
            year: Some("2026".into()),
            location: Some("Delhi".into()),
            start_timeline: Some("Immediately".into()),
            resume_url: Some("https://x.dev/resume.pdf".into()),
            experience_summary: Some("x".repeat(120)),
            problem_interest: Some("Access to education".into()),
            commitment_confirmed: Some(true),
            ..minimal_submission()
        }
    }

    #[test]
    fn minimal_variant_accepts_a_complete_submission() {
        let errors = validate(&IntakeConfig::default(), &minimal_submission());
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn all_violations_are_collected_at_once() {
        let errors = validate(&IntakeConfig::default(), &SubmitApplication::default());
        let fields: Vec<&str> = errors.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            fields,
            ["coverNote", "email", "jobSlug", "name", "portfolioLink", "weeklyAvailability"]
        );
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        let submission = SubmitApplication {
            name: Some("   ".into()),
            ..minimal_submission()
        };
        let errors = validate(&IntakeConfig::default(), &submission);
        assert_eq!(errors.get("name").map(String::as_str), Some("Name is required"));
    }

    #[test]
    fn email_shape_is_enforced() {
        for bad in ["jane", "jane@", "@example.com", "jane@example", "a b@example.com"] {
            let submission = SubmitApplication {
                email: Some(bad.into()),
                ..minimal_submission()
            };
            let errors = validate(&IntakeConfig::default(), &submission);
            assert!(errors.contains_key("email"), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn extended_variant_requires_the_richer_field_set() {
        let config = IntakeConfig {
            variant: FormVariant::Extended,
            min_experience_chars: 50,
        };

        let errors = validate(&config, &minimal_submission());
        for field in [
            "phone",
            "college",
            "year",
            "location",
            "startTimeline",
            "resumeUrl",
            "experienceSummary",
            "problemInterest",
            "commitmentConfirmed",
        ] {
            assert!(errors.contains_key(field), "missing violation for {field}");
        }

        assert!(validate(&config, &extended_submission()).is_empty());
    }

    #[test]
    fn experience_summary_minimum_is_configurable() {
        let mut config = IntakeConfig {
            variant: FormVariant::Extended,
            min_experience_chars: 100,
        };
        let mut submission = extended_submission();
        submission.experience_summary = Some("y".repeat(80));

        let errors = validate(&config, &submission);
        assert!(errors
            .get("experienceSummary")
            .is_some_and(|msg| msg.contains("100")));

        config.min_experience_chars = 50;
        assert!(validate(&config, &submission).is_empty());
    }

    #[test]
    fn commitment_must_be_explicitly_true() {
        let config = IntakeConfig {
            variant: FormVariant::Extended,
            min_experience_chars: 50,
        };
        for value in [None, Some(false)] {
            let submission = SubmitApplication {
                commitment_confirmed: value,
                ..extended_submission()
            };
            assert!(validate(&config, &submission).contains_key("commitmentConfirmed"));
        }
    }

    #[test]
    fn normalization_trims_and_lowercases_the_email() {
        let normalized = NewApplication::from_submission(&minimal_submission());
        assert_eq!(normalized.email, "jane@example.com");
        assert_eq!(normalized.name, "Jane Doe");
        assert!(normalized.resume_url.is_none());
        assert!(!normalized.commitment_confirmed);
    }

    #[test]
    fn form_variant_parses_from_config_strings() {
        assert_eq!(
            "minimal".parse::<IntakeConfig>().unwrap().variant,
            FormVariant::Minimal
        );
        assert_eq!(
            "extended".parse::<IntakeConfig>().unwrap().variant,
            FormVariant::Extended
        );
        assert!("richest".parse::<IntakeConfig>().is_err());
    }
}
