//! Form-level validation for drafts. All violations are collected, not just the first.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::document::{CoverLetterDraft, DocumentDraft};

const MIN_SUMMARY_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field path, e.g. `experience[1].company`.
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftValidationResult {
    pub valid: bool,
    pub violations: Vec<FieldViolation>,
}

#[derive(Default)]
struct Collector {
    violations: Vec<FieldViolation>,
}

impl Collector {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    fn required(&mut self, field: impl Into<String>, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    fn optional_url(&mut self, field: impl Into<String>, value: &str) {
        if !value.trim().is_empty() && !is_http_url(value) {
            self.push(field, "Invalid URL");
        }
    }

    fn finish(self) -> DraftValidationResult {
        DraftValidationResult {
            valid: self.violations.is_empty(),
            violations: self.violations,
        }
    }
}

pub fn validate_resume(draft: &DocumentDraft) -> DraftValidationResult {
    let mut c = Collector::default();

    c.required("fullName", &draft.full_name, "Full name is required");
    if !is_email(&draft.email) {
        c.push("email", "Invalid email address");
    }
    c.required("phone", &draft.phone, "Phone number is required");
    c.optional_url("linkedin", &draft.linkedin);
    c.optional_url("website", &draft.website);
    if draft.summary.trim().chars().count() < MIN_SUMMARY_CHARS {
        c.push("summary", "Summary is too short");
    }

    for (i, e) in draft.experience.iter().enumerate() {
        c.required(format!("experience[{i}].title"), &e.title, "Job title is required");
        c.required(format!("experience[{i}].company"), &e.company, "Company name is required");
        c.required(format!("experience[{i}].dates"), &e.dates, "Dates are required");
        c.required(
            format!("experience[{i}].description"),
            &e.description,
            "Description is required",
        );
    }
    for (i, e) in draft.education.iter().enumerate() {
        c.required(format!("education[{i}].degree"), &e.degree, "Degree is required");
        c.required(format!("education[{i}].school"), &e.school, "School name is required");
        c.required(format!("education[{i}].dates"), &e.dates, "Dates are required");
    }
    for (i, p) in draft.projects.iter().enumerate() {
        c.required(format!("projects[{i}].name"), &p.name, "Project name is required");
        c.required(
            format!("projects[{i}].description"),
            &p.description,
            "Description is required",
        );
        c.optional_url(format!("projects[{i}].url"), &p.url);
    }
    for (i, cert) in draft.certificates.iter().enumerate() {
        c.required(format!("certificates[{i}].name"), &cert.name, "Certificate name is required");
        c.required(format!("certificates[{i}].issuer"), &cert.issuer, "Issuer is required");
        c.required(format!("certificates[{i}].date"), &cert.date, "Date is required");
    }

    if draft.skill_list().is_empty() {
        c.push("skills", "Skills are required");
    }

    c.finish()
}

pub fn validate_cover_letter(draft: &CoverLetterDraft) -> DraftValidationResult {
    let mut c = Collector::default();

    c.required("fullName", &draft.full_name, "Full name is required");
    if !is_email(&draft.email) {
        c.push("email", "Invalid email address");
    }
    c.required("phone", &draft.phone, "Phone number is required");
    c.optional_url("linkedin", &draft.linkedin);
    if draft.summary.trim().chars().count() < MIN_SUMMARY_CHARS {
        c.push("summary", "Body of the cover letter is too short");
    }
    for (i, r) in draft.experience.iter().enumerate() {
        c.required(format!("experience[{i}].title"), &r.title, "Job title is required");
        c.required(format!("experience[{i}].company"), &r.company, "Company name is required");
    }

    c.finish()
}

lazy_static! {
    /// HTML5 "valid email address", tightened to require a dotted domain.
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    )
    .expect("email pattern compiles");
}

const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https"];

/// Well-formed address; deliverability is not checked.
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Absolute http(s) URL with a real host.
pub fn is_http_url(value: &str) -> bool {
    let Ok(url) = Url::parse(value.trim()) else {
        return false;
    };
    if !ALLOWED_URL_SCHEMES.contains(&url.scheme()) {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => domain.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        }),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}
