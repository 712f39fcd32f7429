//! Document Model: the editable resume and cover-letter drafts.
//!
//! Drafts are request-scoped. Flows never mutate a draft; callers merge a flow result into a
//! copy (`apply_optimized_summary`). Every field defaults to empty so partially filled JSON
//! deserializes instead of failing.

use serde::{Deserialize, Serialize};

pub mod data_uri;
pub mod validation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub dates: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub degree: String,
    pub school: String,
    pub dates: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateEntry {
    pub name: String,
    pub issuer: String,
    pub date: String,
}

/// A resume as edited in the builder form.
///
/// `skills` is kept as the raw comma-delimited string the user typed; use `skill_list()` to read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub website: String,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certificates: Vec<CertificateEntry>,
    pub skills: String,
}

/// Experience line on a cover letter: only title and company are shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleEntry {
    pub title: String,
    pub company: String,
}

/// A cover letter as edited in the form. `summary` holds the letter body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverLetterDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub summary: String,
    pub experience: Vec<RoleEntry>,
}

/// Shared behaviour of the two draft kinds: the text form sent for optimization and the
/// summary merge applied to the answer.
pub trait Draft: Serialize + for<'de> Deserialize<'de> + Clone {
    fn summary(&self) -> &str;
    fn set_summary(&mut self, summary: String);

    /// The text form sent to the LLM as `resumeText` / `coverLetterText`.
    fn to_text(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Returns a copy with only the summary taken from `optimized`, when it carries a non-empty
    /// one. Structural lists are left for manual edits.
    fn apply_optimized_summary(&self, optimized: &Self) -> Self {
        let mut next = self.clone();
        let summary = optimized.summary().trim();
        if !summary.is_empty() {
            next.set_summary(summary.to_string());
        }
        next
    }
}

impl Draft for DocumentDraft {
    fn summary(&self) -> &str {
        &self.summary
    }

    fn set_summary(&mut self, summary: String) {
        self.summary = summary;
    }
}

impl Draft for CoverLetterDraft {
    fn summary(&self) -> &str {
        &self.summary
    }

    fn set_summary(&mut self, summary: String) {
        self.summary = summary;
    }
}

impl DocumentDraft {
    /// Skills split on commas, trimmed, empty segments skipped.
    pub fn skill_list(&self) -> Vec<&str> {
        split_skills(&self.skills)
    }
}

pub fn split_skills(skills: &str) -> Vec<&str> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
