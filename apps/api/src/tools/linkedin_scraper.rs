//! LinkedIn scraping tool. The backend is pluggable behind `ProfileScraper`; the tool's
//! input/output schema stays fixed so a real backend needs no prompt or executor changes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

use crate::document::validation::is_http_url;
use crate::schema::registry::{SCRAPER_INPUT, SCRAPER_OUTPUT};
use crate::schema::Schema;
use crate::tools::{Tool, ToolError};

pub const TOOL_NAME: &str = "thirdPartyLinkedInScraper";

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("not a profile URL: {0}")]
    InvalidProfileUrl(String),

    /// Raised by network-backed scrapers; the stub never fails this way.
    #[allow(dead_code)]
    #[error("scraper backend unavailable: {0}")]
    Unavailable(String),
}

/// Source of a profile's current skills.
#[async_trait]
pub trait ProfileScraper: Send + Sync {
    async fn scrape_skills(&self, profile_url: &str) -> Result<Vec<String>, ScraperError>;
}

/// Placeholder backend. Returns a fixed skill list for any http(s) profile URL.
pub struct StubProfileScraper;

pub const STUB_SKILLS: &[&str] = &["TypeScript", "React", "JavaScript"];

#[async_trait]
impl ProfileScraper for StubProfileScraper {
    async fn scrape_skills(&self, profile_url: &str) -> Result<Vec<String>, ScraperError> {
        if !is_http_url(profile_url) {
            return Err(ScraperError::InvalidProfileUrl(profile_url.to_string()));
        }
        info!("Stub scraper called for {profile_url}");
        Ok(STUB_SKILLS.iter().map(|s| s.to_string()).collect())
    }
}

pub struct LinkedInScraperTool {
    backend: Arc<dyn ProfileScraper>,
}

impl LinkedInScraperTool {
    pub fn new(backend: Arc<dyn ProfileScraper>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for LinkedInScraperTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }

    fn description(&self) -> &'static str {
        "Scrapes data from a LinkedIn profile URL. Use this to get the current skills listed on the profile."
    }

    fn input_schema(&self) -> &'static Schema {
        &SCRAPER_INPUT
    }

    fn output_schema(&self) -> &'static Schema {
        &SCRAPER_OUTPUT
    }

    async fn call(&self, input: Value) -> Result<Value, ToolError> {
        let url = input["profileUrl"].as_str().unwrap_or_default();
        let skills = self
            .backend
            .scrape_skills(url)
            .await
            .map_err(|e| ToolError::Backend {
                tool: TOOL_NAME.to_string(),
                message: e.to_string(),
            })?;
        Ok(json!({ "skills": skills }))
    }
}
