use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Application configuration loaded from environment variables.
/// Startup fails if the LLM credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_timeout: Duration,
    /// Minimum trimmed length of a job description before any flow is invoked.
    pub min_job_description_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_timeout: Duration::from_secs(
                optional_env("LLM_TIMEOUT_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            min_job_description_chars: optional_env("MIN_JOB_DESCRIPTION_CHARS")
                .unwrap_or_else(|| "50".to_string())
                .parse::<usize>()
                .context("MIN_JOB_DESCRIPTION_CHARS must be a non-negative integer")?,
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Fixed configuration for tests; never reads the environment.
    #[cfg(test)]
    pub fn for_tests(base_url: &str) -> Self {
        Config {
            anthropic_api_key: "test-key".to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            llm_base_url: base_url.to_string(),
            llm_timeout: Duration::from_secs(5),
            min_job_description_chars: 50,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    let value =
        std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
