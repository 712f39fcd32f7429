//! LLM Client: the single point of entry for all Claude API calls in Creda.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! Flows depend on the `LlmBackend` trait; `LlmClient` is the production implementation.
//!
//! The client owns the tool-use loop: when the model stops with `tool_use`, the requested
//! tools run through the flow's `ToolRegistry`, results are fed back, and generation resumes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::tools::{ToolDeclaration, ToolRegistry};

pub mod prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
/// Upper bound on model ↔ tool round trips within one completion.
const MAX_TOOL_ROUNDS: u32 = 4;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Tool '{name}' failed: {message}")]
    Tool { name: String, message: String },

    #[error("Model kept requesting tools after {rounds} rounds")]
    ToolLoopExceeded { rounds: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Document {
        source: DocumentSource,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    /// Block types this client does not use (e.g. thinking); skipped.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentSource {
    Base64 { media_type: String, data: String },
    Text { media_type: String, data: String },
}

#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [AnthropicMessage],
    #[serde(skip_serializing_if = "<[ToolDeclaration]>::is_empty")]
    tools: &'a [ToolDeclaration],
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates all text blocks. `None` when the response carries no text.
    pub fn text(&self) -> Option<String> {
        let text: Vec<&str> = self
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if text.iter().all(|t| t.trim().is_empty()) {
            None
        } else {
            Some(text.join("\n"))
        }
    }

    fn wants_tools(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Backend trait
// ────────────────────────────────────────────────────────────────────────────

/// A file attached to the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Base64-encoded PDF bytes.
    Pdf { base64: String },
    PlainText { text: String },
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub attachment: Option<Attachment>,
}

/// Anything that can turn a prompt into the model's final text, running tools on the way.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
        tools: &ToolRegistry,
    ) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic implementation
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Anthropic Messages API. One request per model turn; no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key: config.anthropic_api_key.clone(),
            model: config.llm_model.clone(),
            endpoint: format!("{}/v1/messages", config.llm_base_url.trim_end_matches('/')),
            timeout: config.llm_timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a single call to the Messages API.
    async fn send(
        &self,
        system: &str,
        messages: &[AnthropicMessage],
        tools: &[ToolDeclaration],
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages,
            tools,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;
        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}, stop_reason={:?}",
            llm_response.usage.input_tokens,
            llm_response.usage.output_tokens,
            llm_response.stop_reason
        );
        Ok(llm_response)
    }

    async fn converse(
        &self,
        request: &CompletionRequest,
        tools: &ToolRegistry,
    ) -> Result<String, LlmError> {
        let declarations = tools.declarations();
        let mut messages = vec![AnthropicMessage {
            role: "user",
            content: initial_content(request),
        }];

        for round in 0..=MAX_TOOL_ROUNDS {
            let response = self.send(&request.system, &messages, &declarations).await?;

            if !response.wants_tools() {
                return response.text().ok_or(LlmError::EmptyContent);
            }
            if round == MAX_TOOL_ROUNDS {
                break;
            }

            let mut results = Vec::new();
            for block in &response.content {
                if let ContentBlock::ToolUse { id, name, input } = block {
                    let output = tools.invoke(name, input.clone()).await.map_err(|e| {
                        LlmError::Tool {
                            name: name.clone(),
                            message: e.to_string(),
                        }
                    })?;
                    results.push(ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content: output.to_string(),
                    });
                }
            }
            if results.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            info!("Resuming generation after {} tool call(s)", results.len());

            messages.push(AnthropicMessage {
                role: "assistant",
                content: response
                    .content
                    .into_iter()
                    .filter(|b| *b != ContentBlock::Unsupported)
                    .collect(),
            });
            messages.push(AnthropicMessage {
                role: "user",
                content: results,
            });
        }

        Err(LlmError::ToolLoopExceeded {
            rounds: MAX_TOOL_ROUNDS,
        })
    }
}

#[async_trait]
impl LlmBackend for LlmClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
        tools: &ToolRegistry,
    ) -> Result<String, LlmError> {
        tokio::time::timeout(self.timeout, self.converse(request, tools))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
    }
}

fn initial_content(request: &CompletionRequest) -> Vec<ContentBlock> {
    let mut content = Vec::with_capacity(2);
    match &request.attachment {
        Some(Attachment::Pdf { base64 }) => content.push(ContentBlock::Document {
            source: DocumentSource::Base64 {
                media_type: "application/pdf".to_string(),
                data: base64.clone(),
            },
        }),
        Some(Attachment::PlainText { text }) => content.push(ContentBlock::Document {
            source: DocumentSource::Text {
                media_type: "text/plain".to_string(),
                data: text.clone(),
            },
        }),
        None => {}
    }
    content.push(ContentBlock::Text {
        text: request.prompt.clone(),
    });
    content
}

// ────────────────────────────────────────────────────────────────────────────
// Output helpers
// ────────────────────────────────────────────────────────────────────────────

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Parses the model's final text as a JSON value. Falls back to the outermost `{...}` span
/// when the model wraps the object in prose.
pub fn extract_json(text: &str) -> Result<Value, serde_json::Error> {
    let text = strip_json_fences(text);
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(e) => match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&text[start..=end]),
            _ => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::tools::linkedin_scraper::{
        LinkedInScraperTool, ProfileScraper, ScraperError, StubProfileScraper, TOOL_NAME,
    };

    fn client_for(server: &MockServer, timeout: Duration) -> LlmClient {
        let mut config = Config::for_tests(&server.uri());
        config.llm_timeout = timeout;
        LlmClient::new(&config).unwrap()
    }

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            system: "system".into(),
            prompt: prompt.into(),
            attachment: None,
        }
    }

    fn text_response(text: &str) -> Value {
        json!({
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    fn scraper_registry(backend: Arc<dyn ProfileScraper>) -> ToolRegistry {
        ToolRegistry::new(vec![Arc::new(LinkedInScraperTool::new(backend))])
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_from_prose() {
        let v = extract_json("Here you go:\n{\"atsScore\": 80}\nGood luck!").unwrap();
        assert_eq!(v, json!({"atsScore": 80}));
        assert!(extract_json("no json here").is_err());
    }

    #[test]
    fn test_unknown_block_types_deserialize() {
        let resp: LlmResponse = serde_json::from_value(json!({
            "content": [{"type": "thinking", "thinking": "..."}, {"type": "text", "text": "ok"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }))
        .unwrap();
        assert_eq!(resp.content[0], ContentBlock::Unsupported);
        assert_eq!(resp.text().as_deref(), Some("ok"));
    }

    #[test]
    fn test_pdf_attachment_precedes_prompt() {
        let mut req = request("parse this");
        req.attachment = Some(Attachment::Pdf { base64: "JVBERi0=".into() });
        let content = initial_content(&req);
        assert_eq!(content.len(), 2);
        assert!(matches!(
            &content[0],
            ContentBlock::Document { source: DocumentSource::Base64 { media_type, .. } } if media_type == "application/pdf"
        ));
        assert_eq!(content[1], ContentBlock::Text { text: "parse this".into() });
    }

    #[tokio::test]
    async fn test_complete_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("{\"ok\": true}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let text = client
            .complete(&request("hello"), &ToolRegistry::default())
            .await
            .unwrap();
        assert_eq!(text, "{\"ok\": true}");
    }

    #[tokio::test]
    async fn test_tool_use_round_trip() {
        let server = MockServer::start().await;

        // Registered first so it wins once the tool result is in the conversation.
        Mock::given(method("POST"))
            .and(body_string_contains("tool_result"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response("{\"missingSkills\": [\"Go\"]}")),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(body_string_contains(TOOL_NAME))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "text", "text": "Let me look at the profile."},
                    {"type": "tool_use", "id": "toolu_01", "name": TOOL_NAME,
                     "input": {"profileUrl": "https://www.linkedin.com/in/example"}}
                ],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 10, "output_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let registry = scraper_registry(Arc::new(StubProfileScraper));
        let text = client.complete(&request("optimize"), &registry).await.unwrap();

        assert_eq!(text, "{\"missingSkills\": [\"Go\"]}");
        let calls = registry.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].output["skills"], json!(["TypeScript", "React", "JavaScript"]));
    }

    struct Broken;

    #[async_trait]
    impl ProfileScraper for Broken {
        async fn scrape_skills(&self, _profile_url: &str) -> Result<Vec<String>, ScraperError> {
            Err(ScraperError::Unavailable("upstream 503".into()))
        }
    }

    #[tokio::test]
    async fn test_tool_failure_aborts_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "tool_use", "id": "toolu_01", "name": TOOL_NAME,
                             "input": {"profileUrl": "https://www.linkedin.com/in/example"}}],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 1, "output_tokens": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client
            .complete(&request("optimize"), &scraper_registry(Arc::new(Broken)))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Tool { ref name, .. } if name == TOOL_NAME));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"error": {"type": "overloaded_error", "message": "Overloaded"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client
            .complete(&request("hello"), &ToolRegistry::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, ref message } if message == "Overloaded"));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        let err = client
            .complete(&request("hello"), &ToolRegistry::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_empty_text_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("   ")))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client
            .complete(&request("hello"), &ToolRegistry::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
