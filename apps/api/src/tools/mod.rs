//! Tool Invocation: schema-typed callables the model may invoke mid-generation.
//!
//! The LLM client owns the suspend/resume around a tool call; this module only supplies
//! declarations and the implementations. A `ToolRegistry` is built per flow run, so the
//! call log it keeps is never shared between requests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::schema::{Schema, SchemaViolation};

pub mod linkedin_scraper;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    Unknown(String),

    #[error("invalid input for tool '{tool}': {source}")]
    InvalidInput {
        tool: String,
        #[source]
        source: SchemaViolation,
    },

    #[error("tool '{tool}' produced invalid output: {source}")]
    InvalidOutput {
        tool: String,
        #[source]
        source: SchemaViolation,
    },

    #[error("tool '{tool}' failed: {message}")]
    Backend { tool: String, message: String },
}

/// A tool the model can call. Input and output are validated against the declared schemas
/// by the registry, so implementations can assume well-formed input.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> &'static Schema;
    fn output_schema(&self) -> &'static Schema;
    async fn call(&self, input: Value) -> Result<Value, ToolError>;
}

/// What the LLM provider needs to advertise a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// One completed tool call, as seen by the flow after generation finishes.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub tool: String,
    pub input: Value,
    pub output: Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    calls: Mutex<Vec<ToolCallRecord>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            tools,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools
            .iter()
            .map(|t| ToolDeclaration {
                name: t.name(),
                description: t.description(),
                input_schema: t.input_schema().json_schema(),
            })
            .collect()
    }

    /// Validates input, runs the tool, validates output, and records the call.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))?;

        let input = tool
            .input_schema()
            .validate_and_coerce(input)
            .map_err(|source| ToolError::InvalidInput {
                tool: name.to_string(),
                source,
            })?;

        info!("Invoking tool {name}");
        let output = tool.call(input.clone()).await?;

        let output = tool
            .output_schema()
            .validate_and_coerce(output)
            .map_err(|source| ToolError::InvalidOutput {
                tool: name.to_string(),
                source,
            })?;

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(ToolCallRecord {
                tool: name.to_string(),
                input,
                output: output.clone(),
            });
        }

        Ok(output)
    }

    /// Calls completed so far, in invocation order.
    pub fn calls(&self) -> Vec<ToolCallRecord> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}
