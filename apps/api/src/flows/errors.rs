use thiserror::Error;

use crate::document::data_uri::DataUriError;
use crate::llm_client::LlmError;
use crate::schema::SchemaViolation;

/// Everything a flow run can fail with. Each error is scoped to the request that produced it.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Bad or missing input. Fix the input; retrying will not help.
    #[error("{0}")]
    Validation(String),

    /// Provider, network or tool failure, or timeout. Retry later.
    #[error("LLM provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The model's answer did not fit the declared output schema.
    #[error("LLM output did not match schema: {0}")]
    SchemaMismatch(String),

    /// A nested document came back as a string that is not valid JSON.
    #[error("LLM returned a malformed nested payload in '{field}': {message}")]
    MalformedNestedPayload { field: String, message: String },

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
}

impl FlowError {
    /// Stable code for logs and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            FlowError::Validation(_) => "VALIDATION_ERROR",
            FlowError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            FlowError::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            FlowError::MalformedNestedPayload { .. } => "MALFORMED_NESTED_PAYLOAD",
            FlowError::UnknownOperation(_) => "UNKNOWN_OPERATION",
        }
    }

    /// Maps a violation of an output schema.
    pub fn from_output_violation(violation: SchemaViolation) -> Self {
        match violation {
            SchemaViolation::NestedPayload { path, message } => {
                FlowError::MalformedNestedPayload { field: path, message }
            }
            other => FlowError::SchemaMismatch(other.to_string()),
        }
    }

    /// Maps a violation of an input schema.
    pub fn from_input_violation(violation: SchemaViolation) -> Self {
        FlowError::Validation(format!("Invalid input: {violation}"))
    }
}

impl From<LlmError> for FlowError {
    fn from(e: LlmError) -> Self {
        match e {
            // The model answered, but not with anything we can read.
            LlmError::EmptyContent | LlmError::Parse(_) => FlowError::SchemaMismatch(e.to_string()),
            LlmError::Http(_)
            | LlmError::Timeout(_)
            | LlmError::Api { .. }
            | LlmError::Tool { .. }
            | LlmError::ToolLoopExceeded { .. } => FlowError::UpstreamUnavailable(e.to_string()),
        }
    }
}

impl From<DataUriError> for FlowError {
    fn from(e: DataUriError) -> Self {
        FlowError::Validation(e.to_string())
    }
}
