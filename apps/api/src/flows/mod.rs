//! Flow Executor: runs one document-optimization operation end to end.
//!
//! Every operation goes through the same steps:
//! 1. validate the input against the operation's input schema, then run the flow's own checks
//! 2. render the prompt
//! 3. call the LLM (which may run the flow's tools mid-generation)
//! 4. parse the answer and validate/coerce it against the output schema
//! 5. let the flow reconcile the typed output, then return it
//!
//! There is no retry and no partial result: any failure returns a `FlowError`.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::{extract_json, CompletionRequest, LlmBackend};
use crate::schema::registry;
use crate::schema::Schema;
use crate::tools::linkedin_scraper::ProfileScraper;
use crate::tools::ToolRegistry;

pub mod ats;
pub mod cover_letter;
pub mod errors;
pub mod handlers;
pub mod keywords;
pub mod linkedin;
pub mod prompts;
pub mod resume_parse;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::FlowError;

use ats::{AtsFlow, AtsOptimizationRequest, AtsOptimizationResult};
use cover_letter::{
    CoverLetterGenerateFlow, CoverLetterGenerationRequest, CoverLetterOptimizationRequest,
    CoverLetterOptimizationResult, CoverLetterOptimizeFlow, GeneratedCoverLetter,
};
use linkedin::{LinkedInFlow, LinkedInOptimizationRequest, SkillGapResult};
use resume_parse::{ParseResumeRequest, ParsedDocument, ResumeParseFlow};

/// The five operations exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AtsResumeOptimization,
    CoverLetterOptimization,
    CoverLetterGeneration,
    LinkedInProfileOptimization,
    ResumeParsing,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::AtsResumeOptimization,
        Operation::CoverLetterOptimization,
        Operation::CoverLetterGeneration,
        Operation::LinkedInProfileOptimization,
        Operation::ResumeParsing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::AtsResumeOptimization => "atsResumeOptimization",
            Operation::CoverLetterOptimization => "coverLetterOptimization",
            Operation::CoverLetterGeneration => "coverLetterGeneration",
            Operation::LinkedInProfileOptimization => "linkedInProfileOptimization",
            Operation::ResumeParsing => "resumeParsing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn input_schema(self) -> &'static Schema {
        match self {
            Operation::AtsResumeOptimization => &registry::ATS_INPUT,
            Operation::CoverLetterOptimization => &registry::COVER_LETTER_OPTIMIZE_INPUT,
            Operation::CoverLetterGeneration => &registry::COVER_LETTER_GENERATE_INPUT,
            Operation::LinkedInProfileOptimization => &registry::LINKEDIN_INPUT,
            Operation::ResumeParsing => &registry::RESUME_PARSE_INPUT,
        }
    }

    pub fn output_schema(self) -> &'static Schema {
        match self {
            Operation::AtsResumeOptimization => &registry::ATS_OUTPUT,
            Operation::CoverLetterOptimization => &registry::COVER_LETTER_OPTIMIZE_OUTPUT,
            Operation::CoverLetterGeneration => &registry::COVER_LETTER_GENERATE_OUTPUT,
            Operation::LinkedInProfileOptimization => &registry::LINKEDIN_OUTPUT,
            Operation::ResumeParsing => &registry::RESUME_PARSE_OUTPUT,
        }
    }
}

/// Per-run settings handed to flows.
pub struct FlowContext {
    pub min_job_description_chars: usize,
    pub scraper: Arc<dyn ProfileScraper>,
}

/// One operation: its typed contract plus the hooks the executor calls in order.
pub trait Flow: Send + Sync {
    const OPERATION: Operation;
    type Input: Serialize + DeserializeOwned + Send + Sync;
    type Output: Serialize + DeserializeOwned + Send;

    /// Checks the schema cannot express. Runs before the prompt is rendered.
    fn check_input(&self, _input: &Self::Input, _ctx: &FlowContext) -> Result<(), FlowError> {
        Ok(())
    }

    /// Tools the model may call during this run.
    fn tools(&self, _ctx: &FlowContext) -> ToolRegistry {
        ToolRegistry::default()
    }

    fn build_request(&self, input: &Self::Input) -> Result<CompletionRequest, FlowError>;

    /// Adjusts the validated output using the input and the tool calls made.
    fn finish(
        &self,
        _input: &Self::Input,
        output: Self::Output,
        _tools: &ToolRegistry,
    ) -> Result<Self::Output, FlowError> {
        Ok(output)
    }
}

/// Stateless apart from its injected collaborators; cheap to clone and share.
#[derive(Clone)]
pub struct FlowExecutor {
    llm: Arc<dyn LlmBackend>,
    scraper: Arc<dyn ProfileScraper>,
    min_job_description_chars: usize,
}

impl FlowExecutor {
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        scraper: Arc<dyn ProfileScraper>,
        min_job_description_chars: usize,
    ) -> Self {
        Self {
            llm,
            scraper,
            min_job_description_chars,
        }
    }

    fn context(&self) -> FlowContext {
        FlowContext {
            min_job_description_chars: self.min_job_description_chars,
            scraper: Arc::clone(&self.scraper),
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Typed entry points
    // ────────────────────────────────────────────────────────────────────────

    pub async fn optimize_resume(
        &self,
        input: AtsOptimizationRequest,
    ) -> Result<AtsOptimizationResult, FlowError> {
        self.run(&AtsFlow, input).await
    }

    pub async fn optimize_cover_letter(
        &self,
        input: CoverLetterOptimizationRequest,
    ) -> Result<CoverLetterOptimizationResult, FlowError> {
        self.run(&CoverLetterOptimizeFlow, input).await
    }

    pub async fn generate_cover_letter(
        &self,
        input: CoverLetterGenerationRequest,
    ) -> Result<GeneratedCoverLetter, FlowError> {
        self.run(&CoverLetterGenerateFlow, input).await
    }

    pub async fn optimize_linkedin(
        &self,
        input: LinkedInOptimizationRequest,
    ) -> Result<SkillGapResult, FlowError> {
        self.run(&LinkedInFlow, input).await
    }

    pub async fn parse_resume(&self, input: ParseResumeRequest) -> Result<ParsedDocument, FlowError> {
        self.run(&ResumeParseFlow, input).await
    }

    /// Runs an operation by name on untyped JSON.
    pub async fn run_named(&self, operation: &str, input: Value) -> Result<Value, FlowError> {
        let op = Operation::from_name(operation)
            .ok_or_else(|| FlowError::UnknownOperation(operation.to_string()))?;
        match op {
            Operation::AtsResumeOptimization => to_json(self.run_value(&AtsFlow, input).await?),
            Operation::CoverLetterOptimization => {
                to_json(self.run_value(&CoverLetterOptimizeFlow, input).await?)
            }
            Operation::CoverLetterGeneration => {
                to_json(self.run_value(&CoverLetterGenerateFlow, input).await?)
            }
            Operation::LinkedInProfileOptimization => {
                to_json(self.run_value(&LinkedInFlow, input).await?)
            }
            Operation::ResumeParsing => to_json(self.run_value(&ResumeParseFlow, input).await?),
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Pipeline
    // ────────────────────────────────────────────────────────────────────────

    pub async fn run<F: Flow>(&self, flow: &F, input: F::Input) -> Result<F::Output, FlowError> {
        let value = serde_json::to_value(&input)
            .map_err(|e| FlowError::Validation(format!("Invalid input: {e}")))?;
        self.run_value(flow, value).await
    }

    pub async fn run_value<F: Flow>(&self, flow: &F, input: Value) -> Result<F::Output, FlowError> {
        let request_id = Uuid::new_v4();
        let operation = F::OPERATION.name();
        info!(%request_id, operation, "Flow started");

        let result = self.execute(flow, input).await;
        match &result {
            Ok(_) => info!(%request_id, operation, "Flow succeeded"),
            Err(e) => warn!(%request_id, operation, kind = e.kind(), "Flow failed: {e}"),
        }
        result
    }

    async fn execute<F: Flow>(&self, flow: &F, input: Value) -> Result<F::Output, FlowError> {
        let ctx = self.context();

        // Step 1: input schema, then flow-specific checks
        let input = F::OPERATION
            .input_schema()
            .validate_and_coerce(input)
            .map_err(FlowError::from_input_violation)?;
        let input: F::Input = serde_json::from_value(input)
            .map_err(|e| FlowError::Validation(format!("Invalid input: {e}")))?;
        flow.check_input(&input, &ctx)?;

        // Step 2: prompt
        let request = flow.build_request(&input)?;
        let tools = flow.tools(&ctx);

        // Step 3: LLM (tools run inside)
        let text = self.llm.complete(&request, &tools).await?;

        // Step 4: parse + validate
        let raw = extract_json(&text)
            .map_err(|e| FlowError::SchemaMismatch(format!("output is not JSON: {e}")))?;
        let coerced = F::OPERATION
            .output_schema()
            .validate_and_coerce(raw)
            .map_err(FlowError::from_output_violation)?;
        let output: F::Output = serde_json::from_value(coerced)
            .map_err(|e| FlowError::SchemaMismatch(e.to_string()))?;

        // Step 5: reconcile
        flow.finish(&input, output, &tools)
    }
}

fn to_json<T: Serialize>(output: T) -> Result<Value, FlowError> {
    serde_json::to_value(output).map_err(|e| FlowError::SchemaMismatch(e.to_string()))
}

/// Rejects job descriptions that are empty or too short to be meaningful.
pub fn check_job_description(job_description: &str, min_chars: usize) -> Result<(), FlowError> {
    let len = job_description.trim().chars().count();
    if len == 0 {
        return Err(FlowError::Validation(
            "Please paste a job description to get AI suggestions.".to_string(),
        ));
    }
    if len < min_chars {
        return Err(FlowError::Validation(format!(
            "The job description is too short ({len} characters). Paste at least {min_chars} characters."
        )));
    }
    Ok(())
}
