//! Cover letter flows: optimizing a draft against a job description, and writing a new
//! letter from scratch in a chosen tone.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::CoverLetterDraft;
use crate::flows::keywords::{ensure_gap_suggestions, keyword_gaps};
use crate::flows::prompts::{
    COVER_LETTER_GENERATE_PROMPT_TEMPLATE, COVER_LETTER_GENERATE_SYSTEM,
    COVER_LETTER_OPTIMIZE_PROMPT_TEMPLATE, COVER_LETTER_OPTIMIZE_SYSTEM,
};
use crate::flows::{check_job_description, Flow, FlowContext, FlowError, Operation};
use crate::llm_client::prompts::{output_contract, render};
use crate::llm_client::CompletionRequest;
use crate::schema::registry::{COVER_LETTER_GENERATE_OUTPUT, COVER_LETTER_OPTIMIZE_OUTPUT};
use crate::tools::ToolRegistry;

// ────────────────────────────────────────────────────────────────────────────
// Optimize
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterOptimizationRequest {
    pub cover_letter_text: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterOptimizationResult {
    pub optimized_cover_letter: CoverLetterDraft,
    pub suggestions: Vec<String>,
    pub match_score: u8,
}

pub struct CoverLetterOptimizeFlow;

impl Flow for CoverLetterOptimizeFlow {
    const OPERATION: Operation = Operation::CoverLetterOptimization;
    type Input = CoverLetterOptimizationRequest;
    type Output = CoverLetterOptimizationResult;

    fn check_input(&self, input: &Self::Input, ctx: &FlowContext) -> Result<(), FlowError> {
        if input.cover_letter_text.trim().is_empty() {
            return Err(FlowError::Validation(
                "Please write a cover letter draft before optimizing.".to_string(),
            ));
        }
        check_job_description(&input.job_description, ctx.min_job_description_chars)
    }

    fn build_request(&self, input: &Self::Input) -> Result<CompletionRequest, FlowError> {
        let contract = output_contract(&COVER_LETTER_OPTIMIZE_OUTPUT);
        let prompt = render(
            COVER_LETTER_OPTIMIZE_PROMPT_TEMPLATE,
            &[
                ("cover_letter_text", input.cover_letter_text.as_str()),
                ("job_description", input.job_description.as_str()),
                ("output_contract", contract.as_str()),
            ],
        );
        Ok(CompletionRequest {
            system: COVER_LETTER_OPTIMIZE_SYSTEM.to_string(),
            prompt,
            attachment: None,
        })
    }

    fn finish(
        &self,
        input: &Self::Input,
        mut output: Self::Output,
        _tools: &ToolRegistry,
    ) -> Result<Self::Output, FlowError> {
        let gaps = keyword_gaps(&input.cover_letter_text, &input.job_description);
        let added = ensure_gap_suggestions(&mut output.suggestions, &gaps, "cover letter");
        if added > 0 {
            info!("Added {added} keyword suggestion(s) the model left out");
        }
        Ok(output)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Enthusiastic,
    Formal,
    Conversational,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Formal => "formal",
            Tone::Conversational => "conversational",
        }
    }

    /// Style guidance given to the model for this tone.
    pub fn guidance(self) -> &'static str {
        match self {
            Tone::Professional => {
                "Confident and clear. Lead with results; avoid slang and exclamation marks."
            }
            Tone::Enthusiastic => {
                "Energetic and warm. Show genuine excitement about the company's mission, \
                 but keep every claim specific."
            }
            Tone::Formal => {
                "Traditional business correspondence. Complete sentences, no contractions, \
                 measured language."
            }
            Tone::Conversational => {
                "Friendly and direct, as if writing to a colleague. Contractions are fine; \
                 keep it focused."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterGenerationRequest {
    pub job_description: String,
    pub tone: Tone,
    pub your_name: String,
    pub company_name: String,
    #[serde(default)]
    pub hiring_manager: String,
}

impl CoverLetterGenerationRequest {
    fn salutation(&self) -> String {
        match self.hiring_manager.trim() {
            "" => "Dear Hiring Manager,".to_string(),
            name => format!("Dear {name},"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCoverLetter {
    pub cover_letter: String,
}

pub struct CoverLetterGenerateFlow;

impl Flow for CoverLetterGenerateFlow {
    const OPERATION: Operation = Operation::CoverLetterGeneration;
    type Input = CoverLetterGenerationRequest;
    type Output = GeneratedCoverLetter;

    fn check_input(&self, input: &Self::Input, ctx: &FlowContext) -> Result<(), FlowError> {
        if input.your_name.trim().is_empty() {
            return Err(FlowError::Validation("Your name is required.".to_string()));
        }
        if input.company_name.trim().is_empty() {
            return Err(FlowError::Validation("Company name is required.".to_string()));
        }
        check_job_description(&input.job_description, ctx.min_job_description_chars)
    }

    fn build_request(&self, input: &Self::Input) -> Result<CompletionRequest, FlowError> {
        let contract = output_contract(&COVER_LETTER_GENERATE_OUTPUT);
        let salutation = input.salutation();
        let prompt = render(
            COVER_LETTER_GENERATE_PROMPT_TEMPLATE,
            &[
                ("your_name", input.your_name.trim()),
                ("company_name", input.company_name.trim()),
                ("job_description", input.job_description.as_str()),
                ("tone", input.tone.as_str()),
                ("tone_guidance", input.tone.guidance()),
                ("salutation", salutation.as_str()),
                ("output_contract", contract.as_str()),
            ],
        );
        Ok(CompletionRequest {
            system: COVER_LETTER_GENERATE_SYSTEM.to_string(),
            prompt,
            attachment: None,
        })
    }

    fn finish(
        &self,
        _input: &Self::Input,
        output: Self::Output,
        _tools: &ToolRegistry,
    ) -> Result<Self::Output, FlowError> {
        if output.cover_letter.trim().is_empty() {
            return Err(FlowError::SchemaMismatch("coverLetter is empty".to_string()));
        }
        Ok(output)
    }
}
