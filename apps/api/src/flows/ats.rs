use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::DocumentDraft;
use crate::flows::keywords::{ensure_gap_suggestions, keyword_gaps};
use crate::flows::prompts::{ATS_PROMPT_TEMPLATE, ATS_SYSTEM};
use crate::flows::{check_job_description, Flow, FlowContext, FlowError, Operation};
use crate::llm_client::prompts::{output_contract, render};
use crate::llm_client::CompletionRequest;
use crate::schema::registry::ATS_OUTPUT;
use crate::tools::ToolRegistry;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsOptimizationRequest {
    /// The resume, usually the pretty JSON form of a `DocumentDraft`.
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsOptimizationResult {
    pub optimized_resume: DocumentDraft,
    pub suggestions: Vec<String>,
    pub ats_score: u8,
}

pub struct AtsFlow;

impl Flow for AtsFlow {
    const OPERATION: Operation = Operation::AtsResumeOptimization;
    type Input = AtsOptimizationRequest;
    type Output = AtsOptimizationResult;

    fn check_input(&self, input: &Self::Input, ctx: &FlowContext) -> Result<(), FlowError> {
        if input.resume_text.trim().is_empty() {
            return Err(FlowError::Validation(
                "Please add some content to your resume before optimizing.".to_string(),
            ));
        }
        check_job_description(&input.job_description, ctx.min_job_description_chars)
    }

    fn build_request(&self, input: &Self::Input) -> Result<CompletionRequest, FlowError> {
        let contract = output_contract(&ATS_OUTPUT);
        let prompt = render(
            ATS_PROMPT_TEMPLATE,
            &[
                ("resume_text", input.resume_text.as_str()),
                ("job_description", input.job_description.as_str()),
                ("output_contract", contract.as_str()),
            ],
        );
        Ok(CompletionRequest {
            system: ATS_SYSTEM.to_string(),
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
        let gaps = keyword_gaps(&input.resume_text, &input.job_description);
        let added = ensure_gap_suggestions(&mut output.suggestions, &gaps, "resume");
        if added > 0 {
            info!("Added {added} keyword suggestion(s) the model left out");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::document::tests::sample_draft;
    use crate::document::Draft;
    use crate::flows::testing::{executor, long_jd, Reply, ScriptedLlm};

    fn answer(resume: serde_json::Value, score: serde_json::Value) -> String {
        json!({
            "optimizedResume": resume,
            "suggestions": ["Quantify the impact of your React work."],
            "atsScore": score
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_missing_kubernetes_is_always_suggested() {
        let draft = sample_draft();
        let optimized = serde_json::to_value(&draft).unwrap();
        let llm = ScriptedLlm::new(vec![Reply::Text(answer(optimized, json!(72)))]);

        let result = executor(&llm)
            .optimize_resume(AtsOptimizationRequest {
                resume_text: draft.to_text(),
                job_description: long_jd("TypeScript, React and Kubernetes"),
            })
            .await
            .unwrap();

        assert_eq!(result.ats_score, 72);
        assert!(result.suggestions.iter().any(|s| s.contains("Kubernetes")));
        assert!(result.ats_score <= 100);
    }

    #[tokio::test]
    async fn test_score_is_clamped_and_resume_tolerates_missing_fields() {
        let llm = ScriptedLlm::new(vec![Reply::Text(answer(
            json!({"fullName": "Jane Doe", "summary": "Engineer."}),
            json!("140"),
        ))]);

        let result = executor(&llm)
            .optimize_resume(AtsOptimizationRequest {
                resume_text: "Jane Doe, engineer".into(),
                job_description: long_jd("Rust"),
            })
            .await
            .unwrap();

        assert_eq!(result.ats_score, 100);
        assert_eq!(result.optimized_resume.full_name, "Jane Doe");
        assert_eq!(result.optimized_resume.linkedin, "");
        assert!(result.optimized_resume.experience.is_empty());
    }

    #[tokio::test]
    async fn test_optimized_resume_as_json_string_is_reparsed() {
        let nested = json!({"fullName": "Jane Doe", "skills": "Rust"}).to_string();
        let llm = ScriptedLlm::new(vec![Reply::Text(answer(json!(nested), json!(80)))]);

        let result = executor(&llm)
            .optimize_resume(AtsOptimizationRequest {
                resume_text: "Jane Doe. Rust.".into(),
                job_description: long_jd("Rust"),
            })
            .await
            .unwrap();

        assert_eq!(result.optimized_resume.skills, "Rust");
    }

    #[tokio::test]
    async fn test_short_job_description_never_reaches_the_model() {
        let llm = ScriptedLlm::new(vec![]);
        let err = executor(&llm)
            .optimize_resume(AtsOptimizationRequest {
                resume_text: "Jane Doe".into(),
                job_description: "Rust dev".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::Validation(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_carries_resume_and_contract() {
        let llm = ScriptedLlm::new(vec![Reply::Text(answer(json!({}), json!(50)))]);
        executor(&llm)
            .optimize_resume(AtsOptimizationRequest {
                resume_text: "Resume with {job_description} in it".into(),
                job_description: long_jd("Go"),
            })
            .await
            .unwrap();

        let prompt = &llm.requests()[0].prompt;
        assert!(prompt.contains("Resume with {job_description} in it"));
        assert!(prompt.contains("- atsScore (number"));
        assert!(!prompt.contains("{output_contract}"));
    }
}
