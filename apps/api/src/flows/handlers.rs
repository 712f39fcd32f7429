//! Axum route handlers for the flow API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::document::data_uri::DataUri;
use crate::document::validation::{validate_cover_letter, validate_resume, DraftValidationResult};
use crate::document::{CoverLetterDraft, DocumentDraft, Draft};
use crate::errors::AppError;
use crate::flows::ats::{AtsOptimizationRequest, AtsOptimizationResult};
use crate::flows::cover_letter::{
    CoverLetterGenerationRequest, CoverLetterOptimizationRequest, CoverLetterOptimizationResult,
    GeneratedCoverLetter,
};
use crate::flows::linkedin::{LinkedInOptimizationRequest, SkillGapResult};
use crate::flows::resume_parse::{ParseResumeRequest, ParsedDocument};
use crate::state::AppState;

/// Multipart field carrying the uploaded resume.
const UPLOAD_FIELD: &str = "file";

/// POST /api/v1/flows/:operation
///
/// Uniform entry point: runs any operation by name on raw JSON.
pub async fn handle_run_flow(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let output = state.flows.run_named(&operation, input).await?;
    Ok(Json(output))
}

/// POST /api/v1/resumes/optimize
pub async fn handle_optimize_resume(
    State(state): State<AppState>,
    Json(request): Json<AtsOptimizationRequest>,
) -> Result<Json<AtsOptimizationResult>, AppError> {
    Ok(Json(state.flows.optimize_resume(request).await?))
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(request): Json<ParseResumeRequest>,
) -> Result<Json<ParsedDocument>, AppError> {
    Ok(Json(state.flows.parse_resume(request).await?))
}

/// POST /api/v1/resumes/upload
///
/// Accepts a multipart `file` part, encodes it as a data URI using the part's declared
/// content type, and parses it like `/resumes/parse`.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParsedDocument>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let data = field.bytes().await?;
        info!("Resume upload: {file_name} ({mime}, {} bytes)", data.len());

        let request = ParseResumeRequest {
            resume_data_uri: DataUri::encode(&mime, &data),
        };
        return Ok(Json(state.flows.parse_resume(request).await?));
    }

    Err(AppError::Validation(format!(
        "Missing '{UPLOAD_FIELD}' part in upload"
    )))
}

/// POST /api/v1/cover-letters/optimize
pub async fn handle_optimize_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterOptimizationRequest>,
) -> Result<Json<CoverLetterOptimizationResult>, AppError> {
    Ok(Json(state.flows.optimize_cover_letter(request).await?))
}

/// POST /api/v1/cover-letters/generate
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterGenerationRequest>,
) -> Result<Json<GeneratedCoverLetter>, AppError> {
    Ok(Json(state.flows.generate_cover_letter(request).await?))
}

/// POST /api/v1/linkedin/optimize
pub async fn handle_optimize_linkedin(
    State(state): State<AppState>,
    Json(request): Json<LinkedInOptimizationRequest>,
) -> Result<Json<SkillGapResult>, AppError> {
    Ok(Json(state.flows.optimize_linkedin(request).await?))
}

/// POST /api/v1/drafts/validate
pub async fn handle_validate_resume_draft(
    Json(draft): Json<DocumentDraft>,
) -> Json<DraftValidationResult> {
    Json(validate_resume(&draft))
}

/// POST /api/v1/cover-letters/validate
pub async fn handle_validate_cover_letter_draft(
    Json(draft): Json<CoverLetterDraft>,
) -> Json<DraftValidationResult> {
    Json(validate_cover_letter(&draft))
}

#[derive(Debug, Deserialize)]
pub struct ApplySummaryRequest {
    pub draft: DocumentDraft,
    pub optimized: DocumentDraft,
}

/// POST /api/v1/drafts/apply-summary
///
/// Takes only the optimized summary into the user's draft; lists stay as the user wrote them.
pub async fn handle_apply_summary(Json(request): Json<ApplySummaryRequest>) -> Json<DocumentDraft> {
    Json(request.draft.apply_optimized_summary(&request.optimized))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeResumeDraftRequest {
    pub draft: DocumentDraft,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct OptimizedResumeDraft {
    pub optimization: AtsOptimizationResult,
    pub draft: DocumentDraft,
}

/// POST /api/v1/drafts/optimize
///
/// Runs ATS optimization on a structured draft and returns the draft with the optimized
/// summary applied alongside the full result.
pub async fn handle_optimize_resume_draft(
    State(state): State<AppState>,
    Json(request): Json<OptimizeResumeDraftRequest>,
) -> Result<Json<OptimizedResumeDraft>, AppError> {
    let optimization = state
        .flows
        .optimize_resume(AtsOptimizationRequest {
            resume_text: request.draft.to_text(),
            job_description: request.job_description,
        })
        .await?;
    let draft = request
        .draft
        .apply_optimized_summary(&optimization.optimized_resume);
    Ok(Json(OptimizedResumeDraft { optimization, draft }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeCoverLetterDraftRequest {
    pub draft: CoverLetterDraft,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct OptimizedCoverLetterDraft {
    pub optimization: CoverLetterOptimizationResult,
    pub draft: CoverLetterDraft,
}

/// POST /api/v1/cover-letters/optimize-draft
pub async fn handle_optimize_cover_letter_draft(
    State(state): State<AppState>,
    Json(request): Json<OptimizeCoverLetterDraftRequest>,
) -> Result<Json<OptimizedCoverLetterDraft>, AppError> {
    let optimization = state
        .flows
        .optimize_cover_letter(CoverLetterOptimizationRequest {
            cover_letter_text: request.draft.to_text(),
            job_description: request.job_description,
        })
        .await?;
    let draft = request
        .draft
        .apply_optimized_summary(&optimization.optimized_cover_letter);
    Ok(Json(OptimizedCoverLetterDraft { optimization, draft }))
}
