pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::flows::handlers;
use crate::state::AppState;

/// Uploads arrive base64-encoded inside JSON, so the body cap sits well above the file size.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Uniform flow surface
        .route("/api/v1/flows/:operation", post(handlers::handle_run_flow))
        // Resumes
        .route("/api/v1/resumes/optimize", post(handlers::handle_optimize_resume))
        .route("/api/v1/resumes/parse", post(handlers::handle_parse_resume))
        .route("/api/v1/resumes/upload", post(handlers::handle_upload_resume))
        // Cover letters
        .route(
            "/api/v1/cover-letters/optimize",
            post(handlers::handle_optimize_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/generate",
            post(handlers::handle_generate_cover_letter),
        )
        .route(
            "/api/v1/cover-letters/optimize-draft",
            post(handlers::handle_optimize_cover_letter_draft),
        )
        .route(
            "/api/v1/cover-letters/validate",
            post(handlers::handle_validate_cover_letter_draft),
        )
        // LinkedIn
        .route("/api/v1/linkedin/optimize", post(handlers::handle_optimize_linkedin))
        // Drafts
        .route("/api/v1/drafts/validate", post(handlers::handle_validate_resume_draft))
        .route("/api/v1/drafts/optimize", post(handlers::handle_optimize_resume_draft))
        .route("/api/v1/drafts/apply-summary", post(handlers::handle_apply_summary))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
