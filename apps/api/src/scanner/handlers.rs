//! Axum route handlers for the Scanner API.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_input: String,
}

/// POST /api/v1/analyze
///
/// Scores resume text against a job description or role title. Blank inputs are not
/// rejected: they yield a zero score with a tip explaining what is missing.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id);

    let result = state
        .engine
        .analyze(
            &request.resume_text,
            &request.job_input,
            state.tip_phraser.as_ref(),
            state.config.tip_timeout,
        )
        .instrument(span)
        .await;

    Ok(Json(result))
}
