use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::debug;

use shared_models::error::AppError;

use crate::models::{AnalysisResult, AnalyzeRequest};
use crate::services::extraction::ExtractionEngine;

#[axum::debug_handler]
pub async fn analyze(
    State(engine): State<Arc<ExtractionEngine>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let candidates = body.potential_patients.unwrap_or_default();
    debug!("Analyze request with {} potential patient(s)", candidates.len());

    let request = engine.request(body.transcript.unwrap_or_default(), candidates);
    let result = engine.extract(&request).await?;

    Ok(Json(result))
}
