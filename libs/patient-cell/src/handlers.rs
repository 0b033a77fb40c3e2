use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_database::Directory;
use shared_models::error::AppError;

use crate::services::resolver::matching_patients;

#[derive(Debug, Deserialize)]
pub struct PatientMatchQuery {
    pub number: String,
}

#[axum::debug_handler]
pub async fn get_patient(
    State(directory): State<Arc<Directory>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    debug!("Fetching patient record: {}", patient_id);

    let patient = directory
        .patient(&patient_id)
        .ok_or_else(|| AppError::NotFound(format!("Patient {} not found", patient_id)))?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn match_patients(
    State(directory): State<Arc<Directory>>,
    Query(query): Query<PatientMatchQuery>,
) -> Result<Json<Value>, AppError> {
    let patients = matching_patients(&query.number, directory.patients());

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}
