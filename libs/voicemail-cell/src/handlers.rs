use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use tracing::debug;

use analysis_cache_cell::{AnalysisCache, AnalysisView};
use patient_cell::matching_patients;
use shared_models::error::AppError;
use shared_models::Voicemail;

use crate::models::{
    ArchiveResponse, PatientReview, SlotSuggestions, VoicemailListQuery, VoicemailListResponse,
    VoicemailWithAnalysis,
};
use crate::services::{filter_and_sort, suggest_slots, InboxSession, VoicemailFilter};

#[derive(Clone)]
pub struct VoicemailState {
    pub cache: AnalysisCache,
    pub session: Arc<InboxSession>,
}

impl VoicemailState {
    pub fn new(cache: AnalysisCache, session: Arc<InboxSession>) -> Self {
        Self { cache, session }
    }

    fn voicemail(&self, voicemail_id: &str) -> Result<Voicemail, AppError> {
        self.cache
            .directory()
            .voicemail(voicemail_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Voicemail {} not found", voicemail_id)))
    }
}

#[axum::debug_handler]
pub async fn list_voicemails(
    State(state): State<VoicemailState>,
    query: Result<Query<VoicemailListQuery>, QueryRejection>,
) -> Result<Json<VoicemailListResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let filter = VoicemailFilter::from_query(query).map_err(AppError::BadRequest)?;

    let directory = state.cache.directory();
    let entries = state
        .cache
        .get_or_fetch_all(directory.voicemails().iter().map(|v| v.id.as_str()))
        .await;
    let archived = state.session.archived_ids().await;

    let voicemails: Vec<VoicemailWithAnalysis> =
        filter_and_sort(directory.voicemails(), &entries, &archived, &filter)
            .into_iter()
            .filter_map(|v| entries.get(&v.id).map(|entry| VoicemailWithAnalysis::new(v, entry)))
            .collect();

    let inbox_count = directory
        .voicemails()
        .iter()
        .filter(|v| !archived.contains(&v.id))
        .count();
    debug!("Listing {} voicemail(s) for {:?} view", voicemails.len(), filter.view);

    Ok(Json(VoicemailListResponse {
        total: voicemails.len(),
        voicemails,
        inbox_count,
    }))
}

#[axum::debug_handler]
pub async fn get_voicemail(
    State(state): State<VoicemailState>,
    Path(voicemail_id): Path<String>,
) -> Result<Json<VoicemailWithAnalysis>, AppError> {
    let voicemail = state.voicemail(&voicemail_id)?;
    let entry = state.cache.get_or_fetch(&voicemail_id).await?;

    Ok(Json(VoicemailWithAnalysis::new(&voicemail, &entry)))
}

#[axum::debug_handler]
pub async fn retry_analysis(
    State(state): State<VoicemailState>,
    Path(voicemail_id): Path<String>,
) -> Result<Json<VoicemailWithAnalysis>, AppError> {
    let voicemail = state.voicemail(&voicemail_id)?;
    let entry = state.cache.retry(&voicemail_id).await?;

    Ok(Json(VoicemailWithAnalysis::new(&voicemail, &entry)))
}

#[axum::debug_handler]
pub async fn archive_voicemail(
    State(state): State<VoicemailState>,
    Path(voicemail_id): Path<String>,
) -> Result<Json<ArchiveResponse>, AppError> {
    let voicemail = state.voicemail(&voicemail_id)?;
    state.session.archive(&voicemail.id).await;

    Ok(archive_response(&state, voicemail.id).await)
}

#[axum::debug_handler]
pub async fn restore_voicemail(
    State(state): State<VoicemailState>,
    Path(voicemail_id): Path<String>,
) -> Result<Json<ArchiveResponse>, AppError> {
    let voicemail = state.voicemail(&voicemail_id)?;
    state.session.restore(&voicemail.id).await;

    Ok(archive_response(&state, voicemail.id).await)
}

async fn archive_response(state: &VoicemailState, id: String) -> Json<ArchiveResponse> {
    let archived = state.session.is_archived(&id).await;
    let inbox_count = state.session.inbox_count(state.cache.directory().voicemails()).await;

    Json(ArchiveResponse {
        id,
        archived,
        inbox_count,
    })
}

#[axum::debug_handler]
pub async fn review_patients(
    State(state): State<VoicemailState>,
    Path(voicemail_id): Path<String>,
) -> Result<Json<PatientReview>, AppError> {
    let voicemail = state.voicemail(&voicemail_id)?;
    let entry = state.cache.get_or_fetch(&voicemail_id).await?;

    let patients = matching_patients(&voicemail.caller_number, state.cache.directory().patients())
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(PatientReview {
        patients,
        suggested_patient_id: entry.analysis().and_then(|a| a.suggested_patient_id.clone()),
    }))
}

#[axum::debug_handler]
pub async fn suggested_slots(
    State(state): State<VoicemailState>,
    Path(voicemail_id): Path<String>,
) -> Result<Json<SlotSuggestions>, AppError> {
    state.voicemail(&voicemail_id)?;
    let entry = state.cache.get_or_fetch(&voicemail_id).await?;

    let suggestions = match entry.analysis() {
        Some(analysis) => SlotSuggestions {
            appointment_type: analysis.suggested_appointment_type.map(|t| t.to_string()),
            requested_doctor: analysis.requested_doctor.clone(),
            slots: suggest_slots(analysis, state.cache.directory().available_slots())
                .into_iter()
                .cloned()
                .collect(),
            analysis: AnalysisView::from(&entry),
        },
        None => SlotSuggestions {
            appointment_type: None,
            requested_doctor: None,
            slots: Vec::new(),
            analysis: AnalysisView::from(&entry),
        },
    };

    debug!("Suggesting {} slot(s) for voicemail {}", suggestions.slots.len(), voicemail_id);
    Ok(Json(suggestions))
}
