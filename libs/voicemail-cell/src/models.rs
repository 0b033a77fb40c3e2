use serde::{Deserialize, Serialize};

use analysis_cache_cell::{AnalysisView, CacheEntry};
use shared_models::{AvailableSlot, Patient, Voicemail};

/// Which side of the archive a listing shows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InboxView {
    #[default]
    Inbox,
    Resolved,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoicemailListQuery {
    #[serde(default)]
    pub view: Option<InboxView>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoicemailWithAnalysis {
    pub voicemail: Voicemail,
    pub analysis: AnalysisView,
}

impl VoicemailWithAnalysis {
    pub fn new(voicemail: &Voicemail, entry: &CacheEntry) -> Self {
        Self {
            voicemail: voicemail.clone(),
            analysis: AnalysisView::from(entry),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicemailListResponse {
    pub voicemails: Vec<VoicemailWithAnalysis>,
    pub total: usize,
    pub inbox_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
    pub id: String,
    pub archived: bool,
    pub inbox_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientReview {
    pub patients: Vec<Patient>,
    pub suggested_patient_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSuggestions {
    pub appointment_type: Option<String>,
    pub requested_doctor: Option<String>,
    pub slots: Vec<AvailableSlot>,
    pub analysis: AnalysisView,
}
