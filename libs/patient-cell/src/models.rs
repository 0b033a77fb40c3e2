use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::Patient;

/// The only patient fields that leave the process inside an extraction
/// prompt. Contact details and medical history stay behind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientCandidate {
    pub id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
}

impl From<&Patient> for PatientCandidate {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            date_of_birth: patient.date_of_birth,
        }
    }
}
