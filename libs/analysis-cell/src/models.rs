use serde::{Deserialize, Serialize};
use std::fmt;

use patient_cell::PatientCandidate;

// ==============================================================================
// CLOSED ENUMERATIONS
// ==============================================================================

/// A field whose values come from a fixed set of wire labels.
pub trait ClosedEnum: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Exact label match after trimming and ASCII case-folding. Anything
    /// else is `None`; there is no fallback variant.
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.as_str().eq_ignore_ascii_case(raw))
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|value| value.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    Appointment,
    Prescription,
    Referral,
    #[serde(rename = "Test Results")]
    TestResults,
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
    Emergency,
}

impl Intent {
    /// Intents for which an appointment type and requested doctor are meaningful.
    pub fn involves_booking(&self) -> bool {
        matches!(self, Intent::Appointment | Intent::Emergency)
    }
}

impl ClosedEnum for Intent {
    const ALL: &'static [Self] = &[
        Intent::Appointment,
        Intent::Prescription,
        Intent::Referral,
        Intent::TestResults,
        Intent::GeneralInquiry,
        Intent::Emergency,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Intent::Appointment => "Appointment",
            Intent::Prescription => "Prescription",
            Intent::Referral => "Referral",
            Intent::TestResults => "Test Results",
            Intent::GeneralInquiry => "General Inquiry",
            Intent::Emergency => "Emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl ClosedEnum for Urgency {
    const ALL: &'static [Self] = &[Urgency::Low, Urgency::Medium, Urgency::High];

    fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentType {
    #[serde(rename = "Short Consult")]
    ShortConsult,
    #[serde(rename = "Standard Consult")]
    StandardConsult,
    #[serde(rename = "Long Consult")]
    LongConsult,
    Urgent,
}

impl ClosedEnum for AppointmentType {
    const ALL: &'static [Self] = &[
        AppointmentType::ShortConsult,
        AppointmentType::StandardConsult,
        AppointmentType::LongConsult,
        AppointmentType::Urgent,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::ShortConsult => "Short Consult",
            AppointmentType::StandardConsult => "Standard Consult",
            AppointmentType::LongConsult => "Long Consult",
            AppointmentType::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// ANALYSIS RESULT
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyDetail {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub intent: Intent,
    pub urgency: Urgency,
    /// 0-100, confidence in the intent/urgency/entity classification.
    pub confidence: f64,
    pub key_details: Vec<KeyDetail>,
    pub suggested_action: String,
    pub suggested_appointment_type: Option<AppointmentType>,
    pub suggested_patient_id: Option<String>,
    pub requested_doctor: Option<String>,
}

/// Body of `POST /api/analyze`. Both fields are optional on the wire so a
/// missing transcript can be answered with a 400 rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub potential_patients: Option<Vec<PatientCandidate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(Intent::parse("  test results "), Some(Intent::TestResults));
        assert_eq!(Urgency::parse("HIGH"), Some(Urgency::High));
        assert_eq!(
            AppointmentType::parse("standard consult"),
            Some(AppointmentType::StandardConsult)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_labels() {
        assert_eq!(Intent::parse("Billing"), None);
        assert_eq!(Intent::parse("Results"), None);
        assert_eq!(Urgency::parse("Critical"), None);
        assert_eq!(AppointmentType::parse("Short"), None);
    }

    #[test]
    fn test_serde_labels_match_as_str() {
        for intent in Intent::ALL {
            let value = serde_json::to_value(intent).unwrap();
            assert_eq!(value, intent.as_str());
        }
        for kind in AppointmentType::ALL {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value, kind.as_str());
        }
    }

    #[test]
    fn test_involves_booking() {
        assert!(Intent::Appointment.involves_booking());
        assert!(Intent::Emergency.involves_booking());
        assert!(!Intent::Prescription.involves_booking());
        assert!(!Intent::GeneralInquiry.involves_booking());
    }

    #[test]
    fn test_result_serializes_nulls_explicitly() {
        let result = AnalysisResult {
            summary: "Repeat script".into(),
            intent: Intent::Prescription,
            urgency: Urgency::Low,
            confidence: 90.0,
            key_details: vec![],
            suggested_action: "Send script".into(),
            suggested_appointment_type: None,
            suggested_patient_id: None,
            requested_doctor: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert!(value["suggestedAppointmentType"].is_null());
        assert!(value.as_object().unwrap().contains_key("suggestedPatientId"));
        assert_eq!(value["keyDetails"], serde_json::json!([]));
    }
}
