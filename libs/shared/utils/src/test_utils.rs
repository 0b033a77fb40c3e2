use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::Directory;
use shared_models::{Gender, Patient, Voicemail};

pub struct TestConfig {
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub max_concurrent_extractions: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: "test-gemini-key".to_string(),
            gemini_base_url: "http://localhost:1".to_string(),
            max_concurrent_extractions: 4,
        }
    }
}

impl TestConfig {
    /// Config pointing the Gemini client at a local mock server.
    pub fn with_gemini_url(url: &str) -> Self {
        Self {
            gemini_base_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            gemini_api_key: self.gemini_api_key.clone(),
            gemini_base_url: self.gemini_base_url.clone(),
            gemini_timeout_secs: 5,
            max_concurrent_extractions: self.max_concurrent_extractions,
            ..AppConfig::default()
        }
    }
}

pub struct TestDirectory;

impl TestDirectory {
    pub fn seeded() -> Arc<Directory> {
        Arc::new(Directory::seeded().expect("seed directory must parse"))
    }

    pub fn with(voicemails: Vec<Voicemail>, patients: Vec<Patient>) -> Arc<Directory> {
        Arc::new(Directory::new(voicemails, patients, Vec::new()))
    }

    pub fn voicemail(id: &str, caller_name: &str, caller_number: &str, transcript: &str) -> Voicemail {
        Voicemail {
            id: id.to_string(),
            caller_name: caller_name.to_string(),
            caller_number: caller_number.to_string(),
            timestamp: test_timestamp(9, 0),
            duration: "0:10".to_string(),
            transcript: transcript.to_string(),
            audio_url: format!("/audio/{}.mp3", id),
        }
    }

    pub fn patient(id: &str, name: &str, phone_number: &str) -> Patient {
        Patient {
            id: id.to_string(),
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 6, 15).unwrap_or_default(),
            gender: Gender::Other,
            phone_number: phone_number.to_string(),
            email: format!("{}@example.com", id),
            medical_history: Vec::new(),
            upcoming_appointments: Vec::new(),
        }
    }
}

pub fn test_timestamp(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 10, 27)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

pub struct MockGeminiResponses;

impl MockGeminiResponses {
    /// A raw analysis object as the model would return it.
    pub fn analysis(intent: &str, urgency: &str) -> Value {
        json!({
            "summary": format!("{} voicemail", intent),
            "intent": intent,
            "urgency": urgency,
            "confidence": 88,
            "keyDetails": [],
            "suggestedAction": "Call the patient back.",
            "suggestedAppointmentType": null,
            "suggestedPatientId": null,
            "requestedDoctor": null
        })
    }

    pub fn prescription() -> Value {
        json!({
            "summary": "Caller has run out of blood pressure medication and needs a repeat script.",
            "intent": "Prescription",
            "urgency": "Medium",
            "confidence": 93,
            "keyDetails": [
                { "label": "Medication", "value": "Blood pressure medication" }
            ],
            "suggestedAction": "Prepare a repeat prescription for GP review.",
            "suggestedAppointmentType": null,
            "suggestedPatientId": null,
            "requestedDoctor": null
        })
    }

    pub fn emergency(patient_id: Option<&str>) -> Value {
        json!({
            "summary": "High fever since last night with difficulty breathing.",
            "intent": "Emergency",
            "urgency": "High",
            "confidence": 96,
            "keyDetails": [
                { "label": "Symptom", "value": "Fever 39.5" },
                { "label": "Symptom", "value": "Difficulty breathing" }
            ],
            "suggestedAction": "Call back immediately; advise emergency department if breathing worsens.",
            "suggestedAppointmentType": "Urgent",
            "suggestedPatientId": patient_id,
            "requestedDoctor": null
        })
    }

    pub fn appointment(appointment_type: &str, requested_doctor: Option<&str>, patient_id: Option<&str>) -> Value {
        json!({
            "summary": "Caller wants to book an appointment.",
            "intent": "Appointment",
            "urgency": "Low",
            "confidence": 85,
            "keyDetails": [],
            "suggestedAction": "Offer the next available slot.",
            "suggestedAppointmentType": appointment_type,
            "suggestedPatientId": patient_id,
            "requestedDoctor": requested_doctor
        })
    }

    /// Wrap an analysis object in a Gemini `generateContent` response.
    pub fn generate_content(analysis: &Value) -> Value {
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": analysis.to_string() }]
                },
                "finishReason": "STOP"
            }]
        })
    }

    pub fn error_response(message: &str, code: u16) -> Value {
        json!({
            "error": {
                "code": code,
                "message": message,
                "status": "UNAVAILABLE"
            }
        })
    }
}
