//! Read-only records served by the clinic directory: voicemails, patients
//! and open appointment slots. JSON field names follow the dashboard's
//! camelCase wire format.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Voicemail {
    pub id: String,
    pub caller_name: String,
    /// As dialled; may contain spaces and punctuation.
    pub caller_number: String,
    #[serde(deserialize_with = "iso_datetime::deserialize")]
    pub timestamp: NaiveDateTime,
    pub duration: String,
    pub transcript: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingAppointment {
    pub id: String,
    #[serde(deserialize_with = "iso_datetime::deserialize")]
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub doctor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    /// Same unnormalized format as [`Voicemail::caller_number`]. Several
    /// patients may share one number.
    pub phone_number: String,
    pub email: String,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub upcoming_appointments: Vec<UpcomingAppointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub id: String,
    #[serde(deserialize_with = "iso_datetime::deserialize")]
    pub date: NaiveDateTime,
    pub doctor: String,
    #[serde(rename = "type")]
    pub slot_type: String,
}

/// ISO-8601 timestamps, with or without an offset. Offset values are
/// normalized to UTC; values without one are taken as clinic-local and kept.
pub mod iso_datetime {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT))
            .ok()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 timestamp: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_voicemail_deserializes_wire_format() {
        let voicemail: Voicemail = serde_json::from_value(json!({
            "id": "1",
            "callerName": "Sarah Jenkins",
            "callerNumber": "0411 123 456",
            "timestamp": "2023-10-27T09:15:00",
            "duration": "0:19",
            "transcript": "Hi, this is Sarah.",
            "audioUrl": "/audio/1.mp3"
        }))
        .unwrap();

        assert_eq!(voicemail.caller_number, "0411 123 456");
        assert_eq!(voicemail.timestamp.to_string(), "2023-10-27 09:15:00");
    }

    #[test]
    fn test_timestamps_accept_utc_and_offsets() {
        let with_offset = |timestamp: &str| {
            serde_json::from_value::<AvailableSlot>(json!({
                "id": "s1",
                "date": timestamp,
                "doctor": "Dr. Smith",
                "type": "Standard Consult"
            }))
            .map(|slot| slot.date.to_string())
        };

        assert_eq!(with_offset("2026-03-02T09:00:00Z").unwrap(), "2026-03-02 09:00:00");
        assert_eq!(with_offset("2026-03-02T20:00:00+11:00").unwrap(), "2026-03-02 09:00:00");
        assert_eq!(with_offset("2026-03-02T09:00:00.250").unwrap(), "2026-03-02 09:00:00.250");
        assert!(with_offset("next Tuesday").is_err());
    }

    #[test]
    fn test_patient_defaults_optional_lists() {
        let patient: Patient = serde_json::from_value(json!({
            "id": "p1",
            "name": "Sarah Jenkins",
            "dateOfBirth": "1985-03-12",
            "gender": "Female",
            "phoneNumber": "0411 123 456",
            "email": "sarah@example.com"
        }))
        .unwrap();

        assert!(patient.medical_history.is_empty());
        assert!(patient.upcoming_appointments.is_empty());
        assert_eq!(patient.gender.to_string(), "Female");
    }

    #[test]
    fn test_slot_type_uses_type_key() {
        let slot = AvailableSlot {
            id: "s1".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            doctor: "Dr. Smith".into(),
            slot_type: "Standard Consult".into(),
        };
        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(value["type"], "Standard Consult");
        assert_eq!(value["date"], "2026-03-02T09:00:00");
    }
}
