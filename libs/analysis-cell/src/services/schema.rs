use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{AnalysisResult, AppointmentType, ClosedEnum, Intent, KeyDetail, Urgency};

/// The AnalysisResult contract in the OpenAPI subset Gemini accepts as a
/// `responseSchema`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "intent": {
                "type": "STRING",
                "enum": Intent::labels()
            },
            "urgency": {
                "type": "STRING",
                "enum": Urgency::labels(),
                "description": "Urgency level of the voicemail. Low: Routine appointments, rescheduling, general inquiries. Medium: Acute symptoms but stable, urgent referrals, action required but not immediately life-threatening. High: Emergencies, severe distress, immediate action required."
            },
            "confidence": {
                "type": "NUMBER",
                "minimum": 0,
                "maximum": 100,
                "description": "Confidence score (0-100) of the analysis"
            },
            "keyDetails": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "value": { "type": "STRING" }
                    },
                    "required": ["label", "value"]
                }
            },
            "suggestedAction": { "type": "STRING" },
            "suggestedAppointmentType": {
                "type": "STRING",
                "enum": AppointmentType::labels(),
                "nullable": true,
                "description": "If the intent is Appointment or Emergency, suggest the most appropriate appointment type based on the context. Short: Scripts, simple things. Standard: Normal checkups. Long: Multiple issues, mental health, complex. Urgent: Needs to be seen today."
            },
            "suggestedPatientId": {
                "type": "STRING",
                "nullable": true,
                "description": "ID of the most likely patient from the provided list, or null if none match clearly"
            },
            "requestedDoctor": {
                "type": "STRING",
                "nullable": true,
                "description": "Name of the doctor requested by the caller, if any."
            }
        },
        "required": [
            "summary",
            "intent",
            "urgency",
            "confidence",
            "keyDetails",
            "suggestedAction",
            "suggestedAppointmentType",
            "suggestedPatientId",
            "requestedDoctor"
        ]
    })
}

/// Re-validate an untrusted model response into a typed result.
///
/// Missing and `null` are treated the same everywhere. Closed-enum fields
/// never fall back to a default: an unknown label is an error naming the
/// field. Booking fields are cleared for intents that do not involve a
/// booking.
pub fn validate(raw: &Value) -> Result<AnalysisResult, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ValidationError::new("$", "expected an object"))?;

    let summary = required_text(obj, "summary")?;
    let intent: Intent = required_enum(obj, "intent")?;
    let urgency: Urgency = required_enum(obj, "urgency")?;
    let confidence = confidence(obj)?;
    let key_details = key_details(obj)?;
    let suggested_action = required_text(obj, "suggestedAction")?;
    let mut suggested_appointment_type: Option<AppointmentType> =
        optional_enum(obj, "suggestedAppointmentType")?;
    let suggested_patient_id = optional_text(obj, "suggestedPatientId")?;
    let mut requested_doctor = optional_text(obj, "requestedDoctor")?;

    if !intent.involves_booking()
        && (suggested_appointment_type.is_some() || requested_doctor.is_some())
    {
        debug!("Clearing booking fields for intent {}", intent);
        suggested_appointment_type = None;
        requested_doctor = None;
    }

    Ok(AnalysisResult {
        summary,
        intent,
        urgency,
        confidence,
        key_details,
        suggested_action,
        suggested_appointment_type,
        suggested_patient_id,
        requested_doctor,
    })
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|value| !value.is_null())
}

fn required_text(obj: &Map<String, Value>, name: &str) -> Result<String, ValidationError> {
    let value = field(obj, name).ok_or_else(|| ValidationError::new(name, "is required"))?;
    let text = value
        .as_str()
        .ok_or_else(|| ValidationError::new(name, "expected a string"))?
        .trim();

    if text.is_empty() {
        return Err(ValidationError::new(name, "must not be empty"));
    }
    Ok(text.to_string())
}

fn optional_text(obj: &Map<String, Value>, name: &str) -> Result<Option<String>, ValidationError> {
    match field(obj, name) {
        None => Ok(None),
        Some(value) => {
            let text = value
                .as_str()
                .ok_or_else(|| ValidationError::new(name, "expected a string or null"))?
                .trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
    }
}

fn parse_label<T: ClosedEnum>(name: &str, value: &Value) -> Result<T, ValidationError> {
    let label = value
        .as_str()
        .ok_or_else(|| ValidationError::new(name, "expected a string"))?;

    T::parse(label).ok_or_else(|| {
        ValidationError::new(
            name,
            format!("{:?} is not one of {}", label, T::labels().join(", ")),
        )
    })
}

fn required_enum<T: ClosedEnum>(obj: &Map<String, Value>, name: &str) -> Result<T, ValidationError> {
    let value = field(obj, name).ok_or_else(|| ValidationError::new(name, "is required"))?;
    parse_label(name, value)
}

fn optional_enum<T: ClosedEnum>(
    obj: &Map<String, Value>,
    name: &str,
) -> Result<Option<T>, ValidationError> {
    field(obj, name).map(|value| parse_label(name, value)).transpose()
}

fn confidence(obj: &Map<String, Value>) -> Result<f64, ValidationError> {
    let value = field(obj, "confidence")
        .ok_or_else(|| ValidationError::new("confidence", "is required"))?;
    let score = value
        .as_f64()
        .ok_or_else(|| ValidationError::new("confidence", "expected a number"))?;

    if !(0.0..=100.0).contains(&score) {
        return Err(ValidationError::new(
            "confidence",
            format!("must be between 0 and 100, got {}", score),
        ));
    }
    Ok(score)
}

fn key_details(obj: &Map<String, Value>) -> Result<Vec<KeyDetail>, ValidationError> {
    let entries = field(obj, "keyDetails")
        .ok_or_else(|| ValidationError::new("keyDetails", "is required"))?
        .as_array()
        .ok_or_else(|| ValidationError::new("keyDetails", "expected an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| -> Result<KeyDetail, ValidationError> {
            let path = format!("keyDetails[{}]", index);
            let entry = entry
                .as_object()
                .ok_or_else(|| ValidationError::new(path.as_str(), "expected an object"))?;

            let text = |key: &str| {
                entry
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ValidationError::new(format!("{}.{}", path, key), "expected a string")
                    })
            };

            Ok(KeyDetail {
                label: text("label")?,
                value: text("value")?,
            })
        })
        .collect()
}
