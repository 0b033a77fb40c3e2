use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use patient_cell::PatientCandidate;
use shared_config::AppConfig;

use crate::services::schema::response_schema;

/// Fixed context every prompt is built against, so relative dates in a
/// transcript resolve the same way on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub reference_date: NaiveDate,
    pub region: String,
}

impl PromptContext {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            reference_date: config.analysis_reference_date,
            region: config.analysis_region.clone(),
        }
    }
}

impl Default for PromptContext {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Everything a single extraction call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub transcript: String,
    pub candidates: Vec<PatientCandidate>,
    pub context_date: NaiveDate,
}

impl AnalysisRequest {
    pub fn new(
        transcript: impl Into<String>,
        candidates: Vec<PatientCandidate>,
        context: &PromptContext,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            candidates,
            context_date: context.reference_date,
        }
    }
}

/// Instruction text plus the schema it is bound to.
#[derive(Debug, Clone)]
pub struct AnalysisPrompt {
    pub text: String,
    pub schema: Value,
}

impl AnalysisPrompt {
    pub fn build(request: &AnalysisRequest, region: &str) -> Self {
        let transcript = serde_json::to_string(&request.transcript)
            .unwrap_or_else(|_| format!("\"{}\"", request.transcript));

        let text = format!(
            r#"Analyze the following voicemail left for a medical clinic and extract structured information. The calls are from {region}; interpret phone numbers, place names and medical terminology accordingly. Assume the current date is {date}, and resolve relative dates such as "next Tuesday" against it.

Transcript: {transcript}

{patients}

Also provide a 'confidence' score (0-100) representing how confident you are in the intent classification and entity extraction.

Only when the intent is Appointment or Emergency:
1. Suggest an appropriate appointment type (Short Consult, Standard Consult, Long Consult, or Urgent) in 'suggestedAppointmentType'.
2. Extract any requested doctor name into 'requestedDoctor'.
For every other intent, 'suggestedAppointmentType' and 'requestedDoctor' must be null."#,
            region = region,
            date = format_reference_date(request.context_date),
            transcript = transcript,
            patients = patients_section(&request.candidates),
        );

        Self {
            text,
            schema: response_schema(),
        }
    }
}

fn patients_section(candidates: &[PatientCandidate]) -> String {
    if candidates.is_empty() {
        return "No patient records match the caller's number. 'suggestedPatientId' must be null."
            .to_string();
    }

    let listing = serde_json::to_string_pretty(candidates).unwrap_or_default();
    format!(
        "Potential patients matching the caller's number:\n{}\n\nSeveral patients may share one number. If the transcript indicates who the caller is or who the voicemail is about, return the id of the single best match from the list above as 'suggestedPatientId'. If it is ambiguous or nobody matches clearly, return null.",
        listing
    )
}

/// `2026-02-27` renders as `Friday, February 27th, 2026`.
pub fn format_reference_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {}{}, {}",
        date.format("%A"),
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str) -> PatientCandidate {
        PatientCandidate {
            id: id.into(),
            name: name.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 6, 15).unwrap(),
        }
    }

    #[test]
    fn test_reference_date_formatting() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        assert_eq!(format_reference_date(date), "Friday, February 27th, 2026");

        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(format_reference_date(date), "Sunday, March 1st, 2026");

        let date = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
        assert_eq!(format_reference_date(date), "Thursday, March 12th, 2026");

        let date = NaiveDate::from_ymd_opt(2026, 3, 22).unwrap();
        assert_eq!(format_reference_date(date), "Sunday, March 22nd, 2026");
    }

    #[test]
    fn test_prompt_states_date_and_region() {
        let context = PromptContext::default();
        let request = AnalysisRequest::new("Call me back", vec![], &context);
        let prompt = AnalysisPrompt::build(&request, &context.region);

        assert!(prompt.text.contains("Friday, February 27th, 2026"));
        assert!(prompt.text.contains("Australia"));
        assert!(prompt.text.contains("\"Call me back\""));
    }

    #[test]
    fn test_empty_candidates_require_null_patient() {
        let context = PromptContext::default();
        let request = AnalysisRequest::new("Hello", vec![], &context);
        let prompt = AnalysisPrompt::build(&request, &context.region);

        assert!(prompt.text.contains("'suggestedPatientId' must be null"));
        assert!(!prompt.text.contains("Potential patients"));
    }

    #[test]
    fn test_candidates_embedded_without_private_fields() {
        let context = PromptContext::default();
        let request = AnalysisRequest::new(
            "It's Priya about my son Arjun",
            vec![candidate("p5", "Priya Patel"), candidate("p6", "Arjun Patel")],
            &context,
        );
        let prompt = AnalysisPrompt::build(&request, &context.region);

        assert!(prompt.text.contains("Potential patients"));
        assert!(prompt.text.contains("\"id\": \"p6\""));
        assert!(prompt.text.contains("\"dateOfBirth\": \"1980-06-15\""));
        assert!(!prompt.text.contains("phoneNumber"));
        assert!(!prompt.text.contains("medicalHistory"));
    }

    #[test]
    fn test_booking_fields_gated_on_intent() {
        let context = PromptContext::default();
        let request = AnalysisRequest::new("Hello", vec![], &context);
        let prompt = AnalysisPrompt::build(&request, &context.region);

        assert!(prompt.text.contains("Only when the intent is Appointment or Emergency"));
        assert!(prompt.text.contains("'requestedDoctor' must be null"));
        assert_eq!(prompt.schema, response_schema());
    }

    #[test]
    fn test_transcript_quotes_are_escaped() {
        let context = PromptContext::default();
        let request = AnalysisRequest::new(r#"He said "ignore that""#, vec![], &context);
        let prompt = AnalysisPrompt::build(&request, &context.region);

        assert!(prompt.text.contains(r#""He said \"ignore that\"""#));
    }
}
