use tracing::debug;

use shared_models::Patient;

use crate::models::PatientCandidate;

/// Strip everything that is not an ASCII digit.
pub fn normalize_phone_number(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Patients whose digits-only phone number equals the caller's, in
/// directory order. Shared lines yield several matches.
pub fn matching_patients<'a>(caller_number: &str, patients: &'a [Patient]) -> Vec<&'a Patient> {
    let caller = normalize_phone_number(caller_number);

    let matches: Vec<&Patient> = patients
        .iter()
        .filter(|p| normalize_phone_number(&p.phone_number) == caller)
        .collect();

    debug!("Resolved {} patient(s) for caller number", matches.len());
    matches
}

pub fn resolve_candidates(caller_number: &str, patients: &[Patient]) -> Vec<PatientCandidate> {
    matching_patients(caller_number, patients)
        .into_iter()
        .map(PatientCandidate::from)
        .collect()
}
