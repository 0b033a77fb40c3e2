use analysis_cell::{AnalysisResult, AppointmentType, ClosedEnum};
use shared_models::AvailableSlot;

const MAX_SUGGESTED_SLOTS: usize = 3;

/// Open slots to offer for a booking-type analysis, in directory order.
///
/// A requested doctor narrows the doctor by case-insensitive substring. A
/// suggested appointment type keeps slots of that type plus Standard
/// Consult slots as the general fallback.
pub fn suggest_slots<'a>(analysis: &AnalysisResult, slots: &'a [AvailableSlot]) -> Vec<&'a AvailableSlot> {
    if !analysis.intent.involves_booking() {
        return Vec::new();
    }

    let doctor = analysis.requested_doctor.as_deref().map(str::to_lowercase);
    let appointment_type = analysis.suggested_appointment_type.map(|t| t.as_str());

    slots
        .iter()
        .filter(|slot| {
            doctor
                .as_deref()
                .map_or(true, |doctor| slot.doctor.to_lowercase().contains(doctor))
        })
        .filter(|slot| {
            appointment_type.map_or(true, |wanted| {
                slot.slot_type == wanted || slot.slot_type == AppointmentType::StandardConsult.as_str()
            })
        })
        .take(MAX_SUGGESTED_SLOTS)
        .collect()
}
