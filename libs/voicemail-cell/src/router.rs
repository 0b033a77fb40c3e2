use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;

pub fn voicemail_routes(state: VoicemailState) -> Router {
    Router::new()
        .route("/", get(list_voicemails))
        .route("/{id}", get(get_voicemail))
        .route("/{id}/analysis/retry", post(retry_analysis))
        .route("/{id}/archive", post(archive_voicemail))
        .route("/{id}/restore", post(restore_voicemail))
        .route("/{id}/patients", get(review_patients))
        .route("/{id}/slots", get(suggested_slots))
        .with_state(state)
}
