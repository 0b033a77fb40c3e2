use std::sync::Arc;

use axum::{routing::get, Router};

use analysis_cache_cell::{analysis_cache_routes, AnalysisCache};
use analysis_cell::analysis_routes;
use analysis_cell::api::ExtractionEngine;
use patient_cell::router::patient_routes;
use shared_database::Directory;
use voicemail_cell::handlers::VoicemailState;
use voicemail_cell::{voicemail_routes, InboxSession};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ExtractionEngine>,
    pub cache: AnalysisCache,
    pub directory: Arc<Directory>,
    pub session: Arc<InboxSession>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Voicemail triage API is running!" }))
        .nest("/api", analysis_routes(state.engine.clone()))
        .nest(
            "/voicemails",
            voicemail_routes(VoicemailState::new(state.cache.clone(), state.session.clone())),
        )
        .nest("/patients", patient_routes(state.directory.clone()))
        .nest("/cache", analysis_cache_routes(state.cache))
}
