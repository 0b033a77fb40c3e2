use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::Directory;

use crate::handlers::*;

pub fn patient_routes(directory: Arc<Directory>) -> Router {
    Router::new()
        .route("/match", get(match_patients))
        .route("/{id}", get(get_patient))
        .with_state(directory)
}
