use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::services::extraction::ExtractionEngine;

pub fn analysis_routes(engine: Arc<ExtractionEngine>) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze))
        .with_state(engine)
}
