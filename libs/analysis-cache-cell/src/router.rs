use axum::{routing::get, Router};

use crate::handlers;
use crate::services::AnalysisCache;

pub fn analysis_cache_routes(cache: AnalysisCache) -> Router {
    Router::new()
        .route("/stats", get(handlers::get_cache_stats))
        .with_state(cache)
}
