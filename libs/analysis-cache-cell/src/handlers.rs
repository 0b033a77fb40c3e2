use axum::{extract::State, Json};
use tracing::debug;

use crate::models::CacheStats;
use crate::services::AnalysisCache;

#[axum::debug_handler]
pub async fn get_cache_stats(State(cache): State<AnalysisCache>) -> Json<CacheStats> {
    let stats = cache.stats().await;
    debug!(
        "Cache stats: {} entries, {} pending, hit rate {:.2}",
        stats.total_entries, stats.pending, stats.hit_rate
    );
    Json(stats)
}
