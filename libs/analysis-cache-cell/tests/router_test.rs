use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use analysis_cache_cell::{analysis_cache_routes, AnalysisCache};
use analysis_cell::api::{ExtractionEngine, PromptContext};
use shared_utils::test_utils::TestDirectory;

fn unconfigured_cache() -> AnalysisCache {
    let engine = ExtractionEngine::unconfigured(PromptContext::default());
    AnalysisCache::new(Arc::new(engine), TestDirectory::seeded(), 2)
}

async fn get_stats(cache: AnalysisCache) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri("/stats")
        .body(Body::empty())
        .unwrap();

    let response = analysis_cache_routes(cache).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_stats_on_empty_cache() {
    let (status, body) = get_stats(unconfigured_cache()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_entries"], 0);
    assert_eq!(body["hit_rate"], 0.0);
}

#[tokio::test]
async fn test_stats_count_failed_entries() {
    let cache = unconfigured_cache();
    cache.resolve_all(["1", "2"]).await;
    cache.get_or_fetch("1").await.unwrap();

    let (status, body) = get_stats(cache).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_entries"], 2);
    assert_eq!(body["failed"], 2);
    assert_eq!(body["misses"], 2);
    assert_eq!(body["hits"], 1);
    assert_eq!(body["extractions_started"], 2);
}
