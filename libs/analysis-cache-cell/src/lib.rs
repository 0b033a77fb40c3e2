// =====================================================================================
// ANALYSIS CACHE CELL - PER-VOICEMAIL EXTRACTION CACHE & FETCH ORCHESTRATION
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::analysis_cache_routes;
pub use services::AnalysisCache;
