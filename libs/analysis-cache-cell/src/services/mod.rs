pub mod cache;

pub use cache::AnalysisCache;
