use std::sync::Arc;

use serde::{Deserialize, Serialize};

use analysis_cell::AnalysisResult;
use shared_models::error::AppError;

/// Extraction status for one voicemail.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Pending,
    Resolved(Arc<AnalysisResult>),
    /// `retryable` is false for terminal failures (bad input, missing
    /// configuration); those are never re-extracted.
    Failed { message: String, retryable: bool },
}

impl CacheEntry {
    pub fn failed(message: impl Into<String>, retryable: bool) -> Self {
        CacheEntry::Failed {
            message: message.into(),
            retryable,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CacheEntry::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CacheEntry::Failed { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, CacheEntry::Failed { retryable: true, .. })
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match self {
            CacheEntry::Resolved(result) => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CacheEntry::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// What a list or detail view renders for one voicemail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub loading: bool,
    pub analysis: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl From<&CacheEntry> for AnalysisView {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            loading: entry.is_pending(),
            analysis: entry.analysis().cloned(),
            error: entry.error().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub extractions_started: u64,
    pub stale_results_discarded: u64,
    pub total_entries: u64,
    pub pending: u64,
    pub resolved: u64,
    pub failed: u64,
    pub hit_rate: f64,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum CacheError {
    #[error("Voicemail {0} not found")]
    UnknownVoicemail(String),
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::NotFound(err.to_string())
    }
}
