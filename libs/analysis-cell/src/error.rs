use thiserror::Error;
use tracing::error;

use shared_models::error::AppError;

/// A schema contract violation, carrying the offending field path
/// (e.g. `keyDetails[1].value`).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of the generative capability itself, before any validation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Gemini API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gemini response contained no text")]
    EmptyResponse,

    #[error("Failed to parse Gemini response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Generative capability unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Client-fixable; never retried.
    #[error("{0}")]
    InvalidInput(String),

    /// Deployment misconfiguration; never retried.
    #[error("Analysis service misconfigured: {0}")]
    Configuration(String),

    /// Model call failed or its output broke the schema contract. Callers
    /// may retry.
    #[error("Extraction failed: {0}")]
    Extraction(String),
}

impl AnalysisError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::Extraction(_))
    }

    /// Message safe to show staff; upstream detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::InvalidInput(msg) => msg.clone(),
            AnalysisError::Configuration(_) => "Analysis service is not configured".to_string(),
            AnalysisError::Extraction(_) => "Internal Server Error".to_string(),
        }
    }
}

impl From<ValidationError> for AnalysisError {
    fn from(err: ValidationError) -> Self {
        AnalysisError::Extraction(format!("model output failed validation at {}", err))
    }
}

impl From<GenerationError> for AnalysisError {
    fn from(err: GenerationError) -> Self {
        AnalysisError::Extraction(err.to_string())
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let message = err.user_message();
        match err {
            AnalysisError::InvalidInput(_) => AppError::BadRequest(message),
            AnalysisError::Configuration(detail) => {
                error!("Analysis configuration error: {}", detail);
                AppError::Internal(message)
            }
            AnalysisError::Extraction(detail) => {
                error!("AI analysis error: {}", detail);
                AppError::Internal(message)
            }
        }
    }
}
