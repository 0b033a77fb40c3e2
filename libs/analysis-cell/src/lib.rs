// Analysis Cell - transcript extraction behind a validated schema
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{AnalysisError, GenerationError, ValidationError};
pub use models::{AnalysisResult, AnalyzeRequest, AppointmentType, ClosedEnum, Intent, KeyDetail, Urgency};
pub use router::analysis_routes;

pub mod api {
    pub use crate::services::extraction::ExtractionEngine;
    pub use crate::services::gemini::{GeminiClient, GenerativeClient};
    pub use crate::services::prompt::{AnalysisPrompt, AnalysisRequest, PromptContext};
    pub use crate::services::schema::{response_schema, validate};
}
