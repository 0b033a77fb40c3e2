use std::sync::Arc;

use tracing::{debug, error, warn};

use patient_cell::PatientCandidate;
use shared_config::AppConfig;

use crate::error::AnalysisError;
use crate::models::AnalysisResult;
use crate::services::gemini::{GeminiClient, GenerativeClient};
use crate::services::prompt::{AnalysisPrompt, AnalysisRequest, PromptContext};
use crate::services::schema::validate;

/// Stateless transcript -> AnalysisResult pipeline:
/// prompt -> generative call -> schema validation -> candidate reconciliation.
pub struct ExtractionEngine {
    client: Option<Arc<dyn GenerativeClient>>,
    context: PromptContext,
}

impl ExtractionEngine {
    pub fn new(client: Arc<dyn GenerativeClient>, context: PromptContext) -> Self {
        Self {
            client: Some(client),
            context,
        }
    }

    /// An engine with no generative backend; every valid request fails with
    /// a configuration error.
    pub fn unconfigured(context: PromptContext) -> Self {
        Self {
            client: None,
            context,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let context = PromptContext::from_config(config);
        match GeminiClient::from_config(config) {
            Ok(client) => Self::new(Arc::new(client), context),
            Err(e) => {
                warn!("Transcript analysis disabled: {}", e);
                Self::unconfigured(context)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn context(&self) -> &PromptContext {
        &self.context
    }

    /// Build a request bound to this engine's reference date.
    pub fn request(
        &self,
        transcript: impl Into<String>,
        candidates: Vec<PatientCandidate>,
    ) -> AnalysisRequest {
        AnalysisRequest::new(transcript, candidates, &self.context)
    }

    pub async fn extract(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if request.transcript.trim().is_empty() {
            return Err(AnalysisError::InvalidInput("Transcript is required".to_string()));
        }

        let client = self.client.as_ref().ok_or_else(|| {
            AnalysisError::Configuration("GEMINI_API_KEY is not configured".to_string())
        })?;

        let prompt = AnalysisPrompt::build(request, &self.context.region);
        debug!(
            "Extracting analysis: transcript={} chars, candidates={}",
            request.transcript.len(),
            request.candidates.len()
        );

        let raw = client.generate(&prompt.text, &prompt.schema).await.map_err(|e| {
            error!("Generative call failed: {}", e);
            AnalysisError::from(e)
        })?;

        let result = validate(&raw).map_err(|e| {
            warn!("Model output rejected by schema contract: {}", e);
            AnalysisError::from(e)
        })?;

        Ok(reconcile_patient(result, &request.candidates))
    }
}

/// A suggested patient must come from the candidate list sent in the
/// prompt; anything else is dropped to "no confident match".
fn reconcile_patient(mut result: AnalysisResult, candidates: &[PatientCandidate]) -> AnalysisResult {
    if let Some(id) = &result.suggested_patient_id {
        if !candidates.iter().any(|c| &c.id == id) {
            warn!("Discarding suggested patient id not among {} candidate(s)", candidates.len());
            result.suggested_patient_id = None;
        }
    }
    result
}
