use std::env;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::warn;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REGION: &str = "Australia";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub analysis_reference_date: NaiveDate,
    pub analysis_region: String,
    pub max_concurrent_extractions: usize,
    pub directory_path: Option<String>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_timeout_secs: 30,
            analysis_reference_date: default_reference_date(),
            analysis_region: DEFAULT_REGION.to_string(),
            max_concurrent_extractions: 4,
            directory_path: None,
            port: 3000,
        }
    }
}

/// The fixed "today" the extraction prompt reasons from: Friday, 27 February 2026.
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 27).unwrap_or_default()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            gemini_api_key: env::var("GEMINI_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("GEMINI_API_KEY not set, transcript analysis will be unavailable");
                    String::new()
                }),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| {
                    warn!("GEMINI_MODEL not set, using default");
                    defaults.gemini_model.clone()
                }),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("GEMINI_BASE_URL not set, using default");
                    defaults.gemini_base_url.clone()
                }),
            gemini_timeout_secs: parse_var("GEMINI_TIMEOUT_SECS", defaults.gemini_timeout_secs),
            analysis_reference_date: match env::var("ANALYSIS_REFERENCE_DATE") {
                Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").unwrap_or_else(|_| {
                    warn!("ANALYSIS_REFERENCE_DATE is not a YYYY-MM-DD date, using default");
                    defaults.analysis_reference_date
                }),
                Err(_) => {
                    warn!("ANALYSIS_REFERENCE_DATE not set, using default");
                    defaults.analysis_reference_date
                }
            },
            analysis_region: env::var("ANALYSIS_REGION")
                .unwrap_or_else(|_| {
                    warn!("ANALYSIS_REGION not set, using default");
                    defaults.analysis_region.clone()
                }),
            max_concurrent_extractions: parse_var(
                "MAX_CONCURRENT_EXTRACTIONS",
                defaults.max_concurrent_extractions,
            )
            .max(1),
            directory_path: env::var("DIRECTORY_PATH").ok().filter(|p| !p.trim().is_empty()),
            port: parse_var("PORT", defaults.port),
        };

        if !config.is_ai_configured() {
            warn!("Application not fully configured - missing GEMINI_API_KEY");
        }

        config
    }

    pub fn is_ai_configured(&self) -> bool {
        !self.gemini_api_key.trim().is_empty()
    }
}

fn parse_var<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} could not be parsed, using default", name);
            default
        }),
        Err(_) => default,
    }
}
