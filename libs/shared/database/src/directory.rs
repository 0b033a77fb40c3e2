use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::{AvailableSlot, Patient, Voicemail};

const SEED_DIRECTORY: &str = include_str!("../data/seed.json");

/// In-memory, ordered, read-only view of the clinic's voicemails, patients
/// and open slots. Lookups are linear scans; nothing here is ever mutated
/// after load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directory {
    #[serde(default)]
    voicemails: Vec<Voicemail>,
    #[serde(default)]
    patients: Vec<Patient>,
    #[serde(default)]
    available_slots: Vec<AvailableSlot>,
}

impl Directory {
    pub fn new(
        voicemails: Vec<Voicemail>,
        patients: Vec<Patient>,
        available_slots: Vec<AvailableSlot>,
    ) -> Self {
        Self {
            voicemails,
            patients,
            available_slots,
        }
    }

    /// Built-in fixture directory shipped with the service.
    pub fn seeded() -> Result<Self> {
        Self::from_json(SEED_DIRECTORY).context("Built-in seed directory is malformed")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let directory: Directory = serde_json::from_str(raw)?;
        debug!(
            "Loaded directory with {} voicemails, {} patients, {} slots",
            directory.voicemails.len(),
            directory.patients.len(),
            directory.available_slots.len()
        );
        Ok(directory)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read directory file {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse directory file {}", path.display()))
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match &config.directory_path {
            Some(path) => {
                info!("Loading directory from {}", path);
                Self::load(path)
            }
            None => {
                info!("DIRECTORY_PATH not set, using built-in seed directory");
                Self::seeded()
            }
        }
    }

    pub fn voicemails(&self) -> &[Voicemail] {
        &self.voicemails
    }

    pub fn voicemail(&self, id: &str) -> Option<&Voicemail> {
        self.voicemails.iter().find(|v| v.id == id)
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn available_slots(&self) -> &[AvailableSlot] {
        &self.available_slots
    }
}
