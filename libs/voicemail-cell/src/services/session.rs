use std::collections::HashSet;

use tokio::sync::RwLock;
use tracing::info;

use shared_models::Voicemail;

/// Per-session triage state: which voicemails staff have archived.
#[derive(Debug, Default)]
pub struct InboxSession {
    archived: RwLock<HashSet<String>>,
}

impl InboxSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the voicemail was already archived.
    pub async fn archive(&self, voicemail_id: &str) -> bool {
        let added = self.archived.write().await.insert(voicemail_id.to_string());
        if added {
            info!("Archived voicemail {}", voicemail_id);
        }
        added
    }

    /// Returns false if the voicemail was not archived.
    pub async fn restore(&self, voicemail_id: &str) -> bool {
        let removed = self.archived.write().await.remove(voicemail_id);
        if removed {
            info!("Restored voicemail {} to inbox", voicemail_id);
        }
        removed
    }

    pub async fn is_archived(&self, voicemail_id: &str) -> bool {
        self.archived.read().await.contains(voicemail_id)
    }

    pub async fn archived_ids(&self) -> HashSet<String> {
        self.archived.read().await.clone()
    }

    pub async fn inbox_count(&self, voicemails: &[Voicemail]) -> usize {
        let archived = self.archived.read().await;
        voicemails.iter().filter(|v| !archived.contains(&v.id)).count()
    }
}
