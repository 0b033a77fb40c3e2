use std::collections::{HashMap, HashSet};

use analysis_cache_cell::CacheEntry;
use analysis_cell::{ClosedEnum, Urgency};
use shared_models::Voicemail;

use crate::models::{InboxView, VoicemailListQuery};

/// Listing criteria. A voicemail whose analysis is not Resolved never
/// satisfies an intent or urgency filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoicemailFilter {
    pub view: InboxView,
    pub search: Option<String>,
    pub intent: Option<String>,
    pub urgency: Option<Urgency>,
}

impl VoicemailFilter {
    pub fn from_query(query: VoicemailListQuery) -> Result<Self, String> {
        let urgency = match non_blank(query.urgency) {
            Some(raw) => Some(Urgency::parse(&raw).ok_or_else(|| {
                format!("Unknown urgency {:?}; expected one of {}", raw, Urgency::labels().join(", "))
            })?),
            None => None,
        };

        Ok(Self {
            view: query.view.unwrap_or_default(),
            search: non_blank(query.search),
            intent: non_blank(query.intent),
            urgency,
        })
    }

    pub fn matches(&self, voicemail: &Voicemail, entry: Option<&CacheEntry>, archived: bool) -> bool {
        let in_view = match self.view {
            InboxView::Inbox => !archived,
            InboxView::Resolved => archived,
        };
        let analysis = entry.and_then(CacheEntry::analysis);

        in_view
            && self.matches_search(voicemail, entry)
            && self.intent.as_deref().map_or(true, |intent| {
                analysis.is_some_and(|a| {
                    a.intent.as_str().eq_ignore_ascii_case(intent)
                        || voicemail.transcript.to_lowercase().contains(&intent.to_lowercase())
                })
            })
            && self
                .urgency
                .map_or(true, |urgency| analysis.is_some_and(|a| a.urgency == urgency))
    }

    fn matches_search(&self, voicemail: &Voicemail, entry: Option<&CacheEntry>) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let lowered = term.to_lowercase();
        let analysis = entry.and_then(CacheEntry::analysis);
        let summary = analysis.map(|a| a.summary.to_lowercase()).unwrap_or_default();
        let urgency = analysis.map(|a| a.urgency.as_str().to_lowercase()).unwrap_or_default();

        voicemail.caller_name.to_lowercase().contains(&lowered)
            || voicemail.caller_number.contains(term)
            || voicemail.transcript.to_lowercase().contains(&lowered)
            || summary.contains(&lowered)
            || urgency.contains(&lowered)
    }
}

/// Voicemails passing `filter`, newest first.
pub fn filter_and_sort<'a>(
    voicemails: &'a [Voicemail],
    entries: &HashMap<String, CacheEntry>,
    archived: &HashSet<String>,
    filter: &VoicemailFilter,
) -> Vec<&'a Voicemail> {
    let mut selected: Vec<&Voicemail> = voicemails
        .iter()
        .filter(|v| filter.matches(v, entries.get(&v.id), archived.contains(&v.id)))
        .collect();

    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    selected
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
