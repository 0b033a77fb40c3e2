use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info, warn};

use analysis_cell::api::ExtractionEngine;
use analysis_cell::{AnalysisError, AnalysisResult};
use patient_cell::resolve_candidates;
use shared_database::Directory;
use shared_models::Voicemail;

use crate::models::{CacheEntry, CacheError, CacheStats};

type InFlight = Shared<BoxFuture<'static, CacheEntry>>;

struct Slot {
    /// Bumped by every retry; a settlement carrying an older generation is
    /// discarded.
    generation: u64,
    entry: CacheEntry,
    in_flight: Option<InFlight>,
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    extractions_started: AtomicU64,
    stale_results_discarded: AtomicU64,
}

/// Session-lifetime cache of analyses keyed by voicemail id.
///
/// At most one extraction per id is outstanding at any time: callers that
/// arrive while an entry is Pending attach to the same shared in-flight
/// future. Resolved entries are served forever; Failed entries are kept
/// until a caller asks for a retry.
#[derive(Clone)]
pub struct AnalysisCache {
    engine: Arc<ExtractionEngine>,
    directory: Arc<Directory>,
    slots: Arc<RwLock<HashMap<String, Slot>>>,
    permits: Arc<Semaphore>,
    counters: Arc<CacheCounters>,
}

impl AnalysisCache {
    pub fn new(
        engine: Arc<ExtractionEngine>,
        directory: Arc<Directory>,
        max_concurrent_extractions: usize,
    ) -> Self {
        Self {
            engine,
            directory,
            slots: Arc::new(RwLock::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(max_concurrent_extractions.max(1))),
            counters: Arc::new(CacheCounters::default()),
        }
    }

    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Current entry for `voicemail_id`, starting an extraction on first access.
    pub async fn get_or_fetch(&self, voicemail_id: &str) -> Result<CacheEntry, CacheError> {
        let voicemail = self.voicemail(voicemail_id)?;
        let mut slots = self.slots.write().await;
        let (entry, _) = self.entry_or_start(&mut slots, voicemail);
        Ok(entry)
    }

    /// One entry per known id, taken under a single lock. Unknown ids are
    /// left out of the map.
    pub async fn get_or_fetch_all<I, S>(&self, voicemail_ids: I) -> HashMap<String, CacheEntry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slots = self.slots.write().await;
        let mut entries = HashMap::new();

        for id in voicemail_ids {
            let id = id.as_ref();
            match self.directory.voicemail(id) {
                Some(voicemail) => {
                    let (entry, _) = self.entry_or_start(&mut slots, voicemail);
                    entries.insert(id.to_string(), entry);
                }
                None => warn!("Skipping unknown voicemail {} in bulk fetch", id),
            }
        }

        entries
    }

    /// Like [`get_or_fetch`](Self::get_or_fetch), but waits for a Pending
    /// entry to settle.
    pub async fn resolve(&self, voicemail_id: &str) -> Result<CacheEntry, CacheError> {
        let voicemail = self.voicemail(voicemail_id)?;
        let (entry, in_flight) = {
            let mut slots = self.slots.write().await;
            self.entry_or_start(&mut slots, voicemail)
        };

        Ok(match in_flight {
            Some(in_flight) => in_flight.await,
            None => entry,
        })
    }

    pub async fn resolve_all<I, S>(&self, voicemail_ids: I) -> HashMap<String, CacheEntry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<String> = voicemail_ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| self.directory.voicemail(id).is_some())
            .collect();

        let settled = join_all(ids.iter().map(|id| self.resolve(id))).await;

        ids.into_iter()
            .zip(settled)
            .filter_map(|(id, entry)| entry.ok().map(|entry| (id, entry)))
            .collect()
    }

    /// Caller-initiated retry. A retryable Failed (or never-fetched) entry
    /// re-enters Pending under a new generation; Pending, Resolved and
    /// terminally Failed entries are returned untouched.
    pub async fn retry(&self, voicemail_id: &str) -> Result<CacheEntry, CacheError> {
        let voicemail = self.voicemail(voicemail_id)?;
        let mut slots = self.slots.write().await;

        let generation = match slots.get(voicemail_id) {
            Some(slot) if slot.entry.is_retryable() => slot.generation + 1,
            Some(slot) => return Ok(slot.entry.clone()),
            None => 1,
        };

        info!("Retrying analysis for voicemail {} (attempt {})", voicemail_id, generation);
        let slot = self.start(voicemail, generation);
        slots.insert(voicemail_id.to_string(), slot);
        Ok(CacheEntry::Pending)
    }

    /// Entry without triggering a fetch.
    pub async fn peek(&self, voicemail_id: &str) -> Option<CacheEntry> {
        self.slots
            .read()
            .await
            .get(voicemail_id)
            .map(|slot| slot.entry.clone())
    }

    pub async fn stats(&self) -> CacheStats {
        let slots = self.slots.read().await;
        let mut stats = CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            extractions_started: self.counters.extractions_started.load(Ordering::Relaxed),
            stale_results_discarded: self.counters.stale_results_discarded.load(Ordering::Relaxed),
            total_entries: slots.len() as u64,
            ..CacheStats::default()
        };

        for slot in slots.values() {
            match slot.entry {
                CacheEntry::Pending => stats.pending += 1,
                CacheEntry::Resolved(_) => stats.resolved += 1,
                CacheEntry::Failed { .. } => stats.failed += 1,
            }
        }

        let lookups = stats.hits + stats.misses;
        if lookups > 0 {
            stats.hit_rate = stats.hits as f64 / lookups as f64;
        }
        stats
    }

    fn voicemail(&self, voicemail_id: &str) -> Result<&Voicemail, CacheError> {
        self.directory
            .voicemail(voicemail_id)
            .ok_or_else(|| CacheError::UnknownVoicemail(voicemail_id.to_string()))
    }

    fn entry_or_start(
        &self,
        slots: &mut HashMap<String, Slot>,
        voicemail: &Voicemail,
    ) -> (CacheEntry, Option<InFlight>) {
        if let Some(slot) = slots.get(&voicemail.id) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return (slot.entry.clone(), slot.in_flight.clone());
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let slot = self.start(voicemail, 1);
        let in_flight = slot.in_flight.clone();
        slots.insert(voicemail.id.clone(), slot);
        (CacheEntry::Pending, in_flight)
    }

    /// Spawn the extraction for `voicemail` and return its Pending slot.
    /// Must be called with the slot map write-locked.
    fn start(&self, voicemail: &Voicemail, generation: u64) -> Slot {
        self.counters.extractions_started.fetch_add(1, Ordering::Relaxed);

        let candidates = resolve_candidates(&voicemail.caller_number, self.directory.patients());
        let request = self.engine.request(voicemail.transcript.clone(), candidates);
        let voicemail_id = voicemail.id.clone();
        let cache = self.clone();

        debug!(
            "Starting extraction for voicemail {} (generation {})",
            voicemail_id, generation
        );

        let in_flight = async move {
            let outcome = match cache.permits.acquire().await {
                Ok(_permit) => cache.engine.extract(&request).await,
                Err(_) => Err(AnalysisError::Extraction("extraction queue closed".to_string())),
            };
            cache.settle(&voicemail_id, generation, outcome).await
        }
        .boxed()
        .shared();

        tokio::spawn(in_flight.clone());

        Slot {
            generation,
            entry: CacheEntry::Pending,
            in_flight: Some(in_flight),
        }
    }

    /// Record the outcome of one extraction attempt. Only the current
    /// generation may write; anything older is dropped and the current entry
    /// is returned instead.
    async fn settle(
        &self,
        voicemail_id: &str,
        generation: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> CacheEntry {
        let entry = match outcome {
            Ok(result) => CacheEntry::Resolved(Arc::new(result)),
            Err(e) => {
                warn!("Analysis failed for voicemail {}: {}", voicemail_id, e);
                CacheEntry::failed(failure_message(&e), e.is_retryable())
            }
        };

        let mut slots = self.slots.write().await;
        match slots.get_mut(voicemail_id) {
            Some(slot) if slot.generation == generation => {
                debug!("Voicemail {} settled (generation {})", voicemail_id, generation);
                slot.entry = entry.clone();
                slot.in_flight = None;
                entry
            }
            Some(slot) => {
                self.counters.stale_results_discarded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Discarding stale result for voicemail {} (generation {} superseded by {})",
                    voicemail_id, generation, slot.generation
                );
                slot.entry.clone()
            }
            None => entry,
        }
    }
}

fn failure_message(err: &AnalysisError) -> String {
    match err {
        AnalysisError::Extraction(_) => "Analysis failed, please retry".to_string(),
        other => other.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use analysis_cell::api::{GenerativeClient, PromptContext};
    use analysis_cell::{GenerationError, Intent};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::Value;
    use shared_utils::test_utils::{MockGeminiResponses, TestDirectory};

    /// Generative client that answers from a script and can be held shut.
    struct ScriptedClient {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        script: Mutex<VecDeque<Result<Value, String>>>,
        fallback: Value,
        gate: Semaphore,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(open: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                script: Mutex::new(VecDeque::new()),
                fallback: MockGeminiResponses::prescription(),
                gate: Semaphore::new(if open { 1_000 } else { 0 }),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }

        fn then(self: &Arc<Self>, response: Result<Value, &str>) -> Arc<Self> {
            self.script
                .lock()
                .unwrap()
                .push_back(response.map_err(str::to_string));
            Arc::clone(self)
        }

        fn open(&self) {
            self.gate.add_permits(1_000);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeClient for ScriptedClient {
        async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Value, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let _permit = self.gate.acquire().await;
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(value)) => Ok(value),
                Some(Err(message)) => Err(GenerationError::Unavailable(message)),
                None => Ok(self.fallback.clone()),
            }
        }
    }

    fn cache_with(client: &Arc<ScriptedClient>, max_concurrent: usize) -> AnalysisCache {
        let engine = ExtractionEngine::new(
            Arc::clone(client) as Arc<dyn GenerativeClient>,
            PromptContext::default(),
        );
        AnalysisCache::new(Arc::new(engine), TestDirectory::seeded(), max_concurrent)
    }

    #[tokio::test]
    async fn test_first_access_is_pending_then_resolves() {
        let client = ScriptedClient::new(false);
        let cache = cache_with(&client, 4);

        assert_eq!(cache.get_or_fetch("2").await.unwrap(), CacheEntry::Pending);

        client.open();
        let entry = cache.resolve("2").await.unwrap();
        assert_eq!(entry.analysis().unwrap().intent, Intent::Prescription);
        assert_eq!(cache.peek("2").await, Some(entry));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_extraction() {
        let client = ScriptedClient::new(false);
        let cache = cache_with(&client, 4);

        for _ in 0..5 {
            assert!(cache.get_or_fetch("1").await.unwrap().is_pending());
        }
        let waiters = join_all((0..5).map(|_| cache.resolve("1")));

        client.open();
        let settled = waiters.await;

        assert_eq!(client.calls(), 1);
        assert!(settled.iter().all(|e| e.as_ref().unwrap().analysis().is_some()));
        assert_eq!(cache.stats().await.extractions_started, 1);
    }

    #[tokio::test]
    async fn test_resolved_entry_is_reused_without_new_call() {
        let client = ScriptedClient::new(true);
        let cache = cache_with(&client, 4);

        let first = cache.resolve("2").await.unwrap();
        for _ in 0..3 {
            assert_eq!(cache.get_or_fetch("2").await.unwrap(), first);
        }

        assert_eq!(client.calls(), 1);
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.resolved, 1);
    }

    #[tokio::test]
    async fn test_failure_is_retained_not_retried_automatically() {
        let client = ScriptedClient::new(true).then(Err("upstream timed out"));
        let cache = cache_with(&client, 4);

        let entry = cache.resolve("3").await.unwrap();
        assert_matches!(entry, CacheEntry::Failed { retryable: true, .. });

        assert!(cache.get_or_fetch("3").await.unwrap().is_failed());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure_issues_new_extraction() {
        let client = ScriptedClient::new(true).then(Err("upstream timed out"));
        let cache = cache_with(&client, 4);

        assert!(cache.resolve("3").await.unwrap().is_failed());
        assert_eq!(cache.retry("3").await.unwrap(), CacheEntry::Pending);

        let entry = cache.resolve("3").await.unwrap();
        assert!(entry.analysis().is_some());
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_overwrite_retry_success() {
        let client = ScriptedClient::new(true).then(Err("first attempt"));
        let cache = cache_with(&client, 4);

        assert!(cache.resolve("3").await.unwrap().is_failed());
        cache.retry("3").await.unwrap();
        let retried = cache.resolve("3").await.unwrap();
        assert!(retried.analysis().is_some());

        // A late callback from generation 1 arrives after the retry resolved.
        let late = cache
            .settle("3", 1, Err(AnalysisError::Extraction("late failure".into())))
            .await;

        assert_eq!(late, retried);
        assert_eq!(cache.peek("3").await, Some(retried));
        assert_eq!(cache.stats().await.stale_results_discarded, 1);
    }

    #[tokio::test]
    async fn test_retry_on_pending_attaches_and_on_resolved_is_noop() {
        let client = ScriptedClient::new(false);
        let cache = cache_with(&client, 4);

        cache.get_or_fetch("4").await.unwrap();
        assert_eq!(cache.retry("4").await.unwrap(), CacheEntry::Pending);

        client.open();
        let resolved = cache.resolve("4").await.unwrap();
        assert_eq!(cache.retry("4").await.unwrap(), resolved);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_voicemail() {
        let client = ScriptedClient::new(true);
        let cache = cache_with(&client, 4);

        assert_matches!(cache.get_or_fetch("nope").await, Err(CacheError::UnknownVoicemail(_)));
        assert_matches!(cache.retry("nope").await, Err(CacheError::UnknownVoicemail(_)));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_bulk_fetch_entries_resolve_independently() {
        let client = ScriptedClient::new(true)
            .then(Ok(MockGeminiResponses::emergency(None)))
            .then(Err("model returned garbage"));
        let cache = cache_with(&client, 1);

        let snapshot = cache.get_or_fetch_all(["1", "2", "missing"]).await;
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.values().all(CacheEntry::is_pending));

        let settled = cache.resolve_all(["1", "2"]).await;
        let failed = settled.values().filter(|e| e.is_failed()).count();
        let resolved = settled.values().filter(|e| e.analysis().is_some()).count();
        assert_eq!((failed, resolved), (1, 1));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_candidates_from_caller_number_reach_prompt() {
        let client = ScriptedClient::new(true);
        let cache = cache_with(&client, 4);

        cache.resolve("6").await.unwrap();

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("Priya Patel"));
        assert!(prompts[0].contains("Arjun Patel"));
        assert!(!prompts[0].contains("Michael Chang"));
    }

    #[tokio::test]
    async fn test_concurrency_cap_is_respected() {
        let client = ScriptedClient::new(true);
        let cache = cache_with(&client, 1);

        cache.resolve_all(["1", "2", "3", "4", "5"]).await;

        assert_eq!(client.calls(), 5);
        assert_eq!(client.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_engine_fails_entry_with_generic_message() {
        let engine = ExtractionEngine::unconfigured(PromptContext::default());
        let cache = AnalysisCache::new(Arc::new(engine), TestDirectory::seeded(), 2);

        let entry = cache.resolve("1").await.unwrap();
        assert_eq!(entry.error(), Some("Analysis service is not configured"));
        assert!(!entry.is_retryable());
    }

    #[tokio::test]
    async fn test_retry_leaves_terminal_failure_alone() {
        let engine = ExtractionEngine::unconfigured(PromptContext::default());
        let cache = AnalysisCache::new(Arc::new(engine), TestDirectory::seeded(), 2);

        let failed = cache.resolve("1").await.unwrap();
        assert_eq!(cache.retry("1").await.unwrap(), failed);
        assert_eq!(cache.peek("1").await, Some(failed));
        assert_eq!(cache.stats().await.extractions_started, 1);
    }

    #[tokio::test]
    async fn test_blank_transcript_failure_is_terminal() {
        let client = ScriptedClient::new(true);
        let engine = ExtractionEngine::new(
            Arc::clone(&client) as Arc<dyn GenerativeClient>,
            PromptContext::default(),
        );
        let directory = TestDirectory::with(
            vec![TestDirectory::voicemail("9", "Unknown", "0400 000 000", "   ")],
            Vec::new(),
        );
        let cache = AnalysisCache::new(Arc::new(engine), directory, 2);

        let entry = cache.resolve("9").await.unwrap();
        assert_matches!(entry, CacheEntry::Failed { retryable: false, .. });
        assert_eq!(entry.error(), Some("Transcript is required"));

        cache.retry("9").await.unwrap();
        assert_eq!(client.calls(), 0);
        assert_eq!(cache.stats().await.extractions_started, 1);
    }
}
