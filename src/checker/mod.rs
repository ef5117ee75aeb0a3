pub mod dictionary;
pub mod filter;
pub mod languagetool;
pub mod mirror;
pub mod store;

use crate::{Config, FlaggedMatch};
use anyhow::{Context, Result};
use dictionary::TechnicalDictionary;
use filter::Dictionaries;
use languagetool::{GrammarService, LanguageToolClient};
use mirror::{JsonFileMirror, LocalMirror};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::{FileWordStore, HttpWordStore, WordStore};
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, info, warn};

/// Which detector the engine settled on during initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Matches come from the remote grammar service
    Api,
    /// The service was unreachable; checks return no matches
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Uninitialized,
    Initializing,
    Ready(Backend),
}

/// Where the built-in technical terms come from
#[derive(Debug, Clone, Default)]
pub enum TermsSource {
    #[default]
    None,
    File(PathBuf),
    Words(Vec<String>),
}

#[derive(Default)]
struct EngineState {
    learned: HashSet<String>,
    /// Unfiltered service results by cache key
    raw: HashMap<String, Vec<FlaggedMatch>>,
    /// What callers see; always `filter(raw)` after a refilter
    filtered: HashMap<String, Vec<FlaggedMatch>>,
    last_reconciled: Option<Instant>,
}

/// Cache-backed spell checking over a remote grammar service.
///
/// Constructed and owned explicitly by the caller. All operations are
/// fail-open: errors from collaborators are logged and never returned.
pub struct SpellCheckEngine {
    grammar: Arc<dyn GrammarService>,
    store: Arc<dyn WordStore>,
    mirror: Arc<dyn LocalMirror>,
    terms: TermsSource,
    reconcile_interval: Option<Duration>,
    technical: OnceCell<TechnicalDictionary>,
    status: RwLock<EngineStatus>,
    init_lock: Mutex<()>,
    state: RwLock<EngineState>,
}

impl SpellCheckEngine {
    pub fn new(
        grammar: Arc<dyn GrammarService>,
        store: Arc<dyn WordStore>,
        mirror: Arc<dyn LocalMirror>,
    ) -> Self {
        Self {
            grammar,
            store,
            mirror,
            terms: TermsSource::None,
            reconcile_interval: None,
            technical: OnceCell::new(),
            status: RwLock::new(EngineStatus::Uninitialized),
            init_lock: Mutex::new(()),
            state: RwLock::new(EngineState::default()),
        }
    }

    pub fn with_technical_terms(mut self, terms: TermsSource) -> Self {
        self.terms = terms;
        self
    }

    /// Reconcile with the word store on cache misses once this much time has passed
    pub fn with_reconcile_interval(mut self, interval: Option<Duration>) -> Self {
        self.reconcile_interval = interval;
        self
    }

    /// Wire up the HTTP grammar service, word store and mirror described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.request_timeout();

        let grammar = LanguageToolClient::new(
            config.api_endpoint.clone(),
            config.language.clone(),
            timeout,
            config.max_suggestions,
        )
        .context("Failed to build grammar service client")?;

        let store: Arc<dyn WordStore> =
            match (&config.word_store_read_url, &config.word_store_write_url) {
                (Some(read_url), Some(write_url)) => Arc::new(
                    HttpWordStore::new(read_url.clone(), write_url.clone(), timeout)
                        .context("Failed to build word store client")?,
                ),
                _ => Arc::new(FileWordStore::new(
                    config
                        .word_store_path()
                        .context("Failed to determine word store path")?,
                )),
            };

        let mirror = JsonFileMirror::new(
            config
                .mirror_path()
                .context("Failed to determine learned word mirror path")?,
        );

        let terms = match &config.technical_terms {
            Some(path) => TermsSource::File(path.clone()),
            None => TermsSource::None,
        };

        Ok(Self::new(Arc::new(grammar), store, Arc::new(mirror))
            .with_technical_terms(terms)
            .with_reconcile_interval(config.reconcile_interval()))
    }

    pub async fn status(&self) -> EngineStatus {
        *self.status.read().await
    }

    /// Load dictionaries and probe the grammar service. Safe to call repeatedly.
    pub async fn initialize(&self) {
        let _guard = self.init_lock.lock().await;
        if matches!(*self.status.read().await, EngineStatus::Ready(_)) {
            return;
        }
        *self.status.write().await = EngineStatus::Initializing;

        let technical = self.technical().await;
        debug!(terms = technical.len(), "technical dictionary loaded");

        self.sync_learned_words().await;

        let backend = match self.grammar.probe().await {
            Ok(()) => Backend::Api,
            Err(e) => {
                warn!(error = %e, "grammar service unavailable, running on dictionaries only");
                Backend::Degraded
            }
        };

        *self.status.write().await = EngineStatus::Ready(backend);
        info!(?backend, "spell check engine initialized");
    }

    async fn load_technical_terms(&self) -> TechnicalDictionary {
        let loaded = match &self.terms {
            TermsSource::None => return TechnicalDictionary::empty(),
            TermsSource::File(path) => TechnicalDictionary::load_json(path).await,
            TermsSource::Words(words) => TechnicalDictionary::from_words(words),
        };

        loaded.unwrap_or_else(|e| {
            warn!(error = %e, "could not load technical terms");
            TechnicalDictionary::empty()
        })
    }

    /// Loaded on first use, whichever operation gets there first
    async fn technical(&self) -> &TechnicalDictionary {
        self.technical
            .get_or_init(|| self.load_technical_terms())
            .await
    }

    async fn backend(&self) -> Backend {
        if !matches!(self.status().await, EngineStatus::Ready(_)) {
            self.initialize().await;
        }

        match self.status().await {
            EngineStatus::Ready(backend) => backend,
            _ => Backend::Degraded,
        }
    }

    /// Check `text`, returning filtered matches in its char offsets.
    ///
    /// Results are cached by the lowercased, trimmed text. Service failures
    /// are cached as "no matches" rather than reported.
    pub async fn check_text(&self, text: &str) -> Vec<FlaggedMatch> {
        let key = cache_key(text);
        if key.is_empty() {
            return Vec::new();
        }

        let backend = self.backend().await;

        if let Some(hit) = self.state.read().await.filtered.get(&key) {
            debug!(key_len = key.len(), "spell check cache hit");
            return hit.clone();
        }

        if self.reconcile_due().await {
            self.sync_learned_words().await;
        }

        let raw = match backend {
            Backend::Api => self.grammar.check(text).await.unwrap_or_else(|e| {
                warn!(error = %e, "grammar check failed, reporting no matches");
                Vec::new()
            }),
            Backend::Degraded => Vec::new(),
        };

        let technical = self.technical().await;
        let mut state = self.state.write().await;
        let filtered = filter::filter_matches(
            &raw,
            &Dictionaries {
                technical,
                learned: &state.learned,
            },
        );
        debug!(raw = raw.len(), kept = filtered.len(), "checked text");

        state.raw.insert(key.clone(), raw);
        state.filtered.insert(key, filtered.clone());
        filtered
    }

    /// Accept `word` from now on and silence it in every cached result.
    ///
    /// Returns whether the word store persisted it. The in-memory effect
    /// happens regardless, so a store outage only costs durability.
    pub async fn learn_word(&self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return false;
        }
        self.backend().await;

        let persisted = match self.store.add(&word).await {
            Ok(response) => {
                if !response.success {
                    debug!(%word, message = %response.message, "word store did not add word");
                }
                response.success
            }
            Err(e) => {
                warn!(%word, error = %e, "failed to persist learned word");
                false
            }
        };

        let snapshot = {
            let mut state = self.state.write().await;
            state.learned.insert(word.clone());
            sorted(&state.learned)
        };
        if let Err(e) = self.mirror.save(&snapshot).await {
            debug!(error = %e, "failed to write learned word mirror");
        }
        info!(%word, persisted, "learned word");

        if persisted {
            self.sync_learned_words().await;
        } else {
            self.refilter().await;
        }

        persisted
    }

    /// Merge the mirror and the word store into the learned set, then refilter.
    ///
    /// The mirror may lag behind the store until this runs; it is rewritten
    /// only when the store could be read.
    pub async fn reconcile(&self) {
        // A first call initializes, which already syncs once
        self.backend().await;
        self.sync_learned_words().await;
    }

    async fn sync_learned_words(&self) {
        let local = self.mirror.load().await;
        let remote = match self.store.list().await {
            Ok(words) => Some(words),
            Err(e) => {
                warn!(error = %e, "could not read word store, using local mirror");
                None
            }
        };

        let snapshot = {
            let mut state = self.state.write().await;
            let before = state.learned.len();
            state.learned.extend(local.iter().map(|w| normalize(w)));
            if let Some(words) = &remote {
                state.learned.extend(words.iter().map(|w| normalize(w)));
            }
            state.learned.remove("");
            state.last_reconciled = Some(Instant::now());
            debug!(added = state.learned.len().saturating_sub(before), "reconciled learned words");
            sorted(&state.learned)
        };

        if remote.is_some() {
            if let Err(e) = self.mirror.save(&snapshot).await {
                debug!(error = %e, "failed to write learned word mirror");
            }
        }

        self.refilter().await;
    }

    async fn reconcile_due(&self) -> bool {
        let Some(interval) = self.reconcile_interval else {
            return false;
        };

        match self.state.read().await.last_reconciled {
            Some(at) => at.elapsed() >= interval,
            None => true,
        }
    }

    /// Rebuild every filtered entry from its raw matches under the write lock
    async fn refilter(&self) {
        let technical = self.technical().await;
        let mut state = self.state.write().await;
        let dictionaries = Dictionaries {
            technical,
            learned: &state.learned,
        };

        let rebuilt: HashMap<String, Vec<FlaggedMatch>> = state
            .raw
            .iter()
            .map(|(key, raw)| (key.clone(), filter::filter_matches(raw, &dictionaries)))
            .collect();

        state.filtered = rebuilt;
    }

    /// Whether `word` is currently accepted by a dictionary or heuristic
    pub async fn is_accepted(&self, word: &str) -> bool {
        self.backend().await;
        let technical = self.technical().await;
        let state = self.state.read().await;
        Dictionaries {
            technical,
            learned: &state.learned,
        }
        .accepts(word)
    }

    pub async fn learned_words(&self) -> Vec<String> {
        sorted(&self.state.read().await.learned)
    }

    /// Drop both cached mappings
    pub async fn clear_cache(&self) {
        let mut state = self.state.write().await;
        state.raw.clear();
        state.filtered.clear();
    }
}

/// Cache key for a checked text
pub fn cache_key(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

fn sorted(words: &HashSet<String>) -> Vec<String> {
    let mut words: Vec<String> = words.iter().cloned().collect();
    words.sort();
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ServiceError, StoreError};
    use async_trait::async_trait;
    use super::mirror::MemoryMirror;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use super::store::{AddWordResponse, MemoryWordStore};

    /// Grammar service returning canned matches and counting calls
    struct FakeGrammar {
        reachable: bool,
        failing: bool,
        matches: Vec<FlaggedMatch>,
        calls: AtomicUsize,
    }

    impl FakeGrammar {
        fn returning(matches: Vec<FlaggedMatch>) -> Self {
            Self {
                reachable: true,
                failing: false,
                matches,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GrammarService for FakeGrammar {
        async fn probe(&self) -> Result<(), ServiceError> {
            if self.reachable {
                Ok(())
            } else {
                Err(ServiceError::Status(503))
            }
        }

        async fn check(&self, _text: &str) -> Result<Vec<FlaggedMatch>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(ServiceError::Malformed("boom".to_string()));
            }
            Ok(self.matches.clone())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl WordStore for BrokenStore {
        async fn list(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Status(500))
        }

        async fn add(&self, _word: &str) -> Result<AddWordResponse, StoreError> {
            Err(StoreError::Status(500))
        }
    }

    fn typo(word: &str, start: usize) -> FlaggedMatch {
        FlaggedMatch {
            word: word.to_string(),
            start,
            end: start + word.len(),
            suggestions: vec!["The".to_string()],
            message: "Possible spelling mistake found.".to_string(),
            category: Some("TYPOS".to_string()),
            rule_id: Some("X".to_string()),
        }
    }

    fn engine(grammar: Arc<FakeGrammar>) -> SpellCheckEngine {
        SpellCheckEngine::new(
            grammar,
            Arc::new(MemoryWordStore::new()),
            Arc::new(MemoryMirror::new()),
        )
    }

    #[tokio::test]
    async fn test_cache_hit_skips_service() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Teh", 0)]));
        let engine = engine(grammar.clone());

        let first = engine.check_text("Teh quick fox.").await;
        let second = engine.check_text("  teh QUICK fox.  ").await;

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(grammar.calls(), 1);
    }

    #[tokio::test]
    async fn test_learning_refilters_cached_results() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("foo", 0)]));
        let engine = engine(grammar.clone());

        assert_eq!(engine.check_text("foo bar").await.len(), 1);

        assert!(engine.learn_word("foo").await);
        assert!(engine.check_text("foo bar").await.is_empty());
        assert_eq!(grammar.calls(), 1);
    }

    #[tokio::test]
    async fn test_service_failure_is_fail_open() {
        let grammar = Arc::new(FakeGrammar {
            failing: true,
            ..FakeGrammar::returning(vec![typo("Teh", 0)])
        });
        let engine = engine(grammar.clone());

        assert!(engine.check_text("Teh fox").await.is_empty());
        assert!(engine.check_text("Teh fox").await.is_empty());
        assert_eq!(grammar.calls(), 1);
        assert_eq!(engine.status().await, EngineStatus::Ready(Backend::Api));
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades() {
        let grammar = Arc::new(FakeGrammar {
            reachable: false,
            ..FakeGrammar::returning(vec![typo("Teh", 0)])
        });
        let engine = engine(grammar.clone());

        assert_eq!(engine.status().await, EngineStatus::Uninitialized);
        engine.initialize().await;
        engine.initialize().await;
        assert_eq!(engine.status().await, EngineStatus::Ready(Backend::Degraded));

        assert!(engine.check_text("Teh fox").await.is_empty());
        assert_eq!(grammar.calls(), 0);
    }

    #[tokio::test]
    async fn test_learning_survives_store_outage() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Teh", 0)]));
        let mirror = Arc::new(MemoryMirror::new());
        let engine = SpellCheckEngine::new(grammar, Arc::new(BrokenStore), mirror.clone());

        assert_eq!(engine.check_text("Teh fox").await.len(), 1);
        assert!(!engine.learn_word("Teh").await);
        assert!(engine.check_text("Teh fox").await.is_empty());
        assert_eq!(mirror.snapshot(), vec!["teh"]);
    }

    #[tokio::test]
    async fn test_learn_rejects_blank_words() {
        let engine = engine(Arc::new(FakeGrammar::returning(Vec::new())));
        assert!(!engine.learn_word("   ").await);
        assert!(engine.learned_words().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_learn_still_refilters() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Teh", 0)]));
        let store = Arc::new(MemoryWordStore::new());
        let engine = SpellCheckEngine::new(grammar, store.clone(), Arc::new(MemoryMirror::new()));

        assert_eq!(engine.check_text("Teh fox").await.len(), 1);
        store.insert_external("teh");

        assert!(!engine.learn_word("teh").await);
        assert!(engine.check_text("Teh fox").await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_merges_store_and_mirror() {
        let grammar = Arc::new(FakeGrammar::returning(Vec::new()));
        let mirror = Arc::new(MemoryMirror::new());
        mirror.save(&["Localword".to_string()]).await.unwrap();
        let store = Arc::new(MemoryWordStore::with_words(["remoteword"]));

        let engine = SpellCheckEngine::new(grammar, store, mirror.clone());
        engine.initialize().await;

        assert_eq!(engine.learned_words().await, vec!["localword", "remoteword"]);
        assert_eq!(mirror.snapshot(), vec!["localword", "remoteword"]);
    }

    #[tokio::test]
    async fn test_technical_terms_filter() {
        let grammar = Arc::new(FakeGrammar::returning(vec![
            typo("Kubernetes", 0),
            typo("getUserName", 11),
            typo("recieve", 23),
        ]));
        let engine = engine(grammar)
            .with_technical_terms(TermsSource::Words(vec!["kubernetes".to_string()]));

        let kept = engine.check_text("Kubernetes getUserName recieve").await;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].word, "recieve");
        assert!(engine.is_accepted("KUBERNETES").await);
    }

    #[tokio::test]
    async fn test_technical_terms_survive_reconcile_before_initialize() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Kubernetes", 0)]));
        let engine = engine(grammar)
            .with_technical_terms(TermsSource::Words(vec!["kubernetes".to_string()]));

        engine.reconcile().await;
        engine.initialize().await;

        assert!(engine.check_text("Kubernetes rocks").await.is_empty());
        assert!(engine.is_accepted("Kubernetes").await);
    }

    #[tokio::test]
    async fn test_technical_terms_load_on_first_use() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Kubernetes", 0)]));
        let engine = engine(grammar)
            .with_technical_terms(TermsSource::Words(vec!["kubernetes".to_string()]));

        engine.refilter().await;
        assert!(engine.check_text("Kubernetes rocks").await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_terms_file_is_empty_dictionary() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Kubernetes", 0)]));
        let engine = engine(grammar).with_technical_terms(TermsSource::File(PathBuf::from(
            "/nonexistent/technical-terms.json",
        )));

        assert_eq!(engine.check_text("Kubernetes").await.len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_interval_picks_up_external_words() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("helm", 0)]));
        let store = Arc::new(MemoryWordStore::new());
        let engine = SpellCheckEngine::new(grammar, store.clone(), Arc::new(MemoryMirror::new()))
            .with_reconcile_interval(Some(Duration::ZERO));

        assert_eq!(engine.check_text("helm chart").await.len(), 1);

        store.insert_external("helm");
        let kept = engine.check_text("helm install").await;
        assert!(kept.is_empty());
        assert!(engine.check_text("helm chart").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_cache_requeries() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Teh", 0)]));
        let engine = engine(grammar.clone());

        engine.check_text("Teh fox").await;
        engine.clear_cache().await;
        engine.check_text("Teh fox").await;
        assert_eq!(grammar.calls(), 2);
    }

    #[tokio::test]
    async fn test_blank_text_is_not_checked() {
        let grammar = Arc::new(FakeGrammar::returning(vec![typo("Teh", 0)]));
        let engine = engine(grammar.clone());

        assert!(engine.check_text("   ").await.is_empty());
        assert_eq!(grammar.calls(), 0);
    }
}
