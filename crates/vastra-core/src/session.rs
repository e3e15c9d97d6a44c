//! Session store — per-session history and conversation context.
//!
//! The map lock is only held to find, insert or remove entries. Each
//! session carries its own mutex, so turns on different sessions never
//! wait on each other and a whole turn on one session is applied inside a
//! single critical section.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::intent::Intent;
use crate::links::KeywordGroup;

/// Derived per-session state carried between turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationContext {
    /// Intent of the last classified turn.
    pub last_intent: Option<Intent>,
    /// Lower-cased text of the last classified turn.
    pub last_query: String,
    /// Accumulated keywords, most recent last.
    pub keywords: Vec<String>,
    /// Links resolved on the last classified turn.
    pub keyword_links: BTreeSet<KeywordGroup>,
}

/// Session state for a single conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Raw messages, oldest first.
    pub history: Vec<String>,
    pub context: ConversationContext,
    pub last_active_at: DateTime<Utc>,
    /// Set once the session has been evicted from the store.
    #[serde(skip)]
    retired: bool,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            history: Vec::new(),
            context: ConversationContext::default(),
            last_active_at: now,
            retired: false,
        }
    }

    /// Append a message, keeping only the most recent `max` entries.
    pub fn push_history(&mut self, message: &str, max: usize) {
        self.history.push(message.to_string());
        truncate_front(&mut self.history, max);
    }

    /// Overwrite the context after a classified turn.
    pub fn record_context(
        &mut self,
        message: &str,
        intent: Intent,
        keywords: &[String],
        links: BTreeSet<KeywordGroup>,
        max_keywords: usize,
    ) {
        let ctx = &mut self.context;
        ctx.last_intent = Some(intent);
        ctx.last_query = message.to_lowercase();
        ctx.keywords.extend_from_slice(keywords);
        truncate_front(&mut ctx.keywords, max_keywords);
        ctx.keyword_links = links;
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

fn truncate_front(items: &mut Vec<String>, keep: usize) {
    if items.len() > keep {
        let excess = items.len() - keep;
        items.drain(..excess);
    }
}

/// Caps applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_history: usize,
    pub max_keywords: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_history: 15_000,
            max_keywords: 75,
        }
    }
}

/// When and how hard to purge sessions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPolicy {
    /// Hard ceiling on live sessions.
    pub max_sessions: usize,
    /// Fraction of `max_sessions` above which purging starts.
    pub cleanup_threshold: f64,
    /// Idle time after which a session may be dropped.
    pub inactive_timeout: Duration,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            cleanup_threshold: 0.8,
            inactive_timeout: Duration::from_secs(3600),
        }
    }
}

/// What a maintenance pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    /// Sessions dropped for inactivity.
    pub inactive: usize,
    /// Sessions dropped as the oldest quartile.
    pub oldest: usize,
}

impl EvictionReport {
    pub fn total(&self) -> usize {
        self.inactive + self.oldest
    }
}

type Entry = Arc<Mutex<Session>>;

fn lock(entry: &Entry) -> MutexGuard<'_, Session> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lock a session for eviction, or `None` if a turn is writing to it.
fn try_lock(entry: &Entry) -> Option<MutexGuard<'_, Session>> {
    match entry.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

fn idle_longer_than(session: &Session, now: DateTime<Utc>, timeout: Duration) -> bool {
    let idle = now.signed_duration_since(session.last_active_at);
    idle.num_milliseconds() > timeout.as_millis() as i64
}

/// Process-wide store of live sessions.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    limits: SessionLimits,
    evicted_total: AtomicU64,
}

impl SessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limits,
            evicted_total: AtomicU64::new(0),
        }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    fn entry(&self, key: &str, now: DateTime<Utc>) -> Entry {
        {
            let map = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = map.get(key) {
                return Arc::clone(entry);
            }
        }
        let mut map = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(now)))),
        )
    }

    /// Get a copy of a session, creating it on first access.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Session {
        self.with_session(key, now, |session| session.clone())
    }

    /// Copy of a session if it exists. Never creates one.
    pub fn snapshot(&self, key: &str) -> Option<Session> {
        let entry = {
            let map = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            map.get(key).cloned()
        }?;
        let session = lock(&entry);
        (!session.retired).then(|| session.clone())
    }

    /// Run `f` on the locked session, creating it if needed, after
    /// refreshing `last_active_at`.
    ///
    /// If the entry was evicted between lookup and locking, the call
    /// retries on a fresh entry so the update never lands in a dropped
    /// session.
    pub fn with_session<R>(
        &self,
        key: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> R,
    ) -> R {
        loop {
            let entry = self.entry(key, now);
            let mut session = lock(&entry);
            if session.retired {
                debug!(session = key, "session retired under us, retrying");
                continue;
            }
            session.last_active_at = now;
            return f(&mut session);
        }
    }

    /// Refresh `last_active_at` of an existing session. Never creates one.
    ///
    /// Returns false if the key is unknown or the session was evicted.
    pub fn touch(&self, key: &str, now: DateTime<Utc>) -> bool {
        let entry = {
            let map = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            map.get(key).cloned()
        };
        let Some(entry) = entry else {
            return false;
        };
        let mut session = lock(&entry);
        if session.retired {
            return false;
        }
        session.last_active_at = now;
        true
    }

    /// Append a message and overwrite the context in one step.
    pub fn record_turn(
        &self,
        key: &str,
        message: &str,
        intent: Intent,
        keywords: &[String],
        links: BTreeSet<KeywordGroup>,
        now: DateTime<Utc>,
    ) {
        let limits = self.limits;
        self.with_session(key, now, |session| {
            session.push_history(message, limits.max_history);
            session.record_context(message, intent, keywords, links, limits.max_keywords);
        });
    }

    /// Append a message without touching the context.
    pub fn touch_history(&self, key: &str, message: &str, now: DateTime<Utc>) {
        let max = self.limits.max_history;
        self.with_session(key, now, |session| session.push_history(message, max));
    }

    /// Drop every session idle for longer than `timeout`.
    ///
    /// Sessions locked by an in-flight turn are skipped.
    pub fn evict_inactive(&self, now: DateTime<Utc>, timeout: Duration) -> usize {
        let mut map = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let removed = Self::evict_idle_locked(&mut map, now, timeout);
        self.note_evicted(removed);
        removed
    }

    fn evict_idle_locked(
        map: &mut HashMap<String, Entry>,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> usize {
        let before = map.len();
        map.retain(|_, entry| match try_lock(entry) {
            Some(mut session) if idle_longer_than(&session, now, timeout) => {
                session.retired = true;
                false
            }
            _ => true,
        });
        before - map.len()
    }

    /// Keep the live session count under `policy.max_sessions`.
    ///
    /// Past the cleanup threshold, idle sessions go first. If the store is
    /// still over the hard maximum, the oldest quarter by `last_active_at`
    /// is dropped regardless of activity.
    pub fn enforce_capacity(&self, now: DateTime<Utc>, policy: CapacityPolicy) -> EvictionReport {
        let mut report = EvictionReport::default();
        let high_water = policy.max_sessions as f64 * policy.cleanup_threshold;

        if self.len() as f64 <= high_water {
            return report;
        }

        let mut map = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        report.inactive = Self::evict_idle_locked(&mut map, now, policy.inactive_timeout);

        if map.len() > policy.max_sessions {
            let quota = map.len() / 4;
            let mut ages: Vec<(String, DateTime<Utc>)> = map
                .iter()
                .filter_map(|(key, entry)| try_lock(entry).map(|s| (key.clone(), s.last_active_at)))
                .collect();
            ages.sort_by_key(|(_, at)| *at);

            for (key, seen_at) in ages.into_iter().take(quota) {
                let Some(entry) = map.get(&key).cloned() else {
                    continue;
                };
                let Some(mut session) = try_lock(&entry) else {
                    continue;
                };
                if session.last_active_at != seen_at {
                    continue;
                }
                session.retired = true;
                drop(session);
                map.remove(&key);
                report.oldest += 1;
            }
        }

        drop(map);
        self.note_evicted(report.total());
        if report.total() > 0 {
            info!(
                inactive = report.inactive,
                oldest = report.oldest,
                live = self.len(),
                "session capacity enforced"
            );
        }
        report
    }

    fn note_evicted(&self, n: usize) {
        self.evicted_total.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Sessions evicted since the store was created.
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total.load(Ordering::Relaxed)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live session keys.
    pub fn keys(&self) -> Vec<String> {
        let map = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        map.keys().cloned().collect()
    }

    /// Periodically enforce `policy` in the background.
    ///
    /// Returns the task handle and a sender; sending `()` (or dropping the
    /// sender) stops the task after its current pass.
    pub fn start_sweeper(
        self: &Arc<Self>,
        every: Duration,
        policy: CapacityPolicy,
    ) -> (tokio::task::JoinHandle<()>, tokio::sync::mpsc::Sender<()>) {
        let store = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = Utc::now();
                        let idle = store.evict_inactive(now, policy.inactive_timeout);
                        let report = store.enforce_capacity(now, policy);
                        if idle > 0 {
                            info!(evicted = idle, live = store.len(), "swept idle sessions");
                        }
                        debug!(?report, "session sweep done");
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Session sweeper received shutdown signal, stopping");
                        break;
                    }
                }
            }
        });

        (handle, shutdown_tx)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionLimits::default())
    }
}
