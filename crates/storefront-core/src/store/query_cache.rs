// ── Keyed query cache ──
//
// One `DashMap` entry per logical query key. Each entry remembers the last
// committed value, when it was committed, and at most one in-flight fetch.
// Concurrent readers of the same key share that fetch through a `Shared`
// future. Every invalidation or forced write gives the entry a fresh
// generation from a cache-wide counter; a fetch only commits if the
// generation it launched under is still current.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::QueryKey;
use crate::config::QueryPolicy;
use crate::error::CoreError;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

type FetchResult<T> = Result<Arc<T>, CoreError>;
type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

struct InFlight<T> {
    id: u64,
    future: SharedFetch<T>,
}

struct Entry<T> {
    data: Option<Arc<T>>,
    updated_at: Option<Instant>,
    generation: u64,
    invalidated: bool,
    in_flight: Option<InFlight<T>>,
}

impl<T> Entry<T> {
    fn new(generation: u64) -> Self {
        Self {
            data: None,
            updated_at: None,
            generation,
            invalidated: false,
            in_flight: None,
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated
            && self.data.is_some()
            && self
                .updated_at
                .is_some_and(|at| at.elapsed() < stale_time)
    }
}

struct Inner<T> {
    name: &'static str,
    entries: DashMap<QueryKey, Entry<T>>,
    next_fetch_id: AtomicU64,
    /// Shared by every entry so a key recreated after `remove` never
    /// reuses a generation an orphaned fetch was launched under.
    next_generation: AtomicU64,
    version: watch::Sender<u64>,
}

/// Cache of query results of one payload type.
///
/// Cloning is cheap and yields a handle to the same entries.
pub struct QueryCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(name: &'static str) -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(Inner {
                name,
                entries: DashMap::new(),
                next_fetch_id: AtomicU64::new(1),
                next_generation: AtomicU64::new(1),
                version,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Last committed value, straight from memory. Never fetches.
    pub fn read(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.inner.entries.get(key).and_then(|e| e.data.clone())
    }

    /// `true` when the next `ensure_fresh` would go to the network.
    pub fn is_stale(&self, key: &QueryKey, policy: &QueryPolicy) -> bool {
        self.inner
            .entries
            .get(key)
            .is_none_or(|e| !e.is_fresh(policy.stale_time))
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .get(key)
            .is_some_and(|e| e.in_flight.is_some())
    }

    /// Return the cached value if fresh, join the in-flight fetch if one
    /// exists, otherwise launch a fetch.
    pub async fn ensure_fresh<F, Fut>(
        &self,
        key: &QueryKey,
        policy: &QueryPolicy,
        fetcher: F,
    ) -> FetchResult<T>
    where
        F: Fn(Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        self.run(key, policy, false, fetcher).await
    }

    /// Like [`ensure_fresh`](Self::ensure_fresh) but ignores the staleness
    /// window. Still joins a fetch already in flight.
    pub async fn refetch<F, Fut>(
        &self,
        key: &QueryKey,
        policy: &QueryPolicy,
        fetcher: F,
    ) -> FetchResult<T>
    where
        F: Fn(Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        self.run(key, policy, true, fetcher).await
    }

    /// Stale-while-revalidate: hand back whatever is cached right now and,
    /// if that value is stale, refresh it on a background task.
    pub fn read_and_revalidate<F, Fut>(
        &self,
        key: &QueryKey,
        policy: &QueryPolicy,
        fetcher: F,
    ) -> Option<Arc<T>>
    where
        F: Fn(Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let cached = self.read(key);
        if self.is_stale(key, policy) && !self.is_fetching(key) {
            let cache = self.clone();
            let key = key.clone();
            let policy = *policy;
            tokio::spawn(async move {
                if let Err(err) = cache.ensure_fresh(&key, &policy, fetcher).await {
                    debug!(cache = cache.name(), %key, error = %err, "background refresh failed");
                }
            });
        }
        cached
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Mark every entry under `prefix` stale and detach its in-flight fetch.
    ///
    /// Returns how many entries were touched; zero for unknown keys.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut touched = 0;
        for mut entry in self.inner.entries.iter_mut() {
            if entry.key().starts_with(prefix) {
                let entry = entry.value_mut();
                entry.generation = self.inner.next_generation();
                entry.invalidated = true;
                entry.in_flight = None;
                touched += 1;
            }
        }
        if touched > 0 {
            debug!(cache = self.inner.name, %prefix, touched, "invalidated");
            self.bump_version();
        }
        touched
    }

    /// Force-set a value, superseding any fetch in flight for `key`.
    pub fn set(&self, key: &QueryKey, value: T) {
        {
            let mut entry = self.entry(key);
            entry.generation = self.inner.next_generation();
            entry.data = Some(Arc::new(value));
            entry.updated_at = Some(Instant::now());
            entry.invalidated = false;
            entry.in_flight = None;
        }
        debug!(cache = self.inner.name, %key, "value set");
        self.bump_version();
    }

    /// Drop every entry under `prefix`, data included.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let before = self.inner.entries.len();
        self.inner.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.inner.entries.len());
        if removed > 0 {
            debug!(cache = self.inner.name, %prefix, removed, "removed");
            self.bump_version();
        }
        removed
    }

    /// Version counter bumped on every commit, invalidation, or removal.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn run<F, Fut>(
        &self,
        key: &QueryKey,
        policy: &QueryPolicy,
        force: bool,
        fetcher: F,
    ) -> FetchResult<T>
    where
        F: Fn(Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let shared = {
            let mut entry = self.entry(key);
            if let Some(flight) = &entry.in_flight {
                trace!(cache = self.inner.name, %key, "joining in-flight fetch");
                flight.future.clone()
            } else if let Some(data) = entry
                .data
                .as_ref()
                .filter(|_| !force && entry.is_fresh(policy.stale_time))
            {
                trace!(cache = self.inner.name, %key, "cache hit");
                return Ok(Arc::clone(data));
            } else {
                let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                debug!(cache = self.inner.name, %key, id, "fetching");
                let future = Arc::clone(&self.inner)
                    .launch(
                        key.clone(),
                        id,
                        entry.generation,
                        entry.data.clone(),
                        *policy,
                        fetcher,
                    )
                    .boxed()
                    .shared();
                entry.in_flight = Some(InFlight {
                    id,
                    future: future.clone(),
                });
                future
            }
        };
        shared.await
    }

    fn entry(&self, key: &QueryKey) -> RefMut<'_, QueryKey, Entry<T>> {
        self.inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(self.inner.next_generation()))
    }

    fn bump_version(&self) {
        self.inner.version.send_modify(|v| *v += 1);
    }
}

impl<T: Send + Sync + 'static> Inner<T> {
    fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    async fn launch<F, Fut>(
        self: Arc<Self>,
        key: QueryKey,
        id: u64,
        generation: u64,
        previous: Option<Arc<T>>,
        policy: QueryPolicy,
        fetcher: F,
    ) -> FetchResult<T>
    where
        F: Fn(Option<Arc<T>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let mut attempt = 0u32;
        let result = loop {
            match fetcher(previous.clone()).await {
                Ok(value) => break Ok(Arc::new(value)),
                Err(err) if err.is_transient() && attempt < policy.retry => {
                    let delay = backoff(policy.retry_delay, attempt);
                    attempt += 1;
                    debug!(cache = self.name, %key, attempt, ?delay, error = %err, "retrying fetch");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => break Err(err),
            }
        };
        self.settle(&key, id, generation, &result);
        result
    }

    /// Record a finished fetch. The in-flight slot is only cleared by the
    /// fetch that owns it; data is only committed under the launch generation.
    fn settle(&self, key: &QueryKey, id: u64, generation: u64, result: &FetchResult<T>) {
        let committed = {
            let Some(mut entry) = self.entries.get_mut(key) else {
                debug!(cache = self.name, %key, "entry removed while fetching, discarding result");
                return;
            };
            if entry.in_flight.as_ref().is_some_and(|f| f.id == id) {
                entry.in_flight = None;
            }
            if entry.generation != generation {
                debug!(cache = self.name, %key, id, "discarding stale result");
                return;
            }
            match result {
                Ok(value) => {
                    entry.data = Some(Arc::clone(value));
                    entry.updated_at = Some(Instant::now());
                    entry.invalidated = false;
                    true
                }
                Err(err) => {
                    debug!(cache = self.name, %key, error = %err, "fetch failed, keeping previous value");
                    false
                }
            }
        };
        if committed {
            self.version.send_modify(|v| *v += 1);
        }
    }
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}
