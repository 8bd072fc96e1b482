//! Keyed read-through cache with request deduplication and
//! stale-while-revalidate refreshes.
//!
//! [`QueryCache`] owns every cached value for one endpoint. Nothing outside
//! this module writes into it; callers only ever see [`QueryState`]
//! snapshots. [`Query`] is a single subscriber (one view) that tracks the
//! key it most recently asked for and ignores responses for any other key.

use crate::core::api::ApiError;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

/// Performs the network round trip for one key.
pub type FetchFn<K, V> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<V, ApiError>> + Send + Sync>;

type InFlight<V> = Shared<BoxFuture<'static, Result<Arc<V>, ApiError>>>;

/// What a view renders for one key.
///
/// `loading` is only true while the first fetch for a key is outstanding;
/// background revalidation of an existing value never sets it.
#[derive(Debug)]
pub struct QueryState<V> {
    pub value: Option<Arc<V>>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl<V> Clone for QueryState<V> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
        }
    }
}

enum Freshness {
    Fresh,
    Stale,
    Missing,
}

struct Entry<V> {
    value: Option<Arc<V>>,
    error: Option<ApiError>,
    fetched_at: Option<Instant>,
    in_flight: Option<InFlight<V>>,
    task: Option<AbortHandle>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            fetched_at: None,
            in_flight: None,
            task: None,
        }
    }
}

impl<V> Entry<V> {
    fn state(&self) -> QueryState<V> {
        QueryState {
            value: self.value.clone(),
            loading: self.in_flight.is_some() && self.value.is_none(),
            error: self.error.clone(),
        }
    }

    fn freshness(&self, refresh_interval: Option<Duration>, now: Instant) -> Freshness {
        match (&self.value, self.fetched_at) {
            (None, _) => Freshness::Missing,
            (Some(_), None) => Freshness::Stale,
            (Some(_), Some(at)) => match refresh_interval {
                Some(interval) if now.duration_since(at) >= interval => Freshness::Stale,
                _ => Freshness::Fresh,
            },
        }
    }

    /// A success is dated from when its request was issued, so a refresh
    /// cadence doesn't drift by the request latency. A failure keeps
    /// whatever value was there before and leaves `fetched_at` alone, so
    /// the next read tries again.
    fn settle(&mut self, result: &Result<Arc<V>, ApiError>, issued_at: Instant) {
        match result {
            Ok(value) => {
                self.value = Some(Arc::clone(value));
                self.error = None;
                self.fetched_at = Some(issued_at);
            }
            Err(e) => self.error = Some(e.clone()),
        }
        self.in_flight = None;
        self.task = None;
    }
}

pub struct QueryCache<K, V> {
    name: &'static str,
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
    fetch: FetchFn<K, V>,
    refresh_interval: Option<Duration>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            entries: Arc::clone(&self.entries),
            fetch: Arc::clone(&self.fetch),
            refresh_interval: self.refresh_interval,
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Clone + Eq + Hash + Display + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(name: &'static str, fetch: FetchFn<K, V>) -> Self {
        Self {
            name,
            entries: Arc::new(Mutex::new(HashMap::new())),
            fetch,
            refresh_interval: None,
        }
    }

    /// Values older than `interval` are served as-is and refetched in the
    /// background.
    pub fn refresh_every(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }

    /// Current state for `key` without triggering any fetch.
    pub async fn snapshot(&self, key: &K) -> QueryState<V> {
        let entries = self.entries.lock().await;
        entries.get(key).map(Entry::state).unwrap_or_default()
    }

    /// Read-through access.
    ///
    /// A fresh value is returned immediately. A stale value is also returned
    /// immediately, with a background refetch started. With no value yet the
    /// call waits for the (possibly shared) first fetch.
    pub async fn read(&self, key: &K) -> QueryState<V> {
        let pending = {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(key.clone()).or_default();
            match entry.freshness(self.refresh_interval, Instant::now()) {
                Freshness::Fresh => {
                    debug!(cache = self.name, %key, "Cache HIT");
                    return entry.state();
                }
                Freshness::Stale => {
                    debug!(cache = self.name, %key, "Cache STALE, revalidating");
                    let _ = self.start_fetch(key, entry);
                    return entry.state();
                }
                Freshness::Missing => {
                    debug!(cache = self.name, %key, "Cache MISS");
                    self.start_fetch(key, entry)
                }
            }
        };

        let _ = pending.await;
        self.snapshot(key).await
    }

    /// Waits for any outstanding fetch of `key`, then returns its state.
    pub async fn settled(&self, key: &K) -> QueryState<V> {
        let pending = {
            let entries = self.entries.lock().await;
            entries.get(key).and_then(|e| e.in_flight.clone())
        };
        if let Some(pending) = pending {
            let _ = pending.await;
        }
        self.snapshot(key).await
    }

    /// Marks `key` stale. Its value stays visible until the refetch lands.
    pub async fn invalidate(&self, key: &K) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            debug!(cache = self.name, %key, "Cache INVALIDATE");
            entry.fetched_at = None;
        }
    }

    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.lock().await;
        debug!(cache = self.name, "Cache INVALIDATE ALL");
        for entry in entries.values_mut() {
            entry.fetched_at = None;
        }
    }

    /// Aborts outstanding fetches and drops every entry.
    pub async fn dispose(&self) {
        let mut entries = self.entries.lock().await;
        for entry in entries.values() {
            if let Some(task) = &entry.task {
                task.abort();
            }
        }
        entries.clear();
        debug!(cache = self.name, "Cache DISPOSE");
    }

    /// Joins the in-flight request for `key` or issues a new one. The
    /// request runs as its own task and writes its outcome into the entry,
    /// so it completes even if every waiter goes away.
    fn start_fetch(&self, key: &K, entry: &mut Entry<V>) -> InFlight<V> {
        if let Some(in_flight) = &entry.in_flight {
            debug!(cache = self.name, %key, "Joining in-flight request");
            return in_flight.clone();
        }

        let fetch = Arc::clone(&self.fetch);
        let entries = Arc::clone(&self.entries);
        let task_key = key.clone();
        let name = self.name;
        let issued_at = Instant::now();
        let handle = tokio::spawn(async move {
            let result = fetch(task_key.clone()).await.map(Arc::new);
            if let Err(e) = &result {
                debug!(cache = name, key = %task_key, error = %e, "Fetch failed");
            }
            let mut entries = entries.lock().await;
            if let Some(entry) = entries.get_mut(&task_key) {
                entry.settle(&result, issued_at);
            }
            result
        });
        entry.task = Some(handle.abort_handle());

        let in_flight = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(ApiError::network(format!("Fetch did not complete: {e}"))))
        }
        .boxed()
        .shared();
        entry.in_flight = Some(in_flight.clone());
        in_flight
    }
}

struct Mounted<K, V> {
    key: Option<K>,
    shown: QueryState<V>,
}

/// One subscriber's view onto a [`QueryCache`].
///
/// Every response is tagged with the key it was requested for and only
/// lands in [`Query::state`] if that key is still the one most recently
/// requested. There is no network cancellation: a superseded request still
/// completes and fills the shared cache, it just isn't shown here.
pub struct Query<K, V> {
    cache: QueryCache<K, V>,
    mounted: Arc<std::sync::Mutex<Mounted<K, V>>>,
}

impl<K, V> Query<K, V>
where
    K: Clone + Eq + Hash + Display + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(cache: QueryCache<K, V>) -> Self {
        Self {
            cache,
            mounted: Arc::new(std::sync::Mutex::new(Mounted {
                key: None,
                shown: QueryState::default(),
            })),
        }
    }

    pub fn key(&self) -> Option<K> {
        lock(&self.mounted).key.clone()
    }

    pub fn state(&self) -> QueryState<V> {
        lock(&self.mounted).shown.clone()
    }

    /// Makes `key` the requested key and returns the work that resolves it.
    ///
    /// The switch takes effect immediately, before the returned future is
    /// polled. `None` clears the view and fetches nothing.
    pub fn set_key(&self, key: Option<K>) -> BoxFuture<'static, ()> {
        {
            let mut mounted = lock(&self.mounted);
            if mounted.key != key {
                debug!(
                    cache = self.cache.name(),
                    key = ?key.as_ref().map(ToString::to_string),
                    "Switching query key"
                );
                mounted.key = key.clone();
                mounted.shown = QueryState::default();
            }
        }
        match key {
            Some(key) => self.resolve(key),
            None => future::ready(()).boxed(),
        }
    }

    /// Re-reads the current key, revalidating it if its interval elapsed.
    pub fn revalidate(&self) -> BoxFuture<'static, ()> {
        match self.key() {
            Some(key) => self.resolve(key),
            None => future::ready(()).boxed(),
        }
    }

    fn resolve(&self, key: K) -> BoxFuture<'static, ()> {
        let cache = self.cache.clone();
        let mounted = Arc::clone(&self.mounted);
        async move {
            let mut initial = cache.snapshot(&key).await;
            if initial.value.is_none() {
                initial.loading = true;
            }
            apply(&mounted, &key, initial);

            let state = cache.read(&key).await;
            apply(&mounted, &key, state);

            // picks up a background revalidation started by `read`
            let settled = cache.settled(&key).await;
            apply(&mounted, &key, settled);
        }
        .boxed()
    }
}

fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply<K, V>(mounted: &std::sync::Mutex<Mounted<K, V>>, key: &K, state: QueryState<V>)
where
    K: PartialEq + Display,
{
    let mut mounted = lock(mounted);
    if mounted.key.as_ref() == Some(key) {
        mounted.shown = state;
    } else {
        debug!(%key, "Discarding response for superseded key");
    }
}
