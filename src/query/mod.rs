//! Client-side request cache keyed by semantic keys.
//!
//! Reads of the same key share one in-flight request, results are kept until the key is
//! invalidated, and invalidation re-fetches every key that still has a mounted observer.

pub mod deps;
pub mod mutation;

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use moka::sync::Cache;
use tokio::sync::broadcast;

use crate::config::QUERY_CACHE_CAPACITY;

pub use self::deps::{Change, Entity};
pub use self::mutation::Mutation;

type Erased = Arc<dyn Any + Send + Sync>;
type FetchResult = std::result::Result<Erased, Arc<anyhow::Error>>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;
type Slot = Arc<Mutex<Entry>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Str(String),
    Int(i64),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Ordered tuple of segments, e.g. `["projects", user_id]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(root: impl Into<KeyPart>) -> Self {
        Self(vec![root.into()])
    }

    #[must_use]
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .0
            .iter()
            .map(|part| match part {
                KeyPart::Str(s) => s.clone(),
                KeyPart::Int(i) => i.to_string(),
            })
            .collect::<Vec<_>>();

        write!(f, "[{}]", parts.join(", "))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// A disabled read never fires its fetch, it only reports what is cached.
    pub enabled: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub error: Option<Arc<anyhow::Error>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_fetching: false,
            is_stale: false,
            error: None,
            updated_at: None,
        }
    }
}

impl<T> QueryState<T> {
    /// The data, or the error of the last fetch when there is none.
    pub fn into_result(self) -> Result<Arc<T>> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(anyhow!("{error}")),
            (None, None) => Err(anyhow!("Query has not been fetched")),
        }
    }
}

struct Pending {
    id: u64,
    generation: u64,
    future: Shared<BoxFuture<'static, FetchResult>>,
}

#[derive(Default)]
struct Entry {
    data: Option<Erased>,
    error: Option<Arc<anyhow::Error>>,
    stale: bool,
    // bumped on every invalidation and every direct write
    generation: u64,
    pending: Option<Pending>,
    fetcher: Option<Fetcher>,
    observers: usize,
    updated_at: Option<DateTime<Utc>>,
}

struct Inner {
    // entries are marked stale in place, never evicted on invalidation
    entries: Cache<QueryKey, Slot>,
    updates: broadcast::Sender<QueryKey>,
    fetch_ids: AtomicU64,
}

#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.len())
            .finish()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

fn erase<T, F, Fut>(fetch: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move || {
        let future = fetch();

        async move {
            future
                .await
                .map(|data| Arc::new(data) as Erased)
                .map_err(Arc::new)
        }
        .boxed()
    })
}

fn lock(slot: &Slot) -> MutexGuard<'_, Entry> {
    // a poisoned entry is still consistent, every update is a plain assignment
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl QueryClient {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(64);

        Self {
            inner: Arc::new(Inner {
                entries: Cache::new(QUERY_CACHE_CAPACITY),
                updates,
                fetch_ids: AtomicU64::new(0),
            }),
        }
    }

    /// The entry of `key`, created empty on first use.
    fn slot(&self, key: &QueryKey) -> Slot {
        self.inner
            .entries
            .get_with(key.clone(), || Arc::new(Mutex::new(Entry::default())))
    }

    /// Returns the cached data for `key`, fetching it first when missing or stale.
    pub async fn read<T, F, Fut>(
        &self,
        key: QueryKey,
        fetch: F,
        options: ReadOptions,
    ) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if options.enabled {
            if let Err(error) = self.fetch_erased(&key, erase(fetch)).await {
                log::debug!("query {key} failed: {error}");
            }
        }

        self.snapshot(&key)
    }

    /// Current state of `key` without triggering a fetch.
    pub fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let Some(slot) = self.inner.entries.get(key) else {
            return QueryState::default();
        };

        let entry = lock(&slot);

        let data = match entry.data.clone() {
            Some(data) => {
                let data = data.downcast::<T>();

                if data.is_err() {
                    log::debug!("query {key} holds a different type");
                }

                data.ok()
            }
            None => None,
        };

        let is_fetching = entry.pending.is_some();

        QueryState {
            is_loading: is_fetching && data.is_none(),
            is_fetching,
            is_stale: entry.stale,
            error: entry.error.clone(),
            updated_at: entry.updated_at,
            data,
        }
    }

    async fn fetch_erased(&self, key: &QueryKey, fetcher: Fetcher) -> FetchResult {
        let (id, future) = {
            let slot = self.slot(key);
            let mut entry = lock(&slot);

            entry.fetcher = Some(fetcher.clone());

            if let (Some(data), false) = (&entry.data, entry.stale) {
                return Ok(data.clone());
            }

            // join the request only if it started after the last invalidation
            let joinable = entry
                .pending
                .as_ref()
                .filter(|pending| pending.generation == entry.generation)
                .map(|pending| (pending.id, pending.future.clone()));

            match joinable {
                Some(joined) => joined,
                None => {
                    let id = self.inner.fetch_ids.fetch_add(1, Ordering::SeqCst);
                    let future = fetcher().shared();

                    log::debug!("query {key} fetching");

                    entry.pending = Some(Pending {
                        id,
                        generation: entry.generation,
                        future: future.clone(),
                    });

                    (id, future)
                }
            }
        };

        let result = future.await;
        self.settle(key, id, &result);

        result
    }

    fn settle(&self, key: &QueryKey, id: u64, result: &FetchResult) {
        let Some(slot) = self.inner.entries.get(key) else {
            return;
        };

        let settled = {
            let mut entry = lock(&slot);

            match entry.pending.take() {
                Some(pending) if pending.id == id => {
                    match result {
                        Ok(data) => {
                            entry.data = Some(data.clone());
                            entry.error = None;
                            // invalidated while in flight
                            entry.stale = pending.generation != entry.generation;
                            entry.updated_at = Some(Utc::now());
                        }
                        Err(error) => {
                            entry.error = Some(error.clone());
                            entry.stale = true;
                        }
                    }

                    true
                }
                // superseded, or already stored by another awaiter
                other => {
                    entry.pending = other;
                    false
                }
            }
        };

        if settled {
            self.inner.updates.send(key.clone()).ok();
        }
    }

    /// Marks every entry under `prefix` stale and re-fetches the ones that are mounted.
    /// Returns how many entries were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut refetch = vec![];
        let mut marked = 0;

        for (key, slot) in self.inner.entries.iter() {
            if !key.starts_with(prefix) {
                continue;
            }

            let mut entry = lock(&slot);

            entry.stale = true;
            entry.generation += 1;
            marked += 1;

            if entry.observers > 0 {
                if let Some(fetcher) = entry.fetcher.clone() {
                    refetch.push(((*key).clone(), fetcher));
                }
            }
        }

        log::debug!("invalidated {marked} queries under {prefix}");

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return marked;
        };

        for (key, fetcher) in refetch {
            let client = self.clone();

            runtime.spawn(async move {
                if let Err(error) = client.fetch_erased(&key, fetcher).await {
                    log::debug!("refetch of {key} failed: {error}");
                }
            });
        }

        marked
    }

    /// Invalidates every key that reads the changed entity.
    pub fn invalidate_change(&self, change: &Change) -> usize {
        change
            .dependent_keys()
            .iter()
            .map(|key| self.invalidate(key))
            .sum()
    }

    /// Seeds `key` with data, as if it had just been fetched. A request still in flight for
    /// the key is detached and can no longer overwrite it.
    pub fn set<T: Send + Sync + 'static>(&self, key: QueryKey, data: T) {
        {
            let slot = self.slot(&key);
            let mut entry = lock(&slot);

            entry.data = Some(Arc::new(data));
            entry.error = None;
            entry.stale = false;
            entry.generation += 1;
            entry.pending = None;
            entry.updated_at = Some(Utc::now());
        }

        self.inner.updates.send(key).ok();
    }

    pub fn len(&self) -> usize {
        self.inner.entries.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers an observer of `key`. While any observer is alive, invalidating the key
    /// re-fetches it with `fetch`.
    pub fn mount<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Observer<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        {
            let slot = self.slot(&key);
            let mut entry = lock(&slot);

            entry.observers += 1;
            entry.fetcher = Some(erase(fetch));
        }

        Observer {
            client: self.clone(),
            updates: self.inner.updates.subscribe(),
            key,
            _marker: PhantomData,
        }
    }
}

/// A mounted reader of one key. Dropping it unmounts the key.
pub struct Observer<T> {
    client: QueryClient,
    key: QueryKey,
    updates: broadcast::Receiver<QueryKey>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Observer<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn state(&self) -> QueryState<T> {
        self.client.snapshot(&self.key)
    }

    /// Fetches the key if it is missing or stale.
    pub async fn refresh(&self) -> QueryState<T> {
        let fetcher = self
            .client
            .inner
            .entries
            .get(&self.key)
            .and_then(|slot| lock(&slot).fetcher.clone());

        if let Some(fetcher) = fetcher {
            if let Err(error) = self.client.fetch_erased(&self.key, fetcher).await {
                log::debug!("query {} failed: {error}", self.key);
            }
        }

        self.state()
    }

    /// Waits until the key receives new data or a new error.
    pub async fn changed(&mut self) -> Result<QueryState<T>> {
        loop {
            match self.updates.recv().await {
                Ok(key) if key == self.key => return Ok(self.state()),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(anyhow!("Query client was dropped"));
                }
            }
        }
    }
}

impl<T> Drop for Observer<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.client.inner.entries.get(&self.key) {
            let mut entry = lock(&slot);
            entry.observers = entry.observers.saturating_sub(1);
        }
    }
}
