// ── Query cache ──
//
// Per-key cache with a freshness window, request coalescing and a bounded
// retry for transient failures. Fetches run on detached tasks: a caller
// that goes away does not cancel the request, and the result still lands
// in the cache unless the key was invalidated while it was in flight.
//
// Lock order is `epochs` before `entries`; `in_flight` is never held
// together with either.

use std::any::Any;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::diagnostics::{CacheDiagnostics, CacheEvent, TracingDiagnostics};
use super::key::QueryKey;
use crate::config::QueryPolicy;
use crate::error::CoreError;

type CachedValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<CachedValue, CoreError>>>;

struct Entry {
    value: CachedValue,
    fetched_at: Instant,
}

struct InFlight {
    epoch: u64,
    fetch: SharedFetch,
}

/// Shared read cache. Cheap to clone; clones see the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    policy: QueryPolicy,
    entries: DashMap<QueryKey, Entry>,
    in_flight: DashMap<QueryKey, InFlight>,
    /// Bumped on every invalidation; a fetch only stores its result if
    /// the epoch it started under is still current.
    epochs: DashMap<QueryKey, u64>,
    diagnostics: Arc<dyn CacheDiagnostics>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("policy", &self.inner.policy)
            .field("entries", &self.inner.entries.len())
            .field("in_flight", &self.inner.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    pub fn new(policy: QueryPolicy) -> Self {
        Self::with_diagnostics(policy, Arc::new(TracingDiagnostics))
    }

    pub fn with_diagnostics(policy: QueryPolicy, diagnostics: Arc<dyn CacheDiagnostics>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                policy,
                entries: DashMap::new(),
                in_flight: DashMap::new(),
                epochs: DashMap::new(),
                diagnostics,
            }),
        }
    }

    pub fn policy(&self) -> QueryPolicy {
        self.inner.policy
    }

    /// Read `key`, calling `fetcher` only when no fresh value is cached and
    /// no fetch for the key is already running.
    ///
    /// `fetcher` may be called twice when the first attempt fails with a
    /// transient error.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        if let Some(value) = self.inner.fresh(&key) {
            self.inner.record(&key, CacheEvent::Hit);
            return downcast(&key, value);
        }

        let epoch = self.inner.epoch(&key);
        let fetch = match self.inner.in_flight.entry(key.clone()) {
            MapEntry::Occupied(running) if running.get().epoch == epoch => {
                self.inner.record(&key, CacheEvent::Coalesced);
                running.get().fetch.clone()
            }
            slot => {
                self.inner.record(&key, CacheEvent::Miss);
                let fetch = spawn_fetch(Arc::clone(&self.inner), key.clone(), epoch, fetcher);
                slot.insert(InFlight {
                    epoch,
                    fetch: fetch.clone(),
                });
                fetch
            }
        };

        let value = fetch.await?;
        downcast(&key, value)
    }

    /// Drop the cached value for `key` and orphan any fetch in flight.
    /// The next read goes to the network.
    pub fn invalidate(&self, key: &QueryKey) {
        {
            let mut epoch = self.inner.epochs.entry(key.clone()).or_insert(0);
            *epoch += 1;
            self.inner.entries.remove(key);
        }
        self.inner.in_flight.remove(key);
        self.inner.record(key, CacheEvent::Invalidated);
    }

    /// Invalidate every key. Used when the session ends.
    pub fn clear(&self) {
        let keys: HashSet<QueryKey> = self
            .inner
            .entries
            .iter()
            .map(|e| e.key().clone())
            .chain(self.inner.in_flight.iter().map(|e| e.key().clone()))
            .collect();
        debug!(keys = keys.len(), "clearing query cache");
        for key in &keys {
            self.invalidate(key);
        }
    }

    /// Whether `key` holds a value inside the freshness window.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.inner.fresh(key).is_some()
    }
}

impl CacheInner {
    fn record(&self, key: &QueryKey, event: CacheEvent) {
        self.diagnostics.record(key, event);
    }

    fn epoch(&self, key: &QueryKey) -> u64 {
        self.epochs.get(key).map_or(0, |e| *e.value())
    }

    fn fresh(&self, key: &QueryKey) -> Option<CachedValue> {
        let entry = self.entries.get(key)?;
        (entry.fetched_at.elapsed() < self.policy.stale_time).then(|| Arc::clone(&entry.value))
    }

    fn store(&self, key: &QueryKey, epoch: u64, value: CachedValue) {
        let current = self.epochs.get(key);
        if current.as_ref().map_or(0, |e| *e.value()) == epoch {
            self.entries.insert(
                key.clone(),
                Entry {
                    value,
                    fetched_at: Instant::now(),
                },
            );
            drop(current);
            self.record(key, CacheEvent::Stored);
        } else {
            drop(current);
            debug!(%key, "dropping result of invalidated fetch");
            self.record(key, CacheEvent::Discarded);
        }
    }

    async fn run_with_retry<T, F, Fut>(&self, key: &QueryKey, fetcher: &F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Err(err) if err.is_transient() && attempt < self.policy.retries => {
                    attempt += 1;
                    self.record(key, CacheEvent::Retry);
                    warn!(%key, attempt, error = %err, "transient failure, retrying");
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                outcome => return outcome,
            }
        }
    }
}

fn spawn_fetch<T, F, Fut>(inner: Arc<CacheInner>, key: QueryKey, epoch: u64, fetcher: F) -> SharedFetch
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let result = inner
            .run_with_retry(&key, &fetcher)
            .await
            .map(|value| Arc::new(value) as CachedValue);
        if let Ok(value) = &result {
            inner.store(&key, epoch, Arc::clone(value));
        }
        inner.in_flight.remove_if(&key, |_, running| running.epoch == epoch);
        result
    });

    async move {
        handle
            .await
            .map_err(|e| CoreError::Internal(format!("query task failed: {e}")))?
    }
    .boxed()
    .shared()
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, value: CachedValue) -> Result<Arc<T>, CoreError> {
    value
        .downcast::<T>()
        .map_err(|_| CoreError::Internal(format!("cached value for {key} has an unexpected type")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::model::PlotId;
    use crate::query::diagnostics::{CacheStats, CountingDiagnostics};

    fn cache() -> (QueryCache, Arc<CountingDiagnostics>) {
        let diag = Arc::new(CountingDiagnostics::default());
        let cache = QueryCache::with_diagnostics(QueryPolicy::default(), diag.clone());
        (cache, diag)
    }

    fn key() -> QueryKey {
        QueryKey::PlotState(PlotId::new("p-1"))
    }

    /// A fetcher that counts calls and yields `outcomes` in order,
    /// repeating the last one.
    fn scripted(
        calls: &Arc<AtomicUsize>,
        delay: Duration,
        outcomes: Vec<Result<u32, CoreError>>,
    ) -> impl Fn() -> BoxFuture<'static, Result<u32, CoreError>> + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        let outcomes = Arc::new(outcomes);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let outcome = outcomes[n.min(outcomes.len() - 1)].clone();
            async move {
                tokio::time::sleep(delay).await;
                outcome
            }
            .boxed()
        }
    }

    fn transient() -> CoreError {
        CoreError::Transient {
            message: "HTTP 503".into(),
            status: Some(503),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_value_skips_the_network() {
        let (cache, diag) = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Ok(7)]))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(4 * 60)).await;
        let second = cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Ok(8)]))
            .await
            .unwrap();

        assert_eq!((*first, *second), (7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(diag.snapshot().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_value_is_refetched() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = scripted(&calls, Duration::ZERO, vec![Ok(1), Ok(2)]);

        assert_eq!(*cache.fetch(key(), fetcher).await.unwrap(), 1);
        tokio::time::advance(Duration::from_secs(5 * 60 + 1)).await;
        assert!(!cache.is_fresh(&key()));

        let fetcher = scripted(&calls, Duration::ZERO, vec![Ok(1), Ok(2)]);
        assert_eq!(*cache.fetch(key(), fetcher).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_reads_share_one_call() {
        let (cache, diag) = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.fetch(key(), scripted(&calls, Duration::from_millis(100), vec![Ok(3)])),
            cache.fetch(key(), scripted(&calls, Duration::from_millis(100), vec![Ok(4)])),
        );

        assert_eq!((*a.unwrap(), *b.unwrap()), (3, 3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            diag.snapshot(),
            CacheStats {
                misses: 1,
                coalesced: 1,
                stored: 1,
                ..CacheStats::default()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_is_retried_exactly_once() {
        let (cache, diag) = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let result = cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Err(transient())]))
            .await;

        assert!(result.unwrap_err().is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(diag.snapshot().retries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_can_recover() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Err(transient()), Ok(9)]))
            .await
            .unwrap();

        assert_eq!(*value, 9);
        assert!(cache.is_fresh(&key()));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_is_never_retried_or_cached() {
        let (cache, diag) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let not_found = || CoreError::NotFound {
            resource: "plots/p-1/state".into(),
        };

        let result = cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Err(not_found())]))
            .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(diag.snapshot().retries, 0);
        assert!(!cache.is_fresh(&key()));
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_caller_still_populates_the_cache() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let gave_up = tokio::time::timeout(
            Duration::from_millis(10),
            cache.fetch(key(), scripted(&calls, Duration::from_millis(100), vec![Ok(5)])),
        )
        .await;
        assert!(gave_up.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let value = cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Ok(6)]))
            .await
            .unwrap();

        assert_eq!(*value, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_discards_in_flight_result() {
        let (cache, diag) = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let pending = {
            let cache = cache.clone();
            let fetcher = scripted(&calls, Duration::from_millis(100), vec![Ok(1)]);
            tokio::spawn(async move { cache.fetch(key(), fetcher).await })
        };
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        cache.invalidate(&key());

        // The caller that was waiting still gets its answer.
        assert_eq!(*pending.await.unwrap().unwrap(), 1);
        assert!(!cache.is_fresh(&key()));
        assert_eq!(diag.snapshot().discarded, 1);

        let value = cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Ok(2)]))
            .await
            .unwrap();
        assert_eq!(*value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_forgets_every_key() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let other = QueryKey::Species;

        cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Ok(1)]))
            .await
            .unwrap();
        cache
            .fetch(other.clone(), scripted(&calls, Duration::ZERO, vec![Ok(1)]))
            .await
            .unwrap();
        cache.clear();

        assert!(!cache.is_fresh(&key()));
        assert!(!cache.is_fresh(&other));
    }

    #[tokio::test(start_paused = true)]
    async fn type_mismatch_is_an_internal_error() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        cache
            .fetch(key(), scripted(&calls, Duration::ZERO, vec![Ok(1)]))
            .await
            .unwrap();

        let err = cache
            .fetch(key(), || async { Ok::<_, CoreError>(String::new()) })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
