// ── Cache diagnostics port ──
//
// The cache reports what it does to an injected observer. The default
// observer logs at `trace`; tests and `-vv` runs can count events instead.

use std::sync::atomic::{AtomicU64, Ordering};

use strum::Display;
use tracing::trace;

use super::key::QueryKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CacheEvent {
    /// Served from a fresh entry.
    Hit,
    /// No fresh entry; a fetch was started.
    Miss,
    /// Joined a fetch already in flight.
    Coalesced,
    /// A transient failure is being retried.
    Retry,
    /// A fetch result was stored.
    Stored,
    /// A fetch finished after its key was invalidated; result dropped.
    Discarded,
    /// The key was invalidated.
    Invalidated,
}

/// Observer for cache activity.
pub trait CacheDiagnostics: Send + Sync {
    fn record(&self, key: &QueryKey, event: CacheEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl CacheDiagnostics for TracingDiagnostics {
    fn record(&self, key: &QueryKey, event: CacheEvent) {
        trace!(%key, %event, "query cache");
    }
}

/// Point-in-time event counts from [`CountingDiagnostics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub retries: u64,
    pub stored: u64,
    pub discarded: u64,
    pub invalidated: u64,
}

/// Counts events, for tests and summary output.
#[derive(Debug, Default)]
pub struct CountingDiagnostics {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    retries: AtomicU64,
    stored: AtomicU64,
    discarded: AtomicU64,
    invalidated: AtomicU64,
}

impl CountingDiagnostics {
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
        }
    }
}

impl CacheDiagnostics for CountingDiagnostics {
    fn record(&self, key: &QueryKey, event: CacheEvent) {
        trace!(%key, %event, "query cache");
        let counter = match event {
            CacheEvent::Hit => &self.hits,
            CacheEvent::Miss => &self.misses,
            CacheEvent::Coalesced => &self.coalesced,
            CacheEvent::Retry => &self.retries,
            CacheEvent::Stored => &self.stored,
            CacheEvent::Discarded => &self.discarded,
            CacheEvent::Invalidated => &self.invalidated,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
