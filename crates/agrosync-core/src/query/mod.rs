// ── Cached query layer ──

mod cache;
mod diagnostics;
mod key;

pub use cache::QueryCache;
pub use diagnostics::{
    CacheDiagnostics, CacheEvent, CacheStats, CountingDiagnostics, TracingDiagnostics,
};
pub use key::QueryKey;
