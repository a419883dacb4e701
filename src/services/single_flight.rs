//! Single-flight fetch cache.
//!
//! When several callers ask for the same idempotent resource at once, only
//! one fetch runs; every caller receives its outcome, and the outcome stays
//! cached until it is explicitly invalidated.
//!
//! ```text
//! View A ─┐
//!         ├──► SingleFlightCache ──► fetcher() (once)
//! View B ─┘           │
//!                     ▼
//!          [A and B receive the same outcome]
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

/// Failure of a cached fetch. Cached just like a success.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The caller must re-authenticate.
    #[error("unauthorized")]
    Unauthorized,

    /// Anything else; the caller may offer a retry.
    #[error("fetch failed: {0}")]
    Failed(String),
}

type Slot<V> = Arc<OnceCell<Result<V, FetchError>>>;

/// Deduplicating, memoizing cache keyed by `K`.
pub struct SingleFlightCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    fetches: AtomicU64,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            fetches: AtomicU64::new(0),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached outcome for `key`, joining or starting the fetch.
    ///
    /// `fetcher` runs only when no outcome is cached and no fetch is in
    /// flight. If the caller driving the fetch is dropped before it
    /// finishes, the next waiter takes over and runs its own fetcher.
    pub async fn get<F, Fut>(&self, key: K, fetcher: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, FetchError>>,
    {
        let slot = Arc::clone(self.slots().entry(key).or_default());

        slot.get_or_init(|| {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            fetcher()
        })
        .await
        .clone()
    }

    /// Cached outcome for `key`, if a fetch has finished.
    pub fn peek(&self, key: &K) -> Option<Result<V, FetchError>> {
        self.slots().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Drop the entry for `key` so the next `get` fetches again.
    ///
    /// Callers already waiting on an in-flight fetch still receive its
    /// outcome; it is just no longer cached.
    pub fn invalidate(&self, key: &K) -> bool {
        self.slots().remove(key).is_some()
    }

    /// Drop every entry, including references to in-flight fetches.
    pub fn clear(&self) {
        self.slots().clear();
    }

    /// Number of times a fetcher has been started.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl<K, V> Default for SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
