//! Single-flight deduplication for verification work
//!
//! At most one in-flight computation per key; concurrent callers await the
//! same shared future instead of issuing duplicates. Replaces the
//! check-then-set boolean guard pattern, which races between the check and
//! the set.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

pub struct SingleFlight<K, T>
where
    T: Clone,
{
    inflight: Mutex<HashMap<K, Shared<BoxFuture<'static, T>>>>,
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Run `fut` for `key`, or await the result of an identical call already
    /// in flight. The future only executes once per batch of concurrent
    /// callers; each caller gets a clone of its output.
    pub async fn run<F>(&self, key: K, fut: F) -> T
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + Sync + 'static,
    {
        let shared = {
            let mut inflight = self.inflight.lock().await;
            if let Some(existing) = inflight.get(&key) {
                existing.clone()
            } else {
                let shared = fut.boxed().shared();
                inflight.insert(key.clone(), shared.clone());
                shared
            }
        };

        let result = shared.clone().await;

        // Only remove the entry if it is still ours; a caller that arrives
        // after completion may already have started a fresh flight.
        let mut inflight = self.inflight.lock().await;
        if let Some(current) = inflight.get(&key)
            && Shared::ptr_eq(current, &shared)
        {
            inflight.remove(&key);
        }

        result
    }
}
