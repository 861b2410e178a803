use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt, Shared};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::app::{Result, SyncError};

/// Handle to an operation's eventual result. Clones observe the same
/// outcome.
pub type Pending<T> = Shared<BoxFuture<'static, Result<T>>>;

/// A handle that has already resolved. The value is visible through
/// [`Shared::peek`] right away.
pub fn resolved<T>(result: Result<T>) -> Pending<T>
where
    T: Clone + Send + Sync + 'static,
{
    let pending = future::ready(result).boxed().shared();
    // `Shared` only caches its output once polled to completion.
    let _ = pending.clone().now_or_never();
    pending
}

/// Keyed set of operations currently in flight.
///
/// The first caller for a key starts the work on the tokio runtime; later
/// callers get a clone of the same handle until the work finishes. The key
/// is released before the result reaches any observer, so a call made after
/// a handle resolved always starts over.
pub struct InFlight<K, T> {
    operation: &'static str,
    slots: Arc<Mutex<HashMap<K, Pending<T>>>>,
}

impl<K, T> InFlight<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the handle for `key`, calling `start` only when nothing is
    /// in flight for it. Outside a tokio runtime nothing is started and the
    /// handle resolves to `Unknown`.
    pub fn get_or_start<F, Fut>(&self, key: K, start: F) -> Pending<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(operation = self.operation, "No tokio runtime to run request on");
            return resolved(Err(SyncError::Unknown));
        };

        let mut slots = lock(&self.slots);
        if let Some(pending) = slots.get(&key) {
            tracing::debug!(operation = self.operation, "Joining in-flight request");
            return pending.clone();
        }

        let (tx, rx) = oneshot::channel();
        let pending: Pending<T> = rx
            .map(|received| received.unwrap_or(Err(SyncError::Unknown)))
            .boxed()
            .shared();
        slots.insert(key.clone(), pending.clone());
        drop(slots);

        let release = Release {
            slots: Arc::clone(&self.slots),
            key,
        };
        let work = start();
        let operation = self.operation;
        runtime.spawn(async move {
            let result = work.await;
            drop(release);
            if let Err(e) = &result {
                tracing::debug!(operation, error = %e, "Request finished with error");
            }
            let _ = tx.send(result);
        });

        pending
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        lock(&self.slots).contains_key(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Frees a slot when dropped, including when the work panics.
struct Release<K: Eq + Hash, T> {
    slots: Arc<Mutex<HashMap<K, Pending<T>>>>,
    key: K,
}

impl<K: Eq + Hash, T> Drop for Release<K, T> {
    fn drop(&mut self) {
        lock(&self.slots).remove(&self.key);
    }
}

// Every critical section is a single map operation, so a poisoned map is
// still consistent.
fn lock<M>(mutex: &Mutex<M>) -> MutexGuard<'_, M> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_pending, assert_ready_eq};

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_same_key_shares_one_run() {
        let inflight: InFlight<&str, u32> = InFlight::new("test");
        let starts = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel::<u32>();

        let counter = starts.clone();
        let first = inflight.get_or_start("a", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { rx.await.map_err(|_| SyncError::Unknown) }
        });
        let counter = starts.clone();
        let second = inflight.get_or_start("a", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(99) }
        });

        assert!(first.ptr_eq(&second));
        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert!(inflight.is_in_flight(&"a"));

        let mut observer = tokio_test::task::spawn(second.clone());
        assert_pending!(observer.poll());

        tx.send(7).unwrap();
        assert_eq!(first.await, Ok(7));
        assert_eq!(second.await, Ok(7));
        assert!(inflight.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_run_independently() {
        let inflight: InFlight<&str, u32> = InFlight::new("test");
        let (tx_a, rx_a) = oneshot::channel::<u32>();

        let a = inflight.get_or_start("a", move || async move {
            rx_a.await.map_err(|_| SyncError::Unknown)
        });
        let b = inflight.get_or_start("b", || async { Ok(2) });

        assert!(!a.ptr_eq(&b));
        assert_eq!(b.await, Ok(2));
        assert!(inflight.is_in_flight(&"a"));
        assert!(!inflight.is_in_flight(&"b"));

        tx_a.send(1).unwrap();
        assert_eq!(a.await, Ok(1));
    }

    #[tokio::test]
    async fn test_slot_released_after_completion() {
        let inflight: InFlight<(), u32> = InFlight::new("test");
        let first = inflight.get_or_start((), || async { Err(SyncError::Network) });
        assert_eq!(first.clone().await, Err(SyncError::Network));

        let second = inflight.get_or_start((), || async { Ok(5) });
        assert!(!first.ptr_eq(&second));
        assert_eq!(second.await, Ok(5));
    }

    #[tokio::test]
    async fn test_work_runs_without_observers() {
        let inflight: InFlight<(), ()> = InFlight::new("test");
        let ran = Arc::new(AtomicUsize::new(0));

        let counter = ran.clone();
        drop(inflight.get_or_start((), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        settle().await;

        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert!(inflight.is_empty());
    }

    #[tokio::test]
    async fn test_resolved_is_ready() {
        let mut task = tokio_test::task::spawn(resolved::<u32>(Err(SyncError::NotLoggedIn)));
        assert_ready_eq!(task.poll(), Err(SyncError::NotLoggedIn));
    }

    #[test]
    fn test_resolved_value_is_visible_without_polling() {
        let pending = resolved::<u32>(Ok(3));
        assert_eq!(pending.peek(), Some(&Ok(3)));
    }

    #[test]
    fn test_outside_runtime_resolves_unknown() {
        let inflight: InFlight<(), u32> = InFlight::new("test");
        let started = Arc::new(AtomicUsize::new(0));

        let counter = started.clone();
        let pending = inflight.get_or_start((), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        });

        assert_eq!(pending.peek(), Some(&Err(SyncError::Unknown)));
        assert_eq!(started.load(Ordering::SeqCst), 0);
        assert!(inflight.is_empty());
    }

    fn panicking_work() -> Result<u32> {
        panic!("work failed")
    }

    #[tokio::test]
    async fn test_panicking_work_releases_slot() {
        let inflight: InFlight<(), u32> = InFlight::new("test");

        let failed = inflight.get_or_start((), || async { panicking_work() });
        assert_eq!(failed.clone().await, Err(SyncError::Unknown));
        settle().await;
        assert!(inflight.is_empty());

        let retried = inflight.get_or_start((), || async { Ok(4) });
        assert!(!failed.ptr_eq(&retried));
        assert_eq!(retried.await, Ok(4));
    }
}
