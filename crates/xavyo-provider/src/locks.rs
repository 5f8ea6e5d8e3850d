//! Named lock registry
//!
//! Serializes mutating operations against the same remote object. The remote
//! directory has no concurrency token for most fields, so two handlers that
//! replace the same list at once would silently drop one side's change.
//! Handlers take the lock for `(scope, name)` before touching remote state and
//! hold it until the mutation has completed.
//!
//! Locks are created lazily on first use and kept for the lifetime of the
//! registry. The key space is bounded by the number of distinct remote objects
//! touched during a run.
//!
//! # Example
//!
//! ```
//! use xavyo_provider::NamedLockRegistry;
//!
//! # async fn example() {
//! let locks = NamedLockRegistry::new();
//!
//! {
//!     let _guard = locks.acquire("azuread_application", "00000000-0000-0000-0000-000000000001").await;
//!     // mutate the application here
//! } // released on drop
//!
//! let value = locks
//!     .with_lock("azuread_application", "00000000-0000-0000-0000-000000000001", || async { 42 })
//!     .await;
//! assert_eq!(value, 42);
//! # }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, trace};

/// Key of a lock: a resource scope plus a logical object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockKey {
    scope: String,
    name: String,
}

impl LockKey {
    /// Creates a new lock key.
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }

    /// Returns the scope part of the key.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the object name part of the key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for LockKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.scope, self.name)
    }
}

/// Registry of exclusive locks keyed by `(scope, name)`.
///
/// Shared between handlers behind an `Arc`. Waiting contenders are not
/// guaranteed to acquire in arrival order.
#[derive(Debug, Default)]
pub struct NamedLockRegistry {
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
}

impl NamedLockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for a key, creating it on first reference.
    fn lock_for(&self, key: &LockKey) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(key) {
            return Arc::clone(existing.value());
        }
        // The shard write lock is released before anyone awaits the mutex.
        Arc::clone(self.locks.entry(key.clone()).or_default().value())
    }

    /// Waits until no one else holds `(scope, name)` and takes it.
    ///
    /// Never fails and has no timeout of its own. The lock is released when
    /// the returned guard is dropped, including on early returns and when the
    /// owning future is cancelled.
    pub async fn acquire(&self, scope: &str, name: &str) -> NamedLockGuard {
        let key = LockKey::new(scope, name);
        let lock = self.lock_for(&key);

        let guard = match Arc::clone(&lock).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                debug!(lock = %key, "Waiting for lock held by another operation");
                lock.lock_owned().await
            }
        };

        trace!(lock = %key, "Lock acquired");
        NamedLockGuard { key, _guard: guard }
    }

    /// Runs `f` while holding `(scope, name)`.
    ///
    /// The lock is released once the future returned by `f` completes,
    /// whatever it returns.
    pub async fn with_lock<F, Fut, T>(&self, scope: &str, name: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.acquire(scope, name).await;
        f().await
    }

    /// Checks whether `(scope, name)` is currently held.
    #[must_use]
    pub fn is_locked(&self, scope: &str, name: &str) -> bool {
        self.locks
            .get(&LockKey::new(scope, name))
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Number of keys ever referenced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no key has been referenced yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive hold on a named lock. Dropping it releases the lock.
pub struct NamedLockGuard {
    key: LockKey,
    _guard: OwnedMutexGuard<()>,
}

impl NamedLockGuard {
    /// Returns the key this guard holds.
    #[must_use]
    pub fn key(&self) -> &LockKey {
        &self.key
    }
}

impl std::fmt::Debug for NamedLockGuard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedLockGuard")
            .field("key", &self.key)
            .finish()
    }
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        trace!(lock = %self.key, "Lock released");
    }
}
