//! # Per-User Locks
//!
//! Serializes the read-balances, settle, commit sequence per user.
//!
//! Each user gets one async mutex, created on first use. Trades for
//! different users never contend. Acquisition is bounded by a timeout so a
//! stuck settlement cannot block a user's later requests forever.

use crate::application::error::{TradeError, TradeResult};
use crate::domain::value_objects::UserId;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

/// Guard proving exclusive access to one user's wallets.
pub type UserLockGuard = OwnedMutexGuard<()>;

/// Registry of per-user mutexes.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks `user_id`'s wallets, waiting at most `wait`.
    ///
    /// The returned guard is owned, so it can move into a spawned task.
    ///
    /// # Errors
    ///
    /// Returns `TradeError::LockTimeout` if the lock is not acquired in time.
    pub async fn acquire(&self, user_id: UserId, wait: Duration) -> TradeResult<UserLockGuard> {
        let lock = Arc::clone(self.locks.entry(user_id).or_default().value());
        timeout(wait, lock.lock_owned())
            .await
            .map_err(|_| TradeError::LockTimeout { user_id })
    }

    /// Unlocks `user_id` and forgets its mutex if nobody else is waiting.
    ///
    /// An acquirer clones the mutex under the map's shard lock, so a mutex
    /// still referenced by a waiter is never removed.
    pub fn release(&self, user_id: UserId, guard: UserLockGuard) {
        drop(guard);
        self.locks
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Drops mutexes nobody holds or waits on.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Returns the number of users with a registered mutex.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no mutex is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_times_out_while_held() {
        let locks = UserLocks::new();
        let user = UserId::new(1);

        let guard = locks.acquire(user, Duration::from_millis(50)).await.unwrap();
        let err = locks
            .acquire(user, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert_eq!(err, TradeError::LockTimeout { user_id: user });

        drop(guard);
        assert!(locks.acquire(user, Duration::from_millis(20)).await.is_ok());
    }

    #[tokio::test]
    async fn different_users_do_not_contend() {
        let locks = UserLocks::new();
        let _a = locks
            .acquire(UserId::new(1), Duration::from_millis(20))
            .await
            .unwrap();
        let _b = locks
            .acquire(UserId::new(2), Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn release_forgets_idle_mutex() {
        let locks = UserLocks::new();
        let user = UserId::new(7);
        let guard = locks.acquire(user, Duration::from_millis(20)).await.unwrap();
        assert_eq!(locks.len(), 1);

        locks.release(user, guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn release_keeps_mutex_with_waiter() {
        let locks = Arc::new(UserLocks::new());
        let user = UserId::new(7);
        let guard = locks.acquire(user, Duration::from_millis(20)).await.unwrap();

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move { locks.acquire(user, Duration::from_secs(5)).await })
        };
        while Arc::strong_count(locks.locks.get(&user).unwrap().value()) < 3 {
            tokio::task::yield_now().await;
        }

        locks.release(user, guard);
        assert_eq!(locks.len(), 1);
        let second = waiter.await.unwrap().unwrap();
        locks.release(user, second);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let locks = UserLocks::new();
        let held = locks
            .acquire(UserId::new(1), Duration::from_millis(20))
            .await
            .unwrap();
        drop(
            locks
                .acquire(UserId::new(2), Duration::from_millis(20))
                .await
                .unwrap(),
        );

        locks.prune();
        assert_eq!(locks.len(), 1);
        drop(held);
        locks.prune();
        assert!(locks.is_empty());
    }
}
