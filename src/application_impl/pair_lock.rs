use crate::domain_model::UserPair;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-pair critical sections. Mutations of one unordered pair are
/// serialized; different pairs never contend.
#[derive(Default)]
pub struct PairLocks {
    locks: Arc<DashMap<UserPair, Arc<Mutex<()>>>>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, pair: UserPair) -> PairGuard {
        let lock = {
            let entry = self
                .locks
                .entry(pair)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(&*entry)
        };
        let guard = lock.lock_owned().await;

        PairGuard {
            pair,
            locks: self.locks.clone(),
            _guard: guard,
        }
    }

    /// Number of pairs with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

pub struct PairGuard {
    pair: UserPair,
    locks: Arc<DashMap<UserPair, Arc<Mutex<()>>>>,
    _guard: OwnedMutexGuard<()>,
}

impl PairGuard {
    pub fn pair(&self) -> UserPair {
        self.pair
    }
}

impl Drop for PairGuard {
    fn drop(&mut self) {
        // map + this guard: nobody else holds or waits on the mutex
        self.locks
            .remove_if(&self.pair, |_, lock| Arc::strong_count(lock) == 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::UserId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn pair(a: &str, b: &str) -> UserPair {
        UserPair::new(UserId::for_username(a), UserId::for_username(b))
    }

    #[tokio::test]
    async fn entries_are_dropped_once_released() {
        let locks = PairLocks::new();

        {
            let guard = locks.acquire(pair("alice", "bob")).await;
            assert_eq!(guard.pair(), pair("bob", "alice"));
            assert_eq!(locks.len(), 1);
        }

        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn same_pair_is_serialized() {
        let locks = Arc::new(PairLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_seen = max_seen.clone();
            // alternate argument order, it is the same pair
            let p = if i % 2 == 0 {
                pair("alice", "bob")
            } else {
                pair("bob", "alice")
            };
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(p).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_pairs_do_not_block_each_other() {
        let locks = PairLocks::new();

        let _held = locks.acquire(pair("alice", "bob")).await;
        let other = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(pair("alice", "carol")),
        )
        .await;

        assert!(other.is_ok());
    }
}
