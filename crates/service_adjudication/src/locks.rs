//! Per-claim commit locks
//!
//! Held only while a decision is written back, never across an inference
//! call. Entries are dropped once no task holds or waits on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};

use core_kernel::ClaimId;

#[derive(Debug, Default)]
pub struct ClaimLocks {
    slots: Mutex<HashMap<ClaimId, Arc<TokioMutex<()>>>>,
}

/// Exclusive commit scope for one claim
pub struct ClaimGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ClaimLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, claim_id: ClaimId) -> ClaimGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(claim_id).or_default().clone()
        };
        ClaimGuard {
            _guard: slot.lock_owned().await,
        }
    }

    /// Claims with a live lock entry
    pub fn tracked(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.len())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_claim_is_serialized() {
        let locks = Arc::new(ClaimLocks::new());
        let claim = ClaimId::new();
        let guard = locks.acquire(claim).await;

        let waiting = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _second = locks.acquire(claim).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        waiting.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_claims_do_not_block() {
        let locks = ClaimLocks::new();
        let _first = locks.acquire(ClaimId::new()).await;
        let _second = locks.acquire(ClaimId::new()).await;
        assert_eq!(locks.tracked(), 2);
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = ClaimLocks::new();
        drop(locks.acquire(ClaimId::new()).await);
        let _held = locks.acquire(ClaimId::new()).await;
        assert_eq!(locks.tracked(), 1);
    }
}
