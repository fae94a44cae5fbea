// simulation_engine/highway.rs
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// How `Highway::add` folds a contribution into the shared total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationStrategy {
    /// Read, wait, write back. Concurrent writers can overwrite each other.
    Unsafe,
    /// The same read-modify-write inside a critical section.
    Safe,
}

/// The single distance counter every vehicle worker contributes to.
///
/// Shared by `Arc` between the engine and its workers. The strategy can be
/// switched while workers are running; each `add` picks it up on entry.
#[derive(Debug)]
pub struct Highway {
    distance: AtomicU64,
    safe_mode: AtomicBool,
    gate: Mutex<()>,
    gap: Duration,
}

impl Highway {
    pub fn new(strategy: AggregationStrategy, gap: Duration) -> Self {
        Self {
            distance: AtomicU64::new(0),
            safe_mode: AtomicBool::new(strategy == AggregationStrategy::Safe),
            gate: Mutex::new(()),
            gap,
        }
    }

    pub fn strategy(&self) -> AggregationStrategy {
        if self.safe_mode.load(Ordering::SeqCst) {
            AggregationStrategy::Safe
        } else {
            AggregationStrategy::Unsafe
        }
    }

    pub fn set_strategy(&self, strategy: AggregationStrategy) {
        self.safe_mode
            .store(strategy == AggregationStrategy::Safe, Ordering::SeqCst);
    }

    pub async fn add(&self, amount: u64) {
        match self.strategy() {
            AggregationStrategy::Unsafe => self.add_distance_unsafe(amount).await,
            AggregationStrategy::Safe => self.add_distance_safe(amount).await,
        }
    }

    /// Lost-update prone: another writer may store between our load and our store.
    pub async fn add_distance_unsafe(&self, amount: u64) {
        let temp = self.distance.load(Ordering::Relaxed);
        self.pause().await;
        self.distance.store(temp + amount, Ordering::Relaxed);
    }

    /// Exact under any number of writers; the gap is kept inside the critical section.
    pub async fn add_distance_safe(&self, amount: u64) {
        let _guard = self.gate.lock().await;
        let temp = self.distance.load(Ordering::Relaxed);
        self.pause().await;
        self.distance.store(temp + amount, Ordering::Relaxed);
    }

    async fn pause(&self) {
        if self.gap.is_zero() {
            tokio::task::yield_now().await;
        } else {
            sleep(self.gap).await;
        }
    }

    pub fn get(&self) -> u64 {
        self.distance.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.distance.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn hammer(highway: Arc<Highway>, workers: u64, per_worker: u64, safe: bool) -> u64 {
        let mut handles = Vec::new();
        for _ in 0..workers {
            let hw = Arc::clone(&highway);
            handles.push(tokio::spawn(async move {
                for _ in 0..per_worker {
                    if safe {
                        hw.add_distance_safe(1).await;
                    } else {
                        hw.add_distance_unsafe(1).await;
                    }
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        highway.get()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_safe_strategy_counts_every_contribution() {
        for (k, m) in [(1, 1), (3, 7), (8, 20)] {
            let hw = Arc::new(Highway::new(AggregationStrategy::Safe, Duration::from_millis(1)));
            assert_eq!(hammer(hw, k, m, true).await, k * m);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_unsafe_strategy_loses_updates() {
        let (k, m) = (8, 20);
        let mut lost = false;
        for _ in 0..5 {
            let hw = Arc::new(Highway::new(AggregationStrategy::Unsafe, Duration::from_millis(1)));
            let total = hammer(hw, k, m, false).await;
            assert!(total <= k * m);
            if total < k * m {
                lost = true;
                break;
            }
        }
        assert!(lost, "unsafe strategy never lost an update");
    }

    #[tokio::test]
    async fn test_add_follows_live_strategy_and_reset() {
        let hw = Highway::new(AggregationStrategy::Unsafe, Duration::ZERO);
        hw.add(2).await;
        hw.set_strategy(AggregationStrategy::Safe);
        assert_eq!(hw.strategy(), AggregationStrategy::Safe);
        hw.add(3).await;
        assert_eq!(hw.get(), 5);
        hw.reset();
        assert_eq!(hw.get(), 0);
    }
}
