//! # View Polling
//!
//! Each mounted view re-runs its full discovery sequence on a fixed
//! interval, independent of user action. The task fires once immediately
//! (the "on mount" load) and then on every tick; dropping the handle
//! clears the interval, which is the teardown contract every view relies
//! on.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// The refresh interval every view polls at.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to a repeating view-refresh task.
///
/// The task is aborted when the handle is dropped. In-flight chain calls
/// are not cancelled gracefully - navigating away simply abandons pending
/// state updates.
pub struct Poller {
    task: JoinHandle<()>,
}

impl Poller {
    /// Spawns a task running `tick` immediately and then every `period`.
    pub fn spawn<F, Fut>(period: Duration, tick: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                tick().await;
            }
        });
        Self { task }
    }

    /// Stops the task explicitly (dropping the handle does the same).
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ticks_immediately_and_repeatedly() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let poller = Poller::spawn(Duration::from_millis(10), move || {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(45)).await;
        poller.stop();
        assert!(count.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_drop_clears_the_interval() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let poller = Poller::spawn(Duration::from_millis(5), move || {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(poller);
        let after_drop = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }
}
