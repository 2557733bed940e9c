//! Cancellable delayed task.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::trace;

/// Runs only the most recently scheduled task, once `delay` has passed
/// without another one being scheduled.
///
/// Scheduling a task cancels the pending one, if it hasn't started yet. A task
/// whose delay has elapsed runs to completion regardless of later calls.
/// Dropping the debouncer cancels the pending task.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<oneshot::Sender<()>>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task` to run after the delay, replacing any pending task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                // Fires on an explicit cancel or when the sender is dropped
                _ = cancel_rx => trace!("Debounced task superseded"),
                () = tokio::time::sleep(delay) => task.await,
            }
        });

        self.pending = Some(cancel_tx);
    }

    /// Cancel the pending task. No-op if it already started or finished.
    pub fn cancel(&mut self) {
        if let Some(cancel_tx) = self.pending.take() {
            // Err means the task already started; it is left to finish
            let _ = cancel_tx.send(());
        }
    }

    /// Whether a task is still waiting for its delay to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|cancel_tx| !cancel_tx.is_closed())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_only_last_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(DELAY);

        for keystroke in ["h", "he", "hea"] {
            let tx = tx.clone();
            debouncer.schedule(async move {
                tx.send(keystroke).unwrap();
            });
            sleep(Duration::from_millis(100)).await;
        }
        drop(tx);

        assert_eq!(rx.recv().await, Some("hea"));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_schedules_all_run() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(DELAY);

        let first = tx.clone();
        debouncer.schedule(async move {
            first.send(1).unwrap();
        });
        sleep(Duration::from_millis(600)).await;

        let second = tx.clone();
        debouncer.schedule(async move {
            second.send(2).unwrap();
        });
        sleep(Duration::from_millis(600)).await;

        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_run() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.schedule(async move {
            tx.send(()).unwrap();
        });
        assert!(debouncer.is_pending());

        debouncer.cancel();
        sleep(Duration::from_secs(1)).await;

        assert!(!debouncer.is_pending());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_task() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(async move {
            tx.send(()).unwrap();
        });
        drop(debouncer);

        sleep(Duration::from_secs(1)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_task_is_not_aborted() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(DELAY);

        let slow = tx.clone();
        debouncer.schedule(async move {
            slow.send("slow started").unwrap();
            sleep(Duration::from_secs(2)).await;
            slow.send("slow finished").unwrap();
        });

        assert_eq!(rx.recv().await, Some("slow started"));
        assert!(!debouncer.is_pending());

        let fast = tx.clone();
        debouncer.schedule(async move {
            fast.send("fast").unwrap();
        });
        drop(tx);

        assert_eq!(rx.recv().await, Some("fast"));
        assert_eq!(rx.recv().await, Some("slow finished"));
        assert_eq!(rx.recv().await, None);
    }
}
