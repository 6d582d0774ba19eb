use super::clock::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Work to run once an entry's TTL has elapsed
pub type ExpiryTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs expiry tasks after a delay
///
/// Scheduled deletion only reclaims memory: reads already treat an entry as
/// gone once its deadline passes, so a scheduler that never fires is still
/// correct.
pub trait ExpiryScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: ExpiryTask);
}

/// Schedules expiry on the ambient tokio runtime
///
/// Outside a runtime the task is dropped and the entry is reclaimed lazily
/// on its next read.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl ExpiryScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: ExpiryTask) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    task();
                });
            }
            Err(_) => {
                tracing::debug!("No tokio runtime; cache entry will expire lazily");
            }
        }
    }
}

/// Holds expiry tasks until [`ManualScheduler::run_due`] is called
pub struct ManualScheduler {
    clock: Arc<dyn Clock>,
    pending: Mutex<Vec<(Instant, ExpiryTask)>>,
}

impl ManualScheduler {
    /// Create a scheduler whose deadlines are measured on `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Run every task whose deadline has passed; returns how many ran
    pub fn run_due(&self) -> usize {
        let now = self.clock.now();
        let due: Vec<ExpiryTask> = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            let (due, waiting): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|(deadline, _)| *deadline <= now);
            *pending = waiting;
            due.into_iter().map(|(_, task)| task).collect()
        };

        let count = due.len();
        for task in due {
            task();
        }
        count
    }

    /// Number of tasks still waiting
    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ExpiryScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: ExpiryTask) {
        let deadline = self.clock.now() + delay;
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((deadline, task));
    }
}
