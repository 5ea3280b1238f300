//! Cancelable one-shot timers and a trailing-edge debouncer
//!
//! Both run on the ambient tokio runtime. `ScheduledTask` owns the spawned
//! timer so the caller decides whether it may outlive them; `Debouncer`
//! coalesces bursts of calls into a single deferred action.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Action = Box<dyn FnOnce() + Send + 'static>;

/// A one-shot action scheduled on the tokio runtime
///
/// Dropping the handle detaches the timer; call [`ScheduledTask::cancel`]
/// to stop it from firing.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Runs `action` once after `delay`
    ///
    /// Returns `None` when called outside a tokio runtime; the action is
    /// dropped without running.
    pub fn spawn<F>(delay: Duration, action: F) -> Option<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = Handle::try_current().ok()?;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        Some(Self { handle })
    }

    /// Stops the timer if it has not fired yet
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Returns true once the action ran or the timer was canceled
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Trailing-edge debouncer
///
/// Every [`Debouncer::call`] replaces the pending action and restarts the
/// quiet period; only the last action of a burst runs. Outside a tokio
/// runtime the action runs immediately.
pub struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<Option<Action>>>,
    timer: Mutex<Option<ScheduledTask>>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
        }
    }

    /// Quiet period before the pending action runs
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `action`, superseding any action still waiting
    pub fn call<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *lock(&self.pending) = Some(Box::new(action));

        let pending = Arc::clone(&self.pending);
        let task = ScheduledTask::spawn(self.delay, move || run_pending(&pending));

        let mut timer = lock(&self.timer);
        if let Some(previous) = timer.take() {
            previous.cancel();
        }
        match task {
            Some(task) => *timer = Some(task),
            None => {
                drop(timer);
                run_pending(&self.pending);
            }
        }
    }

    /// Runs the pending action now, if there is one
    pub fn flush(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.cancel();
        }
        run_pending(&self.pending);
    }

    /// Discards the pending action without running it
    pub fn cancel(&self) {
        if let Some(timer) = lock(&self.timer).take() {
            timer.cancel();
        }
        lock(&self.pending).take();
    }

    /// Returns true if an action is waiting for its quiet period to end
    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }
}

fn run_pending(pending: &Mutex<Option<Action>>) {
    let action = lock(pending).take();
    if let Some(action) = action {
        action();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
