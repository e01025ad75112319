//! Cancellable one-shot timers that report back through the event channel.
//!
//! [`Scheduler::schedule`] spawns a task that sleeps and then sends an event
//! built from the timer's [`TimerId`].  [`TimerHandle::cancel`] aborts the
//! task, but an event already sitting in the channel cannot be recalled, so
//! whoever receives it must also check the id.  [`Debounce`] does both: it
//! keeps at most one pending timer and [`Debounce::fire`] rejects ids that
//! were superseded or cancelled.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

// ---------------------------------------------------------------------------
// TimerHandle
// ---------------------------------------------------------------------------

/// A scheduled timer.  Dropping the handle cancels it.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancel the timer.  No-op if it already fired.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Spawns timers that deliver events of type `E` on `tx`.
#[derive(Debug)]
pub struct Scheduler<E> {
    tx: mpsc::Sender<E>,
    next_id: u64,
}

impl<E: Send + 'static> Scheduler<E> {
    pub fn new(tx: mpsc::Sender<E>) -> Self {
        Self { tx, next_id: 0 }
    }

    /// After `delay`, send `make(id)`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, make: F) -> TimerHandle
    where
        F: FnOnce(TimerId) -> E + Send + 'static,
    {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(make(id)).await.is_err() {
                log::debug!("scheduler: receiver gone, timer {id:?} dropped");
            }
        });

        TimerHandle { id, task }
    }
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

/// A single-slot timer: arming replaces whatever was pending.
#[derive(Debug, Default)]
pub struct Debounce {
    pending: Option<TimerHandle>,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer and schedule a new one.
    pub fn arm<E, F>(&mut self, scheduler: &mut Scheduler<E>, delay: Duration, make: F) -> TimerId
    where
        E: Send + 'static,
        F: FnOnce(TimerId) -> E + Send + 'static,
    {
        self.cancel();
        let handle = scheduler.schedule(delay, make);
        let id = handle.id();
        self.pending = Some(handle);
        id
    }

    /// Cancel the pending timer.  Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept a delivered timer event.
    ///
    /// Returns `true` and clears the slot if `id` is the current timer;
    /// `false` for a stale or cancelled one.
    pub fn fire(&mut self, id: TimerId) -> bool {
        match &self.pending {
            Some(handle) if handle.id() == id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
