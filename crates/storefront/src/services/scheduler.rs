//! One-shot timers behind an injectable clock.
//!
//! [`TokioScheduler`] runs tasks on the tokio runtime. [`ManualScheduler`]
//! keeps a virtual clock that only moves when [`ManualScheduler::advance`] is
//! called, so order progress can be tested without real delays.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

/// Work run once a timer fires.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Arms one-shot timers.
pub trait Scheduler: Send + Sync + fmt::Debug {
    /// Run `task` once `delay` has elapsed, unless the returned handle is
    /// cancelled first.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

/// Handle to a pending timer.
///
/// Dropping the handle does not cancel the timer; call [`TimerHandle::cancel`].
pub struct TimerHandle {
    cancel: Box<dyn FnOnce() + Send + Sync>,
}

impl TimerHandle {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Prevent the task from running. No effect if it already ran.
    pub fn cancel(self) {
        (self.cancel)();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").finish_non_exhaustive()
    }
}

// =============================================================================
// Tokio
// =============================================================================

/// Timers on the tokio runtime: one spawned task per timer, aborted on cancel.
///
/// Must be used from within a runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let join = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        let abort = join.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}

// =============================================================================
// Manual (virtual time)
// =============================================================================

/// Deterministic scheduler driven by an explicit virtual clock.
///
/// Timers fire in deadline order; timers with equal deadlines fire in the
/// order they were armed. Tasks run outside the internal lock, so a task may
/// arm further timers, and those fire within the same [`advance`] if they
/// fall due before its target.
///
/// [`advance`]: ManualScheduler::advance
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<VirtualClock>>,
}

#[derive(Default)]
struct VirtualClock {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), Task>,
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualClock")
            .field("now", &self.now)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VirtualClock> {
        lock_clock(&self.clock)
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of armed, uncancelled timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Move the clock forward by `by`, firing every timer that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.now().saturating_add(by);

        loop {
            let due = {
                let mut clock = self.lock();
                match clock.pending.first_key_value() {
                    Some((&(deadline, _), _)) if deadline <= target => {
                        clock.now = deadline;
                        clock.pending.pop_first().map(|(_, task)| task)
                    }
                    _ => None,
                }
            };

            match due {
                Some(task) => task(),
                None => break,
            }
        }

        self.lock().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let key = {
            let mut clock = self.lock();
            let key = (clock.now.saturating_add(delay), clock.next_seq);
            clock.next_seq += 1;
            clock.pending.insert(key, task);
            key
        };

        let clock: Weak<Mutex<VirtualClock>> = Arc::downgrade(&self.clock);
        TimerHandle::new(move || {
            if let Some(clock) = clock.upgrade() {
                lock_clock(&clock).pending.remove(&key);
            }
        })
    }
}

fn lock_clock(clock: &Mutex<VirtualClock>) -> MutexGuard<'_, VirtualClock> {
    clock.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |label: &'static str| -> Task {
                let log = Arc::clone(&log);
                Box::new(move || log.lock().unwrap().push(label))
            }
        };
        (log, make)
    }

    #[test]
    fn test_manual_fires_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule(Duration::from_secs(5), task("five"));
        scheduler.schedule(Duration::from_secs(1), task("one"));
        scheduler.schedule(Duration::from_secs(3), task("three"));

        scheduler.advance(Duration::from_secs(4));
        assert_eq!(*log.lock().unwrap(), ["one", "three"]);
        assert_eq!(scheduler.now(), Duration::from_secs(4));
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(*log.lock().unwrap(), ["one", "three", "five"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_manual_equal_deadlines_fire_in_arming_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule(Duration::from_secs(2), task("a"));
        scheduler.schedule(Duration::from_secs(2), task("b"));
        scheduler.advance(Duration::from_secs(2));

        assert_eq!(*log.lock().unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_manual_cancel_prevents_firing() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        let handle = scheduler.schedule(Duration::from_secs(1), task("cancelled"));
        scheduler.schedule(Duration::from_secs(2), task("kept"));
        handle.cancel();

        scheduler.advance(Duration::from_secs(10));
        assert_eq!(*log.lock().unwrap(), ["kept"]);
    }

    #[test]
    fn test_manual_task_can_rearm_within_same_advance() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_log = Arc::clone(&log);
        let inner_scheduler = scheduler.clone();
        scheduler.schedule(
            Duration::from_secs(1),
            Box::new(move || {
                inner_log.lock().unwrap().push(inner_scheduler.now());
                let log = Arc::clone(&inner_log);
                let clock = inner_scheduler.clone();
                inner_scheduler.schedule(
                    Duration::from_secs(2),
                    Box::new(move || log.lock().unwrap().push(clock.now())),
                );
            }),
        );

        scheduler.advance(Duration::from_secs(3));
        assert_eq!(
            *log.lock().unwrap(),
            [Duration::from_secs(1), Duration::from_secs(3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_after_delay() {
        let (log, task) = recorder();
        TokioScheduler.schedule(Duration::from_secs(3), task("fired"));

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(log.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*log.lock().unwrap(), ["fired"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_cancel() {
        let (log, task) = recorder();
        let handle = TokioScheduler.schedule(Duration::from_secs(1), task("never"));
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(log.lock().unwrap().is_empty());
    }
}
