//! Timer-driven order progress.
//!
//! An [`OrderSimulation`] owns one [`OrderProgress`] and keeps exactly one
//! timer armed while the order is not finished. When the timer fires the
//! order advances and the next timer is armed. [`OrderSimulation::teardown`]
//! cancels the pending timer; after it returns nothing mutates the progress
//! again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use foodapp_core::{OrderId, OrderProgress, PlanError, ProgressPlan};

use super::scheduler::{Scheduler, TimerHandle};

/// Shared handle to a running (or torn-down) simulation.
#[derive(Debug, Clone)]
pub struct OrderSimulation {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    order_id: OrderId,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<SimulationState>,
}

#[derive(Debug)]
struct SimulationState {
    progress: OrderProgress,
    pending: Option<TimerHandle>,
    torn_down: bool,
}

impl OrderSimulation {
    /// Start at the first step of `plan` and arm the first timer.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::EmptySequence`] if the plan has no steps.
    pub fn start(
        order_id: OrderId,
        plan: ProgressPlan,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, PlanError> {
        let progress = OrderProgress::start(plan)?;
        let shared = Arc::new(Shared {
            order_id,
            scheduler,
            state: Mutex::new(SimulationState {
                progress,
                pending: None,
                torn_down: false,
            }),
        });

        {
            let mut state = shared.lock();
            Shared::arm(&shared, &mut state);
        }

        tracing::debug!(order_id = %shared.order_id, "order simulation started");
        Ok(Self { shared })
    }

    #[must_use]
    pub fn order_id(&self) -> &OrderId {
        &self.shared.order_id
    }

    /// A copy of the current progress.
    #[must_use]
    pub fn progress(&self) -> OrderProgress {
        self.shared.lock().progress.clone()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.shared.lock().torn_down
    }

    /// Whether a timer is currently armed.
    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.shared.lock().pending.is_some()
    }

    /// Cancel the pending timer and freeze the progress. Idempotent.
    pub fn teardown(&self) {
        self.shared.teardown();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SimulationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the timer for the current step's outgoing transition, if any.
    fn arm(this: &Arc<Self>, state: &mut SimulationState) {
        if state.torn_down {
            return;
        }
        let Some(transition) = state.progress.next_transition() else {
            state.pending = None;
            return;
        };

        let weak: Weak<Self> = Arc::downgrade(this);
        let handle = this.scheduler.schedule(
            transition.delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Self::fire(&shared);
                }
            }),
        );
        state.pending = Some(handle);
    }

    fn fire(this: &Arc<Self>) {
        let mut state = this.lock();
        if state.torn_down {
            return;
        }
        state.pending = None;

        if let Some(step) = state.progress.advance().cloned() {
            tracing::info!(order_id = %this.order_id, step = %step, "order advanced");
        }

        Self::arm(this, &mut state);
    }

    fn teardown(&self) {
        let pending = {
            let mut state = self.lock();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.pending.take()
        };

        if let Some(handle) = pending {
            handle.cancel();
        }
        tracing::debug!(order_id = %self.order_id, "order simulation torn down");
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.teardown();
    }
}
