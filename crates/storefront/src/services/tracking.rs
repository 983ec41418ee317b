//! Live order-tracking views.
//!
//! Each open tracking page owns one [`OrderSimulation`]. Mounting a page
//! issues a fresh [`ViewId`]; the page polls and closes its view with that id,
//! so two pages showing the same order (another tab, another visitor) never
//! share or replace each other's simulation.
//!
//! Views live in a `moka` cache with a time-to-idle: polling the status
//! fragment keeps a view alive. A view that stops polling, or that the page
//! closes explicitly, is evicted and its simulation torn down.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use foodapp_core::{OrderId, PlanError, ProgressPlan};
use moka::future::Cache;
use moka::notification::RemovalCause;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::scheduler::Scheduler;
use super::simulation::OrderSimulation;
use crate::models::PlacedOrder;

/// Upper bound on concurrently open tracking views.
const MAX_TRACKED_VIEWS: u64 = 10_000;

/// Identifies one mounted tracking page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ViewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ViewKey {
    order_id: OrderId,
    view_id: ViewId,
}

/// An open tracking view: the order shown and its running simulation.
#[derive(Debug, Clone)]
pub struct TrackedOrder {
    pub view_id: ViewId,
    pub order: Arc<PlacedOrder>,
    pub simulation: OrderSimulation,
}

/// Registry of open tracking views.
///
/// Cheap to clone; clones share the same views.
#[derive(Debug, Clone)]
pub struct TrackingRegistry {
    views: Cache<ViewKey, TrackedOrder>,
    plan: Arc<ProgressPlan>,
    scheduler: Arc<dyn Scheduler>,
}

impl TrackingRegistry {
    /// Create a registry whose views expire after `idle` without access.
    #[must_use]
    pub fn new(plan: ProgressPlan, scheduler: Arc<dyn Scheduler>, idle: Duration) -> Self {
        let views = Cache::builder()
            .max_capacity(MAX_TRACKED_VIEWS)
            .time_to_idle(idle)
            .eviction_listener(|key: Arc<ViewKey>, view: TrackedOrder, cause| {
                view.simulation.teardown();
                debug!(
                    order_id = %key.order_id,
                    view_id = %key.view_id,
                    cause = ?cause,
                    "tracking view evicted"
                );
                if cause == RemovalCause::Expired {
                    info!(
                        order_id = %key.order_id,
                        view_id = %key.view_id,
                        "tracking view expired"
                    );
                }
            })
            .build();

        Self {
            views,
            plan: Arc::new(plan),
            scheduler,
        }
    }

    #[must_use]
    pub fn plan(&self) -> &ProgressPlan {
        &self.plan
    }

    /// Open a new tracking view for `order`, starting its own simulation from
    /// the first step. Views already open for the same order are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] if the configured plan has no steps.
    pub async fn mount(&self, order: PlacedOrder) -> Result<TrackedOrder, PlanError> {
        let key = ViewKey {
            order_id: order.id.clone(),
            view_id: ViewId::new(),
        };
        let simulation = OrderSimulation::start(
            key.order_id.clone(),
            ProgressPlan::clone(&self.plan),
            Arc::clone(&self.scheduler),
        )?;
        let view = TrackedOrder {
            view_id: key.view_id,
            order: Arc::new(order),
            simulation,
        };

        info!(order_id = %key.order_id, view_id = %key.view_id, "tracking view mounted");
        self.views.insert(key, view.clone()).await;
        Ok(view)
    }

    /// An open view of `order_id`, refreshing its idle timer.
    pub async fn get(&self, order_id: &OrderId, view_id: ViewId) -> Option<TrackedOrder> {
        self.views.get(&Self::key(order_id, view_id)).await
    }

    /// Close a view and tear its simulation down.
    ///
    /// Returns `false` if no such view was open.
    pub async fn close(&self, order_id: &OrderId, view_id: ViewId) -> bool {
        match self.views.remove(&Self::key(order_id, view_id)).await {
            Some(view) => {
                view.simulation.teardown();
                info!(order_id = %order_id, view_id = %view_id, "tracking view closed");
                true
            }
            None => false,
        }
    }

    fn key(order_id: &OrderId, view_id: ViewId) -> ViewKey {
        ViewKey {
            order_id: order_id.clone(),
            view_id,
        }
    }

    /// Run pending cache maintenance, evicting (and tearing down) idle views.
    pub async fn run_pending_tasks(&self) {
        self.views.run_pending_tasks().await;
    }

    /// Number of open views (after pending maintenance has run).
    #[must_use]
    pub fn len(&self) -> u64 {
        self.views.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn a background task that evicts idle views every `every`.
    #[must_use]
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.run_pending_tasks().await;
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use foodapp_core::DeliveryFlow;

    use super::*;
    use crate::catalog::Catalog;
    use crate::services::scheduler::ManualScheduler;

    fn registry(scheduler: &ManualScheduler, idle: Duration) -> TrackingRegistry {
        TrackingRegistry::new(
            ProgressPlan::standard(DeliveryFlow::DeliveryOnly),
            Arc::new(scheduler.clone()),
            idle,
        )
    }

    fn order(id: &str) -> PlacedOrder {
        PlacedOrder::placeholder(OrderId::new(id), &Catalog::placeholder(), Utc::now())
    }

    fn current(view: &TrackedOrder) -> String {
        view.simulation.progress().current_id().as_str().to_string()
    }

    #[tokio::test]
    async fn test_mount_starts_simulation() {
        let scheduler = ManualScheduler::new();
        let registry = registry(&scheduler, Duration::from_secs(30));
        let order_id = OrderId::new("ORD-1");

        let view = registry.mount(order("ORD-1")).await.unwrap();
        assert_eq!(current(&view), "confirmed");

        scheduler.advance(Duration::from_secs(3));
        let fetched = registry.get(&order_id, view.view_id).await.unwrap();
        assert_eq!(current(&fetched), "preparing");
    }

    #[tokio::test]
    async fn test_close_tears_down() {
        let scheduler = ManualScheduler::new();
        let registry = registry(&scheduler, Duration::from_secs(30));
        let order_id = OrderId::new("ORD-1");

        let view = registry.mount(order("ORD-1")).await.unwrap();
        assert!(registry.close(&order_id, view.view_id).await);
        assert!(view.simulation.is_torn_down());
        assert_eq!(scheduler.pending(), 0);

        assert!(registry.get(&order_id, view.view_id).await.is_none());
        assert!(!registry.close(&order_id, view.view_id).await);
    }

    #[tokio::test]
    async fn test_second_mount_of_same_order_leaves_first_running() {
        let scheduler = ManualScheduler::new();
        let registry = registry(&scheduler, Duration::from_secs(30));
        let order_id = OrderId::new("ORD-1");

        let first = registry.mount(order("ORD-1")).await.unwrap();
        scheduler.advance(Duration::from_secs(9));
        let second = registry.mount(order("ORD-1")).await.unwrap();
        registry.run_pending_tasks().await;

        assert_ne!(first.view_id, second.view_id);
        assert_eq!(registry.len(), 2);
        assert_eq!(scheduler.pending(), 2);

        let first = registry.get(&order_id, first.view_id).await.unwrap();
        assert!(!first.simulation.is_torn_down());
        assert_eq!(current(&first), "delivery");
        assert_eq!(current(&second), "confirmed");
    }

    #[tokio::test]
    async fn test_close_only_affects_the_named_view() {
        let scheduler = ManualScheduler::new();
        let registry = registry(&scheduler, Duration::from_secs(30));
        let order_id = OrderId::new("ORD-1");

        let first = registry.mount(order("ORD-1")).await.unwrap();
        let second = registry.mount(order("ORD-1")).await.unwrap();
        assert!(registry.close(&order_id, second.view_id).await);

        assert!(second.simulation.is_torn_down());
        assert!(!first.simulation.is_torn_down());
        assert!(registry.get(&order_id, first.view_id).await.is_some());
    }

    #[tokio::test]
    async fn test_view_id_is_scoped_to_its_order() {
        let scheduler = ManualScheduler::new();
        let registry = registry(&scheduler, Duration::from_secs(30));

        let view = registry.mount(order("ORD-1")).await.unwrap();
        let other = OrderId::new("ORD-2");

        assert!(registry.get(&other, view.view_id).await.is_none());
        assert!(!registry.close(&other, view.view_id).await);
        assert!(!view.simulation.is_torn_down());
    }

    #[tokio::test]
    async fn test_idle_view_is_evicted_and_torn_down() {
        let scheduler = ManualScheduler::new();
        let registry = registry(&scheduler, Duration::from_millis(100));

        let view = registry.mount(order("ORD-1")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        registry.run_pending_tasks().await;

        assert!(registry.get(&OrderId::new("ORD-1"), view.view_id).await.is_none());
        assert!(view.simulation.is_torn_down());
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_views_are_independent() {
        let scheduler = ManualScheduler::new();
        let registry = registry(&scheduler, Duration::from_secs(30));

        let a = registry.mount(order("ORD-A")).await.unwrap();
        let b = registry.mount(order("ORD-B")).await.unwrap();
        registry.close(&OrderId::new("ORD-A"), a.view_id).await;
        scheduler.advance(Duration::from_secs(3));

        assert_eq!(current(&a), "confirmed");
        assert_eq!(current(&b), "preparing");
    }

    #[test]
    fn test_view_id_roundtrips_through_text() {
        let id = ViewId::new();
        assert_eq!(id.to_string().parse::<ViewId>().unwrap(), id);
        assert!("not-a-view".parse::<ViewId>().is_err());
    }
}
