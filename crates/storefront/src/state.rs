//! Application state shared across handlers.

use std::sync::Arc;

use foodapp_core::ProgressPlan;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::{Scheduler, TokioScheduler, TrackingRegistry};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// configuration, the placeholder catalog and the tracking registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    tracking: TrackingRegistry,
}

impl AppState {
    /// Create application state with timers on the tokio runtime.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_scheduler(config, Arc::new(TokioScheduler))
    }

    /// Create application state with an injected scheduler.
    ///
    /// Tests pass a `ManualScheduler` to drive order progress in virtual time.
    #[must_use]
    pub fn with_scheduler(config: StorefrontConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let plan = ProgressPlan::standard(config.order_flow);
        let tracking = TrackingRegistry::new(plan, scheduler, config.tracking_idle);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: Catalog::placeholder(),
                tracking,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the placeholder catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the order-tracking registry.
    #[must_use]
    pub fn tracking(&self) -> &TrackingRegistry {
        &self.inner.tracking
    }
}
