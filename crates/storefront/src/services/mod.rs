//! Business logic services for storefront.
//!
//! # Services
//!
//! - `scheduler` - One-shot timers on tokio or on a manually driven virtual clock
//! - `simulation` - Drives one order through its progress plan
//! - `tracking` - Open order-tracking views, torn down when idle or closed

pub mod scheduler;
pub mod simulation;
pub mod tracking;

pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TokioScheduler};
pub use simulation::OrderSimulation;
pub use tracking::{TrackedOrder, TrackingRegistry, ViewId};
