//! FoodApp Core - Shared domain library.
//!
//! This crate provides the domain model used by the storefront:
//! - [`cart`] - Cart ledger: line items, quantity updates, derived totals
//! - [`checkout`] - Declarative checkout form constraints
//! - [`order`] - Order-progress state machine over a fixed step sequence
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no timers,
//! no HTTP. Anything time-driven (the order simulation) lives in the storefront
//! and drives [`order::OrderProgress`] through an injectable scheduler.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod order;
pub mod types;

pub use cart::{Cart, CartTotals, LineItem, compute_totals};
pub use checkout::{CheckoutForm, Field, PaymentMethod, ValidCheckout, ValidationErrors};
pub use order::{
    DeliveryFlow, OrderProgress, OrderStep, PlanError, ProgressPlan, StepId, StepSequence,
    StepState, Transition,
};
pub use types::*;
