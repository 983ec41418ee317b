//! Domain models for storefront.

pub mod order;
pub mod session;

pub use order::{OrderLine, PlacedOrder};
pub use session::{find_order, keys as session_keys, record_order};
