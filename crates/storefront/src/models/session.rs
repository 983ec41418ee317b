//! Session-related types.
//!
//! Everything a visitor carries between requests lives in their session:
//! the cart and the orders they have placed.

use foodapp_core::OrderId;
use tower_sessions::Session;

use super::order::PlacedOrder;

/// Session keys for visitor data.
pub mod keys {
    /// Key for the visitor's cart (`foodapp_core::Cart`).
    pub const CART: &str = "cart";

    /// Key for orders placed in this session (`Vec<PlacedOrder>`, newest last).
    pub const PLACED_ORDERS: &str = "placed_orders";
}

/// Orders kept per session; older ones are dropped first.
pub const MAX_PLACED_ORDERS: usize = 10;

/// Append an order to the session's history.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn record_order(
    session: &Session,
    order: PlacedOrder,
) -> Result<(), tower_sessions::session::Error> {
    let mut orders: Vec<PlacedOrder> = session.get(keys::PLACED_ORDERS).await?.unwrap_or_default();
    orders.push(order);
    if orders.len() > MAX_PLACED_ORDERS {
        let excess = orders.len() - MAX_PLACED_ORDERS;
        orders.drain(..excess);
    }
    session.insert(keys::PLACED_ORDERS, orders).await
}

/// Find an order placed in this session.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn find_order(
    session: &Session,
    order_id: &OrderId,
) -> Result<Option<PlacedOrder>, tower_sessions::session::Error> {
    let orders: Vec<PlacedOrder> = session.get(keys::PLACED_ORDERS).await?.unwrap_or_default();
    Ok(orders.into_iter().rev().find(|order| &order.id == order_id))
}
