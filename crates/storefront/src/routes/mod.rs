//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                - Home page (promotions, restaurants, ?q= search)
//! GET  /health                          - Health check
//!
//! # Restaurants
//! GET  /restaurant-menu/{id}            - Restaurant detail and menu
//! POST /restaurant-menu/{id}/add        - Add a menu item to the cart
//!
//! # Cart
//! GET  /cart                            - Cart page
//! POST /cart/update                     - Change a line's quantity (0 or less removes it)
//! POST /cart/remove                     - Remove a line
//!
//! # Checkout
//! GET  /checkout                        - Checkout form (redirects to /cart when empty)
//! POST /checkout                        - Place order
//! POST /checkout/validate/{field}       - Validate one field (error fragment)
//!
//! # Order tracking
//! GET  /order-tracking/{id}             - Tracking page; starts the progress simulation
//! GET  /order-tracking/{id}/status      - Status fragment for ?view= (polled)
//! POST /order-tracking/{id}/close       - Close the ?view= view and stop its simulation
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod not_found;
pub mod restaurants;
pub mod tracking;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{CurrentCart, form_rate_limiter};
use crate::state::AppState;

pub use not_found::not_found;

/// Data every page needs for the shared header.
#[derive(Clone, Default)]
pub struct Layout {
    /// Navigation cart badge; hidden when zero.
    pub cart_count: u32,
    /// Pre-fills the header search box.
    pub search_query: String,
}

impl Layout {
    #[must_use]
    pub fn new(current: &CurrentCart) -> Self {
        Self {
            cart_count: current.item_count(),
            search_query: String::new(),
        }
    }

    #[must_use]
    pub fn with_search(mut self, query: &str) -> Self {
        self.search_query = query.to_string();
        self
    }
}

/// All page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/restaurant-menu", restaurant_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/order-tracking", tracking_routes())
}

/// Create the restaurant routes router.
pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/add", post(restaurants::add))
        .route_layer(form_rate_limiter())
        .route("/{id}", get(restaurants::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route_layer(form_rate_limiter())
        .route("/", get(cart::show))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::submit))
        .route("/validate/{field}", post(checkout::validate_field))
        .route_layer(form_rate_limiter())
        .route("/", get(checkout::show))
}

/// Create the order-tracking routes router.
pub fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(tracking::show))
        .route("/{id}/status", get(tracking::status))
        .route("/{id}/close", post(tracking::close))
}
