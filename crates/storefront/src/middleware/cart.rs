//! Session cart extractor.
//!
//! The visitor's cart lives in their session and is the single source of
//! truth for every page: the cart page, checkout and the navigation badge all
//! read it through [`CurrentCart`].

use axum::{extract::FromRequestParts, http::request::Parts};
use foodapp_core::Cart;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;
use crate::state::AppState;

/// Extractor for the current visitor's cart.
///
/// A visitor without a stored cart gets an empty one, or the sample cart when
/// demo mode is on. Nothing is written until [`CurrentCart::save`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(mut current: CurrentCart) -> Result<impl IntoResponse> {
///     current.cart.clear();
///     current.save().await?;
///     Ok(format!("{} items", current.cart.item_count()))
/// }
/// ```
pub struct CurrentCart {
    pub cart: Cart,
    session: Session,
}

impl CurrentCart {
    /// Persist the (possibly modified) cart back to the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store rejects the write.
    pub async fn save(&self) -> Result<(), AppError> {
        self.session.insert(session_keys::CART, &self.cart).await?;
        Ok(())
    }

    /// The underlying session, for handlers that store more than the cart.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Navigation badge count.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }
}

impl FromRequestParts<AppState> for CurrentCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let stored: Option<Cart> = session.get(session_keys::CART).await?;
        let cart = match stored {
            Some(cart) => cart,
            None if state.config().demo_cart => Cart::from_items(state.catalog().demo_cart_lines()),
            None => Cart::new(),
        };

        Ok(Self { cart, session })
    }
}
