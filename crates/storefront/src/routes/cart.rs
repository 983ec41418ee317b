//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every change is a plain form post
//! followed by a redirect back to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect},
};
use foodapp_core::{Cart, CartTotals, LineItem, MenuItemId, Price};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CurrentCart;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Quantity after pressing "-"; 0 removes the line.
    pub decrement: u32,
    pub increment: u32,
    pub price: String,
    pub line_price: String,
    pub image_url: String,
}

impl From<&LineItem> for CartItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.name.clone(),
            quantity: line.quantity,
            decrement: line.quantity.saturating_sub(1),
            increment: line.quantity.saturating_add(1),
            price: Price::usd(line.unit_price).display(),
            line_price: Price::usd(line.line_total()).display(),
            image_url: line.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Order summary display data for templates.
#[derive(Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub tax: String,
    pub delivery_fee: String,
    pub total: String,
}

impl From<&CartTotals> for TotalsView {
    fn from(totals: &CartTotals) -> Self {
        Self {
            subtotal: totals.subtotal_price().display(),
            tax: totals.tax_price().display(),
            delivery_fee: totals.delivery_fee_price().display(),
            total: totals.total_price().display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub totals: TotalsView,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            totals: TotalsView::from(&cart.totals()),
            item_count: cart.item_count(),
        }
    }
}

/// Update cart form data.
///
/// The quantity arrives as typed text; anything that is not an integer is
/// rejected rather than treated as zero.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(current))]
pub async fn show(current: CurrentCart) -> impl IntoResponse {
    CartShowTemplate {
        layout: Layout::new(&current),
        cart: CartView::from(&current.cart),
    }
}

/// Set a line's quantity. Zero or less removes the line.
#[instrument(skip(current))]
pub async fn update(
    mut current: CurrentCart,
    Form(form): Form<UpdateCartForm>,
) -> Result<impl IntoResponse> {
    let quantity: i64 = form
        .quantity
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid quantity: {}", form.quantity)))?;

    let item_id = MenuItemId::new(form.item_id);
    current.cart.set_quantity(&item_id, quantity);
    current.save().await?;

    let quantity_str = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Updated quantity",
        Some(&[("item_id", item_id.as_str()), ("quantity", &quantity_str)]),
    );

    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(current))]
pub async fn remove(
    mut current: CurrentCart,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<impl IntoResponse> {
    let item_id = MenuItemId::new(form.item_id);
    current.cart.remove_item(&item_id);
    current.save().await?;

    add_breadcrumb("cart", "Removed item", Some(&[("item_id", item_id.as_str())]));

    Ok(Redirect::to("/cart"))
}
