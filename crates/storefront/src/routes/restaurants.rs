//! Restaurant detail and menu route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use foodapp_core::{MenuItemId, Price, RestaurantId};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::catalog::{MenuCategory, MenuItem, Restaurant};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CurrentCart;
use crate::state::AppState;

/// Restaurant header display data for templates.
#[derive(Clone)]
pub struct RestaurantView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub logo_url: String,
    pub initials: String,
    pub cuisine: String,
    pub rating: String,
    pub delivery_estimate: String,
    pub description: String,
}

impl From<&Restaurant> for RestaurantView {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id.to_string(),
            name: restaurant.name.clone(),
            image_url: restaurant.image_url.clone(),
            logo_url: restaurant.logo_url.clone(),
            initials: restaurant.initials(),
            cuisine: restaurant.cuisine(),
            rating: format!("{:.1}", restaurant.rating),
            delivery_estimate: restaurant.delivery_estimate.clone(),
            description: restaurant.description.clone(),
        }
    }
}

/// Menu category display data for templates.
#[derive(Clone)]
pub struct MenuCategoryView {
    pub name: String,
    pub items: Vec<MenuItemView>,
}

impl From<&MenuCategory> for MenuCategoryView {
    fn from(category: &MenuCategory) -> Self {
        Self {
            name: category.name.clone(),
            items: category.items.iter().map(MenuItemView::from).collect(),
        }
    }
}

/// Menu item display data for templates.
#[derive(Clone)]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

impl From<&MenuItem> for MenuItemView {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: Price::usd(item.price).display(),
            image_url: item.image_url.clone(),
        }
    }
}

/// Restaurant page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    /// Set after a successful add, to confirm which item went into the cart.
    pub added: Option<String>,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: String,
    pub quantity: Option<u32>,
}

/// Restaurant page template.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/show.html")]
pub struct RestaurantShowTemplate {
    pub layout: Layout,
    pub restaurant: RestaurantView,
    pub categories: Vec<MenuCategoryView>,
    /// Confirmation banner; empty when nothing was just added.
    pub added_notice: String,
}

/// Unknown restaurant template.
#[derive(Template, WebTemplate)]
#[template(path = "restaurants/not_found.html")]
pub struct RestaurantNotFoundTemplate {
    pub layout: Layout,
}

/// Display a restaurant and its menu.
///
/// An unknown id renders the "Restaurant not found" page with a 404.
#[instrument(skip(state, current, query))]
pub async fn show(
    State(state): State<AppState>,
    current: CurrentCart,
    Path(id): Path<String>,
    Query(query): Query<ShowQuery>,
) -> Response {
    let layout = Layout::new(&current);
    let Some(restaurant) = state.catalog().restaurant(&RestaurantId::new(id)) else {
        return (StatusCode::NOT_FOUND, RestaurantNotFoundTemplate { layout }).into_response();
    };

    let added_notice = query
        .added
        .and_then(|item_id| {
            restaurant
                .items()
                .find(|item| item.id.as_str() == item_id)
                .map(|item| format!("{} added to cart.", item.name))
        })
        .unwrap_or_default();

    RestaurantShowTemplate {
        layout,
        restaurant: RestaurantView::from(restaurant),
        categories: restaurant.menu.iter().map(MenuCategoryView::from).collect(),
        added_notice,
    }
    .into_response()
}

/// Add a menu item to the cart, then return to the menu.
///
/// Adding an item already in the cart increases its quantity.
#[instrument(skip(state, current))]
pub async fn add(
    State(state): State<AppState>,
    mut current: CurrentCart,
    Path(id): Path<String>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let restaurant_id = RestaurantId::new(id);
    let item_id = MenuItemId::new(form.item_id);

    let item = state
        .catalog()
        .menu_item(&item_id)
        .filter(|(restaurant, _)| restaurant.id == restaurant_id)
        .map(|(_, item)| item)
        .ok_or_else(|| AppError::NotFound(format!("menu item {item_id}")))?;

    let quantity = form.quantity.unwrap_or(1);
    current.cart.add_item(item.to_line_item(), quantity);
    current.save().await?;

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("item_id", item_id.as_str()), ("restaurant_id", restaurant_id.as_str())]),
    );
    tracing::info!(item_id = %item_id, quantity, "item added to cart");

    Ok(Redirect::to(&format!("/restaurant-menu/{restaurant_id}?added={item_id}")).into_response())
}
