//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::catalog::{PromoSlide, Restaurant};
use crate::filters;
use crate::middleware::CurrentCart;
use crate::state::AppState;

/// Restaurant card display data for templates.
#[derive(Clone)]
pub struct RestaurantCardView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub cuisine_types: Vec<String>,
    pub rating: String,
    pub delivery_estimate: String,
}

impl From<&Restaurant> for RestaurantCardView {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id.to_string(),
            name: restaurant.name.clone(),
            image_url: restaurant.image_url.clone(),
            cuisine_types: restaurant.cuisine_types.clone(),
            rating: format!("{:.1}", restaurant.rating),
            delivery_estimate: restaurant.delivery_estimate.clone(),
        }
    }
}

/// Carousel slide display data for templates.
#[derive(Clone)]
pub struct SlideView {
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

impl From<&PromoSlide> for SlideView {
    fn from(slide: &PromoSlide) -> Self {
        Self {
            image_url: slide.image_url.clone(),
            title: slide.title.clone(),
            description: slide.description.clone(),
            link: slide.link.clone(),
        }
    }
}

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub q: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub slides: Vec<SlideView>,
    pub restaurants: Vec<RestaurantCardView>,
    pub query: String,
}

/// Display home page.
///
/// With `?q=`, only restaurants whose name or cuisine matches are listed.
#[instrument(skip(state, current))]
pub async fn home(
    State(state): State<AppState>,
    current: CurrentCart,
    Query(params): Query<HomeQuery>,
) -> impl IntoResponse {
    let query = params.q.trim().to_string();
    let catalog = state.catalog();

    let restaurants: Vec<RestaurantCardView> = catalog
        .search(&query)
        .into_iter()
        .map(RestaurantCardView::from)
        .collect();

    tracing::debug!(results = restaurants.len(), "restaurant search");

    HomeTemplate {
        layout: Layout::new(&current).with_search(&query),
        slides: catalog.slides().iter().map(SlideView::from).collect(),
        restaurants,
        query,
    }
}
