//! Order-tracking route handlers.
//!
//! Opening the tracking page mounts a view in the tracking registry, which
//! starts the order's progress simulation. The page then polls the status
//! fragment until the order is delivered, and closes the view when the
//! visitor leaves. Both requests carry the page's view id (`?view=`), so a
//! page only ever sees and closes its own simulation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use foodapp_core::{OrderId, OrderProgress, StepState};
use serde::Deserialize;
use tracing::instrument;

use super::Layout;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CurrentCart;
use crate::models::{PlacedOrder, find_order};
use crate::services::ViewId;
use crate::state::AppState;

/// Query string identifying one open tracking page.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: String,
}

impl ViewQuery {
    fn view_id(&self) -> Option<ViewId> {
        self.view.parse().ok()
    }
}

/// One step of the progress stepper.
#[derive(Clone)]
pub struct StepView {
    pub id: String,
    pub name: String,
    /// `completed`, `current` or `upcoming`; used as a CSS modifier.
    pub state: &'static str,
}

/// Order status display data for templates.
#[derive(Clone)]
pub struct StatusView {
    pub steps: Vec<StepView>,
    /// Message for the current step; empty if it has none.
    pub message: String,
    pub terminal: bool,
}

impl From<&OrderProgress> for StatusView {
    fn from(progress: &OrderProgress) -> Self {
        let steps = progress
            .step_states()
            .into_iter()
            .map(|(step, state)| StepView {
                id: step.id.to_string(),
                name: step.name.clone(),
                state: match state {
                    StepState::Completed => "completed",
                    StepState::Current => "current",
                    StepState::Upcoming => "upcoming",
                },
            })
            .collect();

        Self {
            steps,
            message: progress
                .current()
                .and_then(|step| step.status_message.clone())
                .unwrap_or_default(),
            terminal: progress.is_terminal(),
        }
    }
}

/// Order details display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub restaurant_name: String,
    pub delivery_address: String,
    pub payment: String,
    pub estimated_delivery: String,
    pub lines: Vec<String>,
    pub total: String,
}

impl From<&PlacedOrder> for OrderView {
    fn from(order: &PlacedOrder) -> Self {
        Self {
            id: order.id.to_string(),
            restaurant_name: order.restaurant_name.clone(),
            delivery_address: order.delivery_address.clone(),
            payment: order.payment_summary(),
            estimated_delivery: order.estimated_delivery(),
            lines: order
                .lines
                .iter()
                .map(|line| format!("{}x {}", line.quantity, line.name))
                .collect(),
            total: order.totals.total_price().display(),
        }
    }
}

/// Tracking page template.
#[derive(Template, WebTemplate)]
#[template(path = "tracking/show.html")]
pub struct TrackingShowTemplate {
    pub layout: Layout,
    pub view_id: String,
    pub order: OrderView,
    pub status: StatusView,
}

/// Order status fragment (polled).
#[derive(Template, WebTemplate)]
#[template(path = "partials/order_status.html")]
pub struct OrderStatusTemplate {
    pub status: StatusView,
}

/// Display the tracking page and start the order's simulation.
///
/// Orders placed in this session show their real details; any other id
/// shows sample details so the page is never empty. Every visit mounts a
/// fresh view, so reloading restarts the simulation from the first step
/// while other pages tracking the same order keep their own progress.
#[instrument(skip(state, current))]
pub async fn show(
    State(state): State<AppState>,
    current: CurrentCart,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let order_id = OrderId::new(id);
    let order = match find_order(current.session(), &order_id).await? {
        Some(order) => order,
        None => {
            tracing::debug!(order_id = %order_id, "order not in session; showing sample details");
            PlacedOrder::placeholder(order_id, state.catalog(), Utc::now())
        }
    };

    let view = state
        .tracking()
        .mount(order)
        .await
        .map_err(|e| AppError::Internal(format!("failed to start order simulation: {e}")))?;

    Ok(TrackingShowTemplate {
        layout: Layout::new(&current),
        view_id: view.view_id.to_string(),
        order: OrderView::from(view.order.as_ref()),
        status: StatusView::from(&view.simulation.progress()),
    })
}

/// Current status of an open tracking view.
///
/// Returns 404 for an unknown view, or once the view is closed or has
/// expired, which tells the page to stop polling.
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<OrderStatusTemplate> {
    let order_id = OrderId::new(id);
    let view = match query.view_id() {
        Some(view_id) => state.tracking().get(&order_id, view_id).await,
        None => None,
    }
    .ok_or_else(|| AppError::NotFound(format!("tracking view {order_id}")))?;

    Ok(OrderStatusTemplate {
        status: StatusView::from(&view.simulation.progress()),
    })
}

/// Close a tracking view, cancelling any pending progress timer.
///
/// Idempotent: closing an unknown or already closed view also succeeds.
#[instrument(skip(state))]
pub async fn close(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> StatusCode {
    let closed = match query.view_id() {
        Some(view_id) => state.tracking().close(&OrderId::new(id), view_id).await,
        None => false,
    };
    tracing::debug!(closed, "tracking view close requested");
    StatusCode::NO_CONTENT
}
