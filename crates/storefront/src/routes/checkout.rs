//! Checkout route handlers.
//!
//! The form is validated against the declared checkout constraints. A failed
//! submission re-renders the form with every message beside its field; a
//! successful one records the order, empties the cart and redirects to the
//! tracking page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use foodapp_core::checkout::{self, COUNTRIES};
use foodapp_core::{CheckoutForm, Field, OrderId, PaymentMethod, ValidationErrors};
use tracing::instrument;

use super::Layout;
use super::cart::CartView;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CurrentCart;
use crate::models::{PlacedOrder, record_order};
use crate::state::AppState;

/// Per-field error messages for templates. Empty when the field is valid.
#[derive(Clone, Default)]
pub struct FieldMessages {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub payment_method: String,
    pub agree_to_terms: String,
}

impl From<&ValidationErrors> for FieldMessages {
    fn from(errors: &ValidationErrors) -> Self {
        let message = |field| errors.message_for(field).unwrap_or_default().to_string();
        Self {
            full_name: message(Field::FullName),
            address: message(Field::Address),
            city: message(Field::City),
            postal_code: message(Field::PostalCode),
            country: message(Field::Country),
            payment_method: message(Field::PaymentMethod),
            agree_to_terms: message(Field::AgreeToTerms),
        }
    }
}

/// Select option display data for templates.
#[derive(Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Submitted values echoed back into the form.
#[derive(Clone)]
pub struct CheckoutFormView {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvc: String,
    pub agree_to_terms: bool,
    pub countries: Vec<OptionView>,
    pub payment_methods: Vec<OptionView>,
    /// Card fields are only shown for card payments.
    pub show_card: bool,
}

impl From<&CheckoutForm> for CheckoutFormView {
    fn from(form: &CheckoutForm) -> Self {
        let payment_method = form.payment_method.as_deref().unwrap_or_default();
        Self {
            full_name: form.full_name.clone(),
            address: form.address.clone(),
            city: form.city.clone(),
            postal_code: form.postal_code.clone(),
            card_number: form.card_number.clone().unwrap_or_default(),
            card_expiry: form.card_expiry.clone().unwrap_or_default(),
            card_cvc: form.card_cvc.clone().unwrap_or_default(),
            agree_to_terms: form.agree_to_terms,
            countries: COUNTRIES
                .iter()
                .map(|(code, label)| OptionView {
                    value: (*code).to_string(),
                    label: (*label).to_string(),
                    selected: form.country == *code,
                })
                .collect(),
            payment_methods: PaymentMethod::ALL
                .iter()
                .map(|method| OptionView {
                    value: method.as_str().to_string(),
                    label: method.label().to_string(),
                    selected: payment_method == method.as_str(),
                })
                .collect(),
            show_card: payment_method == PaymentMethod::CreditCard.as_str(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub form: CheckoutFormView,
    pub errors: FieldMessages,
    pub cart: CartView,
    /// Summary banner after a rejected submission.
    pub error_summary: String,
}

/// Single field error fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/field_error.html")]
pub struct FieldErrorTemplate {
    pub message: String,
}

/// Display the checkout form. An empty cart has nothing to check out.
#[instrument(skip(current))]
pub async fn show(current: CurrentCart) -> Response {
    if current.cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        layout: Layout::new(&current),
        form: CheckoutFormView::from(&CheckoutForm::blank()),
        errors: FieldMessages::default(),
        cart: CartView::from(&current.cart),
        error_summary: String::new(),
    }
    .into_response()
}

/// Place an order.
///
/// Invalid input re-renders the form with 422. On success the order is
/// stored in the session, the cart is cleared, and the visitor is sent to
/// `/order-tracking/{id}`.
#[instrument(skip(state, current, form))]
pub async fn submit(
    State(state): State<AppState>,
    mut current: CurrentCart,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    if current.cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let valid = match checkout::validate(&form) {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::info!(errors = errors.errors().len(), "checkout rejected");
            let page = CheckoutTemplate {
                layout: Layout::new(&current),
                form: CheckoutFormView::from(&form),
                errors: FieldMessages::from(&errors),
                cart: CartView::from(&current.cart),
                error_summary: "Please correct the highlighted fields.".to_string(),
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let placed_at = Utc::now();
    let order_id = OrderId::from_timestamp(placed_at);
    let order = PlacedOrder::from_checkout(
        order_id.clone(),
        &valid,
        &current.cart,
        state.catalog(),
        placed_at,
    );
    let total = order.totals.total_price().display();

    record_order(current.session(), order).await?;
    current.cart.clear();
    current.save().await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[
            ("order_id", order_id.as_str()),
            ("payment_method", valid.payment_method.as_str()),
        ]),
    );
    tracing::info!(order_id = %order_id, total = %total, "order placed");

    Ok(Redirect::to(&format!("/order-tracking/{order_id}")).into_response())
}

/// Validate one field of the checkout form (on blur).
///
/// Returns the error fragment for that field; empty when valid.
#[instrument(skip(form))]
pub async fn validate_field(
    Path(field): Path<String>,
    Form(form): Form<CheckoutForm>,
) -> Result<FieldErrorTemplate> {
    let field: Field = field.parse().map_err(AppError::BadRequest)?;
    let message = checkout::validate_field(&form, field)
        .map(|error| error.message)
        .unwrap_or_default();

    Ok(FieldErrorTemplate { message })
}
