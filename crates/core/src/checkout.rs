//! Checkout form constraints.
//!
//! Every constraint is declared up front in [`CHECKOUT_SCHEMA`] and checked
//! atomically by [`validate`]: either the whole form passes and a
//! [`ValidCheckout`] comes back, or every failing field is reported at once.
//! [`validate_field`] runs the same rule for a single field so the form can
//! flag problems as the visitor types.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// US ZIP or ZIP+4.
#[allow(clippy::unwrap_used)] // literal pattern, checked by tests
static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").unwrap());

/// Countries offered by the checkout form, as `(value, label)`.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("USA", "United States"),
    ("Canada", "Canada"),
    ("UK", "United Kingdom"),
];

/// Default country pre-selected on a fresh form.
pub const DEFAULT_COUNTRY: &str = "USA";

/// Payment methods accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    Cod,
}

impl PaymentMethod {
    /// All methods in display order.
    pub const ALL: [Self; 3] = [Self::CreditCard, Self::Paypal, Self::Cod];

    /// Form value (`creditCard`, `paypal`, `cod`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "creditCard",
            Self::Paypal => "paypal",
            Self::Cod => "cod",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::Paypal => "PayPal",
            Self::Cod => "Cash on Delivery (COD)",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| format!("invalid payment method: {s}"))
    }
}

/// Raw checkout form input, exactly as submitted.
///
/// Field names follow the form (`fullName`, `postalCode`, ...). An unchecked
/// terms checkbox is simply absent from the submission, hence the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub payment_method: Option<String>,
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
    pub card_cvc: Option<String>,
    #[serde(deserialize_with = "deserialize_checkbox")]
    pub agree_to_terms: bool,
}

impl CheckoutForm {
    /// A blank form with the default country selected.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            ..Self::default()
        }
    }
}

/// HTML checkboxes submit `on` (or a custom value) when checked.
fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(matches!(value.as_str(), "on" | "true" | "1" | "yes"))
}

/// A constrained checkout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Address,
    City,
    PostalCode,
    Country,
    PaymentMethod,
    AgreeToTerms,
}

impl Field {
    /// Form field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Address => "address",
            Self::City => "city",
            Self::PostalCode => "postalCode",
            Self::Country => "country",
            Self::PaymentMethod => "paymentMethod",
            Self::AgreeToTerms => "agreeToTerms",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CHECKOUT_SCHEMA
            .iter()
            .map(|rule| rule.field)
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown checkout field: {s}"))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kind of check applied to a field.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// At least this many characters.
    MinLength(usize),
    /// Must match the postal code pattern.
    PostalCode,
    /// Must be one of [`PaymentMethod::ALL`].
    PaymentMethod,
    /// Must be `true`.
    Accepted,
}

/// One declared rule: a field, its constraint, and the message shown on failure.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub constraint: Constraint,
    pub message: &'static str,
}

/// The full checkout constraint set, in form order.
pub const CHECKOUT_SCHEMA: &[FieldRule] = &[
    FieldRule {
        field: Field::FullName,
        constraint: Constraint::MinLength(2),
        message: "Full name must be at least 2 characters.",
    },
    FieldRule {
        field: Field::Address,
        constraint: Constraint::MinLength(5),
        message: "Address is required.",
    },
    FieldRule {
        field: Field::City,
        constraint: Constraint::MinLength(2),
        message: "City is required.",
    },
    FieldRule {
        field: Field::PostalCode,
        constraint: Constraint::PostalCode,
        message: "Invalid postal code.",
    },
    FieldRule {
        field: Field::Country,
        constraint: Constraint::MinLength(2),
        message: "Country is required.",
    },
    FieldRule {
        field: Field::PaymentMethod,
        constraint: Constraint::PaymentMethod,
        message: "Please select a payment method.",
    },
    FieldRule {
        field: Field::AgreeToTerms,
        constraint: Constraint::Accepted,
        message: "You must agree to the terms and conditions.",
    },
];

impl FieldRule {
    fn check(&self, form: &CheckoutForm) -> Option<FieldError> {
        let passed = match (self.constraint, self.field) {
            (Constraint::MinLength(min), field) => text_value(form, field)
                .is_some_and(|value| value.chars().count() >= min),
            (Constraint::PostalCode, _) => POSTAL_CODE.is_match(&form.postal_code),
            (Constraint::PaymentMethod, _) => form
                .payment_method
                .as_deref()
                .is_some_and(|value| value.parse::<PaymentMethod>().is_ok()),
            (Constraint::Accepted, _) => form.agree_to_terms,
        };

        (!passed).then(|| FieldError {
            field: self.field,
            message: self.message.to_string(),
        })
    }
}

fn text_value(form: &CheckoutForm, field: Field) -> Option<&str> {
    match field {
        Field::FullName => Some(&form.full_name),
        Field::Address => Some(&form.address),
        Field::City => Some(&form.city),
        Field::PostalCode => Some(&form.postal_code),
        Field::Country => Some(&form.country),
        Field::PaymentMethod => form.payment_method.as_deref(),
        Field::AgreeToTerms => None,
    }
}

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every constraint that failed for a submission. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("checkout form has {} invalid field(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// All failures in form order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message for a given field, if it failed.
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.message_for(field).is_some()
    }
}

/// Card details, kept only when paying by card. Unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: Option<String>,
    pub expiry: Option<String>,
    pub cvc: Option<String>,
}

impl CardDetails {
    /// Last four digits of the card number, for display.
    #[must_use]
    pub fn last_four(&self) -> Option<String> {
        let digits: Vec<char> = self
            .number
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let start = digits.len().checked_sub(4)?;
        Some(digits.get(start..)?.iter().collect())
    }
}

/// A checkout submission that passed every constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidCheckout {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub payment_method: PaymentMethod,
    pub card: Option<CardDetails>,
}

impl ValidCheckout {
    /// Single-line delivery address (`street, city, postal code`).
    #[must_use]
    pub fn delivery_address(&self) -> String {
        format!("{}, {}, {}", self.address, self.city, self.postal_code)
    }
}

/// Check a submission against [`CHECKOUT_SCHEMA`].
///
/// # Errors
///
/// Returns every failing field when any constraint is violated. Nothing is
/// accepted partially.
pub fn validate(form: &CheckoutForm) -> Result<ValidCheckout, ValidationErrors> {
    let errors: Vec<FieldError> = CHECKOUT_SCHEMA
        .iter()
        .filter_map(|rule| rule.check(form))
        .collect();

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    let payment_method = form
        .payment_method
        .as_deref()
        .and_then(|value| value.parse::<PaymentMethod>().ok())
        .ok_or_else(|| {
            ValidationErrors(vec![FieldError {
                field: Field::PaymentMethod,
                message: "Please select a payment method.".to_string(),
            }])
        })?;

    let card = (payment_method == PaymentMethod::CreditCard).then(|| CardDetails {
        number: non_blank(form.card_number.as_deref()),
        expiry: non_blank(form.card_expiry.as_deref()),
        cvc: non_blank(form.card_cvc.as_deref()),
    });

    Ok(ValidCheckout {
        full_name: form.full_name.clone(),
        address: form.address.clone(),
        city: form.city.clone(),
        postal_code: form.postal_code.clone(),
        country: form.country.clone(),
        payment_method,
        card,
    })
}

/// Check a single field of a submission.
///
/// Returns `None` when the field is valid.
#[must_use]
pub fn validate_field(form: &CheckoutForm, field: Field) -> Option<FieldError> {
    CHECKOUT_SCHEMA
        .iter()
        .filter(|rule| rule.field == field)
        .find_map(|rule| rule.check(form))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
