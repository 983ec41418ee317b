//! Placed orders.
//!
//! A [`PlacedOrder`] is the record of a successful checkout: what was bought,
//! where it goes and what it cost. It is kept in the visitor's session and
//! shown on the order-tracking page.

use chrono::{DateTime, TimeDelta, Utc};
use foodapp_core::checkout::{CardDetails, ValidCheckout};
use foodapp_core::{Cart, CartTotals, LineItem, MenuItemId, OrderId, PaymentMethod};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// Earliest and latest delivery, in minutes after the order was placed.
const DELIVERY_WINDOW_MINUTES: (i64, i64) = (30, 45);

/// Shown when no cart line maps to a known restaurant.
const UNKNOWN_RESTAURANT: &str = "FoodApp";

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
}

/// A submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub restaurant_name: String,
    pub customer_name: String,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    /// Last four card digits, for card payments that supplied a number.
    #[serde(default)]
    pub card_last_four: Option<String>,
    pub lines: Vec<OrderLine>,
    pub totals: CartTotals,
    pub placed_at: DateTime<Utc>,
}

impl PlacedOrder {
    /// Record a validated checkout of `cart`.
    #[must_use]
    pub fn from_checkout(
        id: OrderId,
        checkout: &ValidCheckout,
        cart: &Cart,
        catalog: &Catalog,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            restaurant_name: restaurant_names(catalog, cart.items()),
            customer_name: checkout.full_name.clone(),
            delivery_address: checkout.delivery_address(),
            payment_method: checkout.payment_method,
            card_last_four: checkout.card.as_ref().and_then(CardDetails::last_four),
            lines: order_lines(cart.items()),
            totals: cart.totals(),
            placed_at,
        }
    }

    /// Sample details shown when tracking an order this session never placed.
    #[must_use]
    pub fn placeholder(id: OrderId, catalog: &Catalog, now: DateTime<Utc>) -> Self {
        let items: Vec<LineItem> = ["m3", "m5"]
            .into_iter()
            .filter_map(|id| catalog.menu_item(&MenuItemId::new(id)))
            .map(|(_, item)| item.to_line_item())
            .collect();
        let cart = Cart::from_items(items);

        Self {
            id,
            restaurant_name: restaurant_names(catalog, cart.items()),
            customer_name: String::new(),
            delivery_address: "123 Main St, Anytown, 12345".to_string(),
            payment_method: PaymentMethod::CreditCard,
            card_last_four: None,
            lines: order_lines(cart.items()),
            totals: cart.totals(),
            placed_at: now,
        }
    }

    /// Payment line for display ("Credit Card ending in 4242").
    #[must_use]
    pub fn payment_summary(&self) -> String {
        match &self.card_last_four {
            Some(last_four) => format!("{} ending in {last_four}", self.payment_method.label()),
            None => self.payment_method.label().to_string(),
        }
    }

    /// Delivery window as wall-clock times ("4:30 PM - 4:45 PM", UTC).
    #[must_use]
    pub fn estimated_delivery(&self) -> String {
        let (from, to) = DELIVERY_WINDOW_MINUTES;
        let earliest = self.placed_at + TimeDelta::minutes(from);
        let latest = self.placed_at + TimeDelta::minutes(to);
        format!(
            "{} - {}",
            earliest.format("%-I:%M %p"),
            latest.format("%-I:%M %p")
        )
    }
}

fn order_lines(items: &[LineItem]) -> Vec<OrderLine> {
    items
        .iter()
        .map(|item| OrderLine {
            name: item.name.clone(),
            quantity: item.quantity,
        })
        .collect()
}

/// Distinct restaurant names for the given lines, in cart order.
fn restaurant_names(catalog: &Catalog, items: &[LineItem]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for item in items {
        if let Some((restaurant, _)) = catalog.menu_item(&item.id)
            && !names.contains(&restaurant.name.as_str())
        {
            names.push(&restaurant.name);
        }
    }

    if names.is_empty() {
        UNKNOWN_RESTAURANT.to_string()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use foodapp_core::checkout::{CheckoutForm, validate};
    use rust_decimal::Decimal;

    use super::*;

    fn form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Ada Lovelace".to_string(),
            address: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            postal_code: "12345".to_string(),
            country: "UK".to_string(),
            payment_method: Some("cod".to_string()),
            agree_to_terms: true,
            ..CheckoutForm::default()
        }
    }

    fn valid_checkout() -> ValidCheckout {
        validate(&form()).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_from_checkout_copies_cart() {
        let catalog = Catalog::placeholder();
        let cart = Cart::from_items(catalog.demo_cart_lines());
        let order = PlacedOrder::from_checkout(
            OrderId::new("ORD-1"),
            &valid_checkout(),
            &cart,
            &catalog,
            at(16, 0),
        );

        assert_eq!(order.restaurant_name, "The Gourmet Place");
        assert_eq!(order.delivery_address, "1 Analytical Way, London, 12345");
        assert_eq!(order.payment_method, PaymentMethod::Cod);
        assert_eq!(order.payment_summary(), "Cash on Delivery (COD)");
        assert_eq!(order.lines.len(), 3);
        assert_eq!(order.totals, cart.totals());
    }

    #[test]
    fn test_card_payment_keeps_last_four() {
        let checkout = validate(&CheckoutForm {
            payment_method: Some("creditCard".to_string()),
            card_number: Some("4242 4242 4242 1234".to_string()),
            ..form()
        })
        .unwrap();
        let catalog = Catalog::placeholder();
        let cart = Cart::from_items(catalog.demo_cart_lines());
        let order =
            PlacedOrder::from_checkout(OrderId::new("ORD-2"), &checkout, &cart, &catalog, at(9, 5));

        assert_eq!(order.card_last_four.as_deref(), Some("1234"));
        assert_eq!(order.payment_summary(), "Credit Card ending in 1234");
    }

    #[test]
    fn test_restaurant_names_are_distinct_in_cart_order() {
        let catalog = Catalog::placeholder();
        let items = [
            catalog.menu_item(&MenuItemId::new("m11")).unwrap().1.to_line_item(),
            catalog.menu_item(&MenuItemId::new("m1")).unwrap().1.to_line_item(),
            catalog.menu_item(&MenuItemId::new("m12")).unwrap().1.to_line_item(),
        ];
        assert_eq!(
            restaurant_names(&catalog, &items),
            "Sushi Heaven, The Gourmet Place"
        );
        assert_eq!(restaurant_names(&catalog, &[]), "FoodApp");
    }

    #[test]
    fn test_placeholder_order() {
        let catalog = Catalog::placeholder();
        let order = PlacedOrder::placeholder(OrderId::new("ORD-9"), &catalog, at(16, 0));

        assert_eq!(order.restaurant_name, "The Gourmet Place");
        assert_eq!(order.delivery_address, "123 Main St, Anytown, 12345");
        let names: Vec<&str> = order.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Lasagna Bolognese", "Tiramisu"]);
        assert_eq!(order.totals.subtotal, Decimal::new(2700, 2));
        assert_eq!(order.totals.total, Decimal::new(3416, 2));
    }

    #[test]
    fn test_estimated_delivery_window() {
        let catalog = Catalog::placeholder();
        let order = PlacedOrder::placeholder(OrderId::new("ORD-9"), &catalog, at(16, 0));
        assert_eq!(order.estimated_delivery(), "4:30 PM - 4:45 PM");
    }
}
