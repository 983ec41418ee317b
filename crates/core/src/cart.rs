//! Cart ledger.
//!
//! An ordered collection of line items with derived totals. Display order
//! follows insertion; totals are order-independent. Nothing here is stored
//! beyond the cart value itself: subtotal, tax, delivery fee and total are
//! recomputed on every call to [`compute_totals`].
//!
//! # Invariants
//!
//! - Item identifiers are unique within a cart.
//! - A visible line never has a quantity below 1: asking for a quantity
//!   below 1 removes the line instead.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{MenuItemId, Price};

/// Sales tax rate applied to the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Flat delivery fee charged whenever the subtotal is positive.
pub const DELIVERY_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: MenuItemId,
    pub name: String,
    /// Unit price; never negative for catalog entries.
    pub unit_price: Decimal,
    /// Always at least 1 while the line is in a cart.
    pub quantity: u32,
    pub image_url: Option<String>,
}

impl LineItem {
    /// Create a line item with quantity 1.
    #[must_use]
    pub fn new(
        id: impl Into<MenuItemId>,
        name: impl Into<String>,
        unit_price: Decimal,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity: 1,
            image_url,
        }
    }

    /// Builder-style quantity override.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Totals derived from a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Totals of an empty cart: all zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    #[must_use]
    pub const fn subtotal_price(&self) -> Price {
        Price::usd(self.subtotal)
    }

    #[must_use]
    pub const fn tax_price(&self) -> Price {
        Price::usd(self.tax)
    }

    #[must_use]
    pub const fn delivery_fee_price(&self) -> Price {
        Price::usd(self.delivery_fee)
    }

    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::usd(self.total)
    }
}

/// Compute subtotal, tax, delivery fee and total for a slice of line items.
///
/// - `subtotal = Σ unit_price × quantity`
/// - `tax = round2(subtotal × 8%)`, rounding half away from zero
/// - `delivery_fee = $5.00` if `subtotal > 0`, else `$0.00`
/// - `total = subtotal + tax + delivery_fee`
///
/// Total over its whole input domain; never fails.
#[must_use]
pub fn compute_totals(items: &[LineItem]) -> CartTotals {
    let subtotal: Decimal = items.iter().map(LineItem::line_total).sum();
    let tax =
        (subtotal * TAX_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let delivery_fee = if subtotal > Decimal::ZERO {
        DELIVERY_FEE
    } else {
        Decimal::ZERO
    };

    CartTotals {
        subtotal,
        tax,
        delivery_fee,
        total: subtotal + tax + delivery_fee,
    }
}

/// An ordered collection of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, merging duplicate identifiers and
    /// dropping lines whose quantity is zero.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            let quantity = item.quantity;
            cart.add_item(item, quantity);
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines (the navigation badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |sum, item| sum.saturating_add(item.quantity))
    }

    /// Look up a line by identifier.
    #[must_use]
    pub fn get(&self, id: &MenuItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add `quantity` units of an item.
    ///
    /// If a line with the same identifier exists its quantity is increased;
    /// otherwise the item is appended. A zero quantity is a no-op.
    pub fn add_item(&mut self, item: LineItem, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(item.with_quantity(quantity));
        }
    }

    /// Set the quantity of a line.
    ///
    /// A quantity below 1 removes the line. Any quantity of 1 or more
    /// replaces the current one (saturating at `u32::MAX`). Unknown
    /// identifiers are ignored.
    pub fn set_quantity(&mut self, id: &MenuItemId, quantity: i64) {
        if quantity < 1 {
            self.remove_item(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.items.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
        }
    }

    /// Remove a line unconditionally. Absent identifiers are not an error.
    pub fn remove_item(&mut self, id: &MenuItemId) {
        self.items.retain(|line| &line.id != id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Derived totals for the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        compute_totals(&self.items)
    }
}
