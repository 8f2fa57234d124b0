//! # Cart Model
//!
//! The in-progress sale's line items, as immutable values.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Transitions                                   │
//! │                                                                         │
//! │  Operator Action          Transition                 Result             │
//! │  ───────────────          ──────────                 ──────             │
//! │                                                                         │
//! │  Click Product ──────────► add_line(&product) ──────► qty + 1 or push  │
//! │                                                                         │
//! │  Change Quantity ────────► set_quantity(id, n) ─────► qty = min(n, 999)│
//! │                                  │ n <= 0                               │
//! │                                  └─────────────────► remove_line(id)   │
//! │                                                                         │
//! │  Click Remove ───────────► remove_line(id) ─────────► line dropped     │
//! │                                                                         │
//! │  Every transition takes `&self` and returns a new Cart. The session    │
//! │  that owns the cart swaps the value in and notifies subscribers.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here fails. An unknown product id is a no-op, and quantities are
//! clamped to [`MAX_QUANTITY`] rather than rejected.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, SaleLine};
use crate::MAX_QUANTITY;

/// A line of the cart.
///
/// ## Design Notes
/// - `name` and `unit_price` are frozen when the product is added, so a
///   catalog price change never reaches a cart that already holds it.
/// - `quantity` stays within `1..=MAX_QUANTITY`: `set_quantity` removes
///   the line instead of storing zero and clamps anything larger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    /// Creates a single-unit line from the product as it is right now.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

impl From<&CartLine> for SaleLine {
    fn from(line: &CartLine) -> Self {
        SaleLine {
            name: line.name.clone(),
            qty: line.quantity,
            price: line.unit_price,
        }
    }
}

/// Ordered line items. Insertion order is display order and there is at
/// most one line per product id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products (not units).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in the cart: its quantity goes up by one (up to
    ///   `MAX_QUANTITY`), the frozen price is kept
    /// - Otherwise: a new line with quantity 1 is appended
    pub fn add_line(&self, product: &Product) -> Cart {
        let mut lines = self.lines.clone();
        match lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity = (line.quantity + 1).min(MAX_QUANTITY),
            None => lines.push(CartLine::from_product(product)),
        }
        Cart { lines }
    }

    /// Sets a line's quantity; `qty <= 0` removes the line and anything
    /// above `MAX_QUANTITY` is clamped.
    pub fn set_quantity(&self, product_id: i64, qty: i64) -> Cart {
        if qty <= 0 {
            return self.remove_line(product_id);
        }
        let qty = qty.min(MAX_QUANTITY);

        let lines = self
            .lines
            .iter()
            .map(|l| {
                if l.product_id == product_id {
                    CartLine {
                        quantity: qty,
                        ..l.clone()
                    }
                } else {
                    l.clone()
                }
            })
            .collect();
        Cart { lines }
    }

    /// Drops the line for `product_id`, if any.
    pub fn remove_line(&self, product_id: i64) -> Cart {
        Cart {
            lines: self
                .lines
                .iter()
                .filter(|l| l.product_id != product_id)
                .cloned()
                .collect(),
        }
    }

    /// Σ (unit price × quantity), exact.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Σ quantity.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Detached copy of the lines in the shape the backend stores.
    pub fn snapshot(&self) -> Vec<SaleLine> {
        self.lines.iter().map(SaleLine::from).collect()
    }
}
