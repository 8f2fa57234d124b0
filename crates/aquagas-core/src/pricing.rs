//! # Pricing Resolver
//!
//! Shipping fee lookup and the submit gate.
//!
//! Both functions are total. The gate is meant to be re-evaluated on every
//! form change and bound to the submit button, so an incomplete sale is
//! never sent rather than rejected afterwards.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{Client, ShippingMethod};

/// Fee of the method named `shipping_method`, or zero when nothing is
/// selected or nothing matches.
pub fn resolve_shipping_fee(shipping_method: &str, methods: &[ShippingMethod]) -> Money {
    if shipping_method.is_empty() {
        return Money::zero();
    }

    methods
        .iter()
        .find(|m| m.name == shipping_method)
        .map(|m| m.fee)
        .unwrap_or_default()
}

/// True only for a non-empty cart, a selected client and non-blank
/// payment and shipping selections.
pub fn can_submit(
    cart: &Cart,
    client: Option<&Client>,
    payment_method: &str,
    shipping_method: &str,
) -> bool {
    !cart.is_empty()
        && client.is_some()
        && !payment_method.trim().is_empty()
        && !shipping_method.trim().is_empty()
}

/// Amounts shown under the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl SaleTotals {
    /// `total = subtotal + shipping_fee`.
    pub fn compute(cart: &Cart, shipping_fee: Money) -> Self {
        let subtotal = cart.subtotal();
        SaleTotals {
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn methods() -> Vec<ShippingMethod> {
        vec![
            ShippingMethod {
                id: 1,
                name: "Retirada".to_string(),
                fee: Money::zero(),
            },
            ShippingMethod {
                id: 2,
                name: "Entrega".to_string(),
                fee: Money::from_cents(500),
            },
        ]
    }

    fn client() -> Client {
        Client {
            id: 1,
            name: "Maria Silva".to_string(),
            phone: None,
            address: None,
        }
    }

    fn cart() -> Cart {
        Cart::new().add_line(&Product {
            id: 1,
            name: "Água Mineral 20L".to_string(),
            price: Money::from_cents(1800),
            category: "agua".to_string(),
        })
    }

    #[test]
    fn test_resolve_shipping_fee() {
        assert_eq!(resolve_shipping_fee("Entrega", &methods()).cents(), 500);
        assert_eq!(resolve_shipping_fee("Retirada", &methods()).cents(), 0);
        assert_eq!(resolve_shipping_fee("Drone", &methods()), Money::zero());
        assert_eq!(resolve_shipping_fee("", &methods()), Money::zero());
        assert_eq!(resolve_shipping_fee("Entrega", &[]), Money::zero());
    }

    #[test]
    fn test_can_submit_requires_everything() {
        let client = client();
        assert!(can_submit(&cart(), Some(&client), "PIX", "Entrega"));

        assert!(!can_submit(&Cart::new(), Some(&client), "PIX", "Entrega"));
        assert!(!can_submit(&cart(), None, "PIX", "Entrega"));
        assert!(!can_submit(&cart(), Some(&client), "PIX", ""));
    }

    #[test]
    fn test_can_submit_false_with_empty_payment() {
        let client = client();
        assert!(!can_submit(&cart(), Some(&client), "", "Entrega"));
    }

    #[test]
    fn test_can_submit_false_with_blank_selections() {
        let client = client();
        assert!(!can_submit(&cart(), Some(&client), "   ", "Entrega"));
        assert!(!can_submit(&cart(), Some(&client), "PIX", "\t"));
    }

    #[test]
    fn test_totals() {
        let totals = SaleTotals::compute(&cart(), Money::from_cents(500));
        assert_eq!(totals.subtotal.cents(), 1800);
        assert_eq!(totals.total.cents(), 2300);
    }
}
