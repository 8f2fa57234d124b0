//! # aquagas-core: Pure Business Logic for Aquagas POS
//!
//! Cart math, shipping fee resolution and the two-copy control note model,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Aquagas POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Sale form (frontend)                         │   │
//! │  │    Product grid ──► Cart ──► Client / Payment / Shipping       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 aquagas-desktop (commands)                      │   │
//! │  │    submit_sale, submit_and_print, print_sale, print_blank       │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────────────┐   │                        │
//! │  │          ★ aquagas-core (THIS CRATE) ★  │   │                        │
//! │  │                                         │   │                        │
//! │  │  money  types  cart  pricing  receipt   │   │                        │
//! │  │  observable  validation                 │   │                        │
//! │  │                                         │   │                        │
//! │  │  NO I/O • NO DATABASE • NO CLOCK        │   │                        │
//! │  └──────────────┬──────────────────────────┘   │                        │
//! │                 │                              │                        │
//! │  ┌──────────────▼─────────────┐   ┌────────────▼──────────────────┐    │
//! │  │   aquagas-db (SQLite)      │   │   aquagas-print (PDF, spool)  │    │
//! │  └────────────────────────────┘   └───────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer centavos
//! - [`types`] - Domain types (Product, Client, Sale, CompanyProfile, ...)
//! - [`cart`] - Cart Model: immutable transitions and subtotal
//! - [`pricing`] - Shipping fee lookup and the submit gate
//! - [`receipt`] - Receipt Composer: Sale + CompanyProfile → ReceiptDocument
//! - [`observable`] - Value holder with subscribe/update
//! - [`validation`] - Boundary checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use aquagas_core::{Cart, Money, Product};
//! use aquagas_core::pricing::SaleTotals;
//!
//! let water = Product {
//!     id: 1,
//!     name: "Água Mineral 20L".to_string(),
//!     price: Money::from_cents(1800),
//!     category: "agua".to_string(),
//! };
//!
//! let cart = Cart::new().add_line(&water).add_line(&water);
//! let totals = SaleTotals::compute(&cart, Money::from_cents(500));
//!
//! assert_eq!(totals.subtotal.to_string(), "R$ 36.00");
//! assert_eq!(totals.total.to_string(), "R$ 41.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod observable;
pub mod pricing;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use observable::{Observable, SubscriptionId};
pub use pricing::{can_submit, resolve_shipping_fee, SaleTotals};
pub use receipt::{compose, compose_blank, ReceiptDocument, ViaContent, MAX_ROWS};
pub use types::*;

// =============================================================================
// Constants
// =============================================================================

/// Largest quantity a single line may carry.
///
/// The cart clamps to it; `validate_new_sale` rejects anything above it.
pub const MAX_QUANTITY: i64 = 999;
