//! # Domain Types
//!
//! Core domain types used throughout Aquagas POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Model                                   │
//! │                                                                         │
//! │  Catalog (read-only here)          Sale (immutable once created)       │
//! │  ├── Product                       ├── id (sequential, never reused)   │
//! │  ├── Client                        ├── client_id / client_name         │
//! │  ├── ShippingMethod (fee)          ├── lines: Vec<SaleLine>            │
//! │  └── PaymentMethod                 ├── payment / shipping method       │
//! │                                    ├── shipping_fee, subtotal, total   │
//! │  Branding                          └── created_at (with UTC offset)    │
//! │  └── CompanyProfile (singleton)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog entities are owned by the CRUD screens; this crate only reads
//! them. Their ids are SQLite integer keys.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name shown to the operator and on the receipt.
    pub name: String,

    /// Current catalog price. Carts snapshot it when a line is added.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    /// Free-form category ("agua", "gas", ...).
    pub category: String,
}

/// A client the distributor sells to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Client {
    /// Case-insensitive substring match on the name.
    ///
    /// An empty query matches every client.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.name.to_lowercase().contains(&query)
    }
}

/// A shipping option and the fee it adds to the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingMethod {
    pub id: i64,

    /// Unique name, also what the sale form selects by.
    pub name: String,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "fee_cents"))]
    pub fee: Money,
}

/// A payment option ("Dinheiro", "PIX", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Sale
// =============================================================================

/// One line of a submitted sale, detached from the live cart.
///
/// ## Wire Shape
/// Serialized exactly as the items payload of `create_sale`:
/// `{"name": "Água Mineral 20L", "qty": 2, "price": 1800}` with the price in
/// centavos. The same JSON array is what the `sales.items` column stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub name: String,
    pub qty: i64,
    pub price: Money,
}

impl SaleLine {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.qty)
    }
}

/// Decodes the JSON array stored in `sales.items`.
pub fn decode_sale_lines(json: &str) -> CoreResult<Vec<SaleLine>> {
    serde_json::from_str(json).map_err(CoreError::from)
}

/// Encodes sale lines into the stored JSON array.
pub fn encode_sale_lines(lines: &[SaleLine]) -> CoreResult<String> {
    serde_json::to_string(lines).map_err(CoreError::from)
}

/// The creation request sent to the persistence boundary.
///
/// Built by the Sale Submitter from a cart snapshot; `total` is always
/// `subtotal + shipping_fee`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewSale {
    pub client_id: i64,
    pub items: Vec<SaleLine>,
    pub payment_method: String,
    pub shipping_method: String,
    pub shipping_fee: Money,
    pub subtotal: Money,
    pub total: Money,
}

/// A persisted sale.
///
/// Immutable once created: there is no update path in this subsystem. An
/// edit is a new sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    /// Sequential id assigned by the database, never reused.
    pub id: i64,
    pub client_id: i64,

    /// Client name as it was when the sale was created.
    pub client_name: String,
    pub lines: Vec<SaleLine>,
    pub payment_method: String,
    pub shipping_method: String,
    pub shipping_fee: Money,
    pub subtotal: Money,
    pub total: Money,

    /// Creation time in the register's local offset.
    #[ts(as = "String")]
    pub created_at: DateTime<FixedOffset>,
}

impl Sale {
    /// Σ quantity over all lines (not the number of lines).
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.qty).sum()
    }

    /// Short description for history lists: `"Gás GLP P13 (x1), ..."`.
    pub fn items_summary(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{} (x{})", l.name, l.qty))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Company Profile
// =============================================================================

/// Branding block printed in the header and footer of every receipt.
///
/// ## Persistence
/// Stored as one JSON blob. Missing fields fall back to the defaults, so a
/// blob saved by an older version still loads. The logo is an image data
/// URL (`data:image/png;base64,...`) under the `logoBase64` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CompanyProfile {
    pub name: String,
    pub tagline: String,
    pub address_line1: String,
    pub address_line2: String,
    pub phone: String,
    pub footer_message: String,
    #[serde(rename = "logoBase64", skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        CompanyProfile {
            name: "MORAIS".to_string(),
            tagline: "distribuidora".to_string(),
            address_line1: "Av. Tailândia - nº 127".to_string(),
            address_line2: "Bairro Columbia - Colatina - ES".to_string(),
            phone: "(27) 98893-2758 / (27) 99938-1129".to_string(),
            footer_message: "Deus é nossa fonte!".to_string(),
            logo: None,
        }
    }
}

impl CompanyProfile {
    /// Decodes a stored blob, filling missing fields from the defaults.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(CoreError::InvalidProfile)
    }

    /// Best-effort decode of a blob that [`CompanyProfile::from_json`]
    /// rejected.
    ///
    /// Every field that is present with a string value is kept and the rest
    /// come from the defaults. Anything that is not a JSON object yields the
    /// default profile.
    pub fn salvage(json: &str) -> Self {
        let mut profile = CompanyProfile::default();
        let Ok(serde_json::Value::Object(fields)) = serde_json::from_str::<serde_json::Value>(json) else {
            return profile;
        };
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };

        let targets = [
            ("name", &mut profile.name),
            ("tagline", &mut profile.tagline),
            ("addressLine1", &mut profile.address_line1),
            ("addressLine2", &mut profile.address_line2),
            ("phone", &mut profile.phone),
            ("footerMessage", &mut profile.footer_message),
        ];
        for (key, target) in targets {
            if let Some(value) = text(key) {
                *target = value;
            }
        }
        profile.logo = text("logoBase64");
        profile
    }

    /// Encodes the whole profile for storage.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::InvalidProfile)
    }
}
