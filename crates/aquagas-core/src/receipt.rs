//! # Receipt Composer
//!
//! Turns a Sale and the CompanyProfile into the two-copy control note
//! ("nota de controle") model that the renderer lays out.
//!
//! ## Document Shape
//! ```text
//! ┌──────────────────────────────────┬──────────────────────────────────┐
//! │ 1ª Via - Distribuidora           │ 2ª Via - Cliente                 │
//! │  company snapshot                │  company snapshot   (identical)  │
//! │  sale snapshot                   │  sale snapshot      (identical)  │
//! │  items ........ n rows           │  items ........ n rows           │
//! │  filler ....... 12 - n rows      │  filler ....... 12 - n rows      │
//! └──────────────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! The table always has at least `MAX_ROWS` rows so the printed form has
//! the same height whatever the item count. Past `MAX_ROWS` nothing is
//! truncated; the table grows.
//!
//! `compose` reads no clock and no global state. The date comes from
//! `sale.created_at` in the sale's own offset, so composing the same
//! stored sale twice gives the same document.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CompanyProfile, Sale, SaleLine};

/// Minimum number of table rows on every via.
pub const MAX_ROWS: usize = 12;

/// Title of the copy kept by the distributor.
pub const DISTRIBUTOR_COPY_TITLE: &str = "1ª Via - Distribuidora";

/// Title of the copy handed to the client.
pub const CLIENT_COPY_TITLE: &str = "2ª Via - Cliente";

/// Fixed texts printed on the form.
pub mod labels {
    pub const CLIENT: &str = "CLIENTE:";
    pub const DATE: &str = "DATA:";
    pub const PRODUCT: &str = "Produto";
    pub const QUANTITY: &str = "Qtd.";
    pub const UNIT_PRICE: &str = "Unitário";
    pub const LINE_TOTAL: &str = "Total";
    pub const TOTALS: &str = "TOTAIS";
    pub const SIGNATURE: &str = "ASSINATURA: _______________________________";
    pub const CONTROL_NOTE: &str = "Nota de controle N.º:";
    pub const PHONE_PREFIX: &str = "Tel.:";
}

/// Blank-form placeholders.
const BLANK_CLIENT_WIDTH: usize = 52;
const BLANK_DATE: &str = "__/__/____";

/// Zero-pads a sale id to four digits; longer ids are kept whole.
///
/// ```rust
/// use aquagas_core::receipt::format_sale_number;
///
/// assert_eq!(format_sale_number(7), "0007");
/// assert_eq!(format_sale_number(12345), "12345");
/// ```
pub fn format_sale_number(id: i64) -> String {
    format!("{:04}", id)
}

/// `dd/mm/yyyy` in the timestamp's own offset.
pub fn format_date(at: &DateTime<FixedOffset>) -> String {
    at.format("%d/%m/%Y").to_string()
}

// =============================================================================
// Document Model
// =============================================================================

/// The sale data printed on a via, already formatted where the form needs
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSnapshot {
    /// Zero-padded sale number.
    pub number: String,
    pub client_name: String,
    /// `dd/mm/yyyy`, or the blank placeholder.
    pub date: String,
    pub lines: Vec<SaleLine>,
    pub total: Money,
    /// Σ quantity over `lines`.
    pub total_quantity: i64,
}

impl SaleSnapshot {
    /// Builds a snapshot from loose parts (backend rendering, blank form).
    pub fn from_parts(
        number: String,
        client_name: String,
        date: String,
        lines: Vec<SaleLine>,
        total: Money,
    ) -> Self {
        let total_quantity = lines.iter().map(|l| l.qty).sum();
        SaleSnapshot {
            number,
            client_name,
            date,
            lines,
            total,
            total_quantity,
        }
    }
}

impl From<&Sale> for SaleSnapshot {
    fn from(sale: &Sale) -> Self {
        SaleSnapshot::from_parts(
            format_sale_number(sale.id),
            sale.client_name.clone(),
            format_date(&sale.created_at),
            sale.lines.clone(),
            sale.total,
        )
    }
}

/// One printed copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViaContent {
    pub title: String,
    pub sale: SaleSnapshot,
    pub company: CompanyProfile,
    /// Filler rows after the items: `max(0, MAX_ROWS - items)`.
    pub empty_row_count: usize,
}

impl ViaContent {
    fn new(title: &str, sale: SaleSnapshot, company: CompanyProfile) -> Self {
        let empty_row_count = MAX_ROWS.saturating_sub(sale.lines.len());
        ViaContent {
            title: title.to_string(),
            sale,
            company,
            empty_row_count,
        }
    }

    /// `"1ª Via - Distribuidora - Nota de controle N.º: 0007"`.
    pub fn heading(&self) -> String {
        format!(
            "{} - {} {}",
            self.title,
            labels::CONTROL_NOTE,
            self.sale.number
        )
    }

    /// Address block under the header, last line being the phone.
    pub fn address_lines(&self) -> [String; 3] {
        [
            self.company.address_line1.clone(),
            self.company.address_line2.clone(),
            format!("{} {}", labels::PHONE_PREFIX, self.company.phone),
        ]
    }

    /// Item rows plus filler rows.
    pub fn table_row_count(&self) -> usize {
        self.sale.lines.len() + self.empty_row_count
    }
}

/// The two-copy document. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDocument {
    pub vias: [ViaContent; 2],
}

impl ReceiptDocument {
    /// Both copies from one snapshot; only the titles differ.
    pub fn from_snapshot(sale: SaleSnapshot, company: &CompanyProfile) -> Self {
        ReceiptDocument {
            vias: [
                ViaContent::new(DISTRIBUTOR_COPY_TITLE, sale.clone(), company.clone()),
                ViaContent::new(CLIENT_COPY_TITLE, sale, company.clone()),
            ],
        }
    }

    /// Zero-padded number shared by both copies.
    pub fn sale_number(&self) -> &str {
        &self.vias[0].sale.number
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Composes the control note for a stored sale.
///
/// ## Example
/// ```rust
/// use aquagas_core::receipt::{compose, MAX_ROWS};
/// use aquagas_core::{CompanyProfile, Money, Sale, SaleLine};
/// use chrono::DateTime;
///
/// let sale = Sale {
///     id: 7,
///     client_id: 1,
///     client_name: "Maria Silva".to_string(),
///     lines: vec![SaleLine { name: "Gás GLP P13".into(), qty: 1, price: Money::from_cents(6000) }],
///     payment_method: "PIX".to_string(),
///     shipping_method: "Retirada".to_string(),
///     shipping_fee: Money::zero(),
///     subtotal: Money::from_cents(6000),
///     total: Money::from_cents(6000),
///     created_at: DateTime::parse_from_rfc3339("2026-03-05T14:30:00-03:00").unwrap(),
/// };
///
/// let doc = compose(&sale, &CompanyProfile::default());
/// assert_eq!(doc.sale_number(), "0007");
/// assert_eq!(doc.vias[1].empty_row_count, MAX_ROWS - 1);
/// ```
pub fn compose(sale: &Sale, company: &CompanyProfile) -> ReceiptDocument {
    ReceiptDocument::from_snapshot(SaleSnapshot::from(sale), company)
}

/// Composes an unfilled form ("nota branca") to be completed by hand.
pub fn compose_blank(company: &CompanyProfile) -> ReceiptDocument {
    let sale = SaleSnapshot::from_parts(
        format_sale_number(0),
        "_".repeat(BLANK_CLIENT_WIDTH),
        BLANK_DATE.to_string(),
        Vec::new(),
        Money::zero(),
    );
    ReceiptDocument::from_snapshot(sale, company)
}
