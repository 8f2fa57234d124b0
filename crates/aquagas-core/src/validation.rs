//! # Validation Module
//!
//! Checks for data that crosses a boundary: the creation request sent to
//! the backend and the company settings coming from the settings screen.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Sale form                                                    │
//! │  └── can_submit() gate disables the submit button                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Persistence boundary (Rust)                                  │
//! │  └── THIS MODULE: validate_new_sale, validate_company_profile          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key on sales.client_id                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use aquagas_core::validation::{validate_item_name, validate_quantity};
//!
//! validate_item_name("Água Mineral 20L").unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CompanyProfile, NewSale, SaleLine};
use crate::MAX_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest item or client name accepted.
pub const MAX_NAME_LENGTH: usize = 200;

/// Longest search query accepted.
pub const MAX_QUERY_LENGTH: usize = 100;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

// =============================================================================
// Sale Items
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Quantities are at least 1 and at most `MAX_QUANTITY` (999).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }
    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Prices and fees may be zero but never negative.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not be negative".to_string(),
        });
    }
    Ok(())
}

/// Validates every line of an items payload. An empty payload is rejected.
pub fn validate_sale_lines(lines: &[SaleLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(required("items"));
    }

    for line in lines {
        validate_item_name(&line.name)?;
        validate_quantity(line.qty)?;
        validate_amount("price", line.price)?;
    }
    Ok(())
}

/// Validates a creation request before it is persisted.
///
/// ## Rules
/// - A client and non-empty payment / shipping methods
/// - Valid, non-empty items
/// - `subtotal` equals Σ line totals and `total == subtotal + shipping_fee`,
///   computed without overflow
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    if sale.client_id <= 0 {
        return Err(required("clientId"));
    }
    if sale.payment_method.trim().is_empty() {
        return Err(required("paymentMethod"));
    }
    if sale.shipping_method.trim().is_empty() {
        return Err(required("shippingMethod"));
    }

    validate_sale_lines(&sale.items)?;
    validate_amount("shippingFee", sale.shipping_fee)?;

    let out_of_range = |field: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "amount out of range".to_string(),
    };

    let subtotal = sale
        .items
        .iter()
        .try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.price.checked_multiply_quantity(line.qty)?)
        })
        .map_err(|_| out_of_range("subtotal"))?;
    if subtotal != sale.subtotal {
        return Err(ValidationError::InvalidFormat {
            field: "subtotal".to_string(),
            reason: format!("expected {}, got {}", subtotal, sale.subtotal),
        });
    }
    let total = subtotal
        .checked_add(sale.shipping_fee)
        .map_err(|_| out_of_range("total"))?;
    if total != sale.total {
        return Err(ValidationError::InvalidFormat {
            field: "total".to_string(),
            reason: "must equal subtotal plus shipping fee".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Company Profile
// =============================================================================

/// Validates a logo data URL: `data:image/<kind>;base64,<payload>`.
///
/// Only the envelope is checked here; the renderer decodes the payload and
/// falls back to the text header when it cannot.
pub fn validate_logo_data_url(logo: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "logo".to_string(),
        reason: reason.to_string(),
    };

    let rest = logo
        .strip_prefix("data:image/")
        .ok_or_else(|| invalid("must be an image data URL"))?;
    let (_, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid("must be base64 encoded"))?;
    if payload.is_empty() {
        return Err(invalid("image data is empty"));
    }
    Ok(())
}

/// Validates the settings form before it overwrites the stored profile.
pub fn validate_company_profile(profile: &CompanyProfile) -> ValidationResult<()> {
    if profile.name.trim().is_empty() {
        return Err(required("name"));
    }
    if let Some(logo) = &profile.logo {
        validate_logo_data_url(logo)?;
    }
    Ok(())
}

/// Trims a client search query.
///
/// Empty is allowed and means "all clients".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LENGTH,
        });
    }

    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sale() -> NewSale {
        NewSale {
            client_id: 1,
            items: vec![
                SaleLine {
                    name: "Água Mineral 20L".to_string(),
                    qty: 2,
                    price: Money::from_cents(1800),
                },
                SaleLine {
                    name: "Gás GLP P13".to_string(),
                    qty: 1,
                    price: Money::from_cents(6000),
                },
            ],
            payment_method: "PIX".to_string(),
            shipping_method: "Entrega".to_string(),
            shipping_fee: Money::from_cents(500),
            subtotal: Money::from_cents(9600),
            total: Money::from_cents(10100),
        }
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Gás GLP P13").is_ok());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_new_sale_ok() {
        assert!(validate_new_sale(&new_sale()).is_ok());
    }

    #[test]
    fn test_validate_new_sale_rejects_inconsistent_total() {
        let mut sale = new_sale();
        sale.total = Money::from_cents(9600);
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "total"
        ));
    }

    #[test]
    fn test_validate_new_sale_rejects_missing_fields() {
        let mut sale = new_sale();
        sale.payment_method = String::new();
        assert!(validate_new_sale(&sale).is_err());

        let mut sale = new_sale();
        sale.items.clear();
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::Required { ref field }) if field == "items"
        ));

        let mut sale = new_sale();
        sale.items[0].qty = 0;
        assert!(validate_new_sale(&sale).is_err());
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_QUANTITY + 1),
            Err(ValidationError::OutOfRange { max: 999, .. })
        ));
    }

    #[test]
    fn test_validate_new_sale_rejects_huge_quantity() {
        let mut sale = new_sale();
        sale.items[0].qty = 10_000_000_000_000_000;
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "qty"
        ));
    }

    #[test]
    fn test_validate_new_sale_rejects_overflowing_amounts() {
        let mut sale = new_sale();
        sale.items[0].price = Money::from_cents(i64::MAX / 2);
        sale.items[1].price = Money::from_cents(i64::MAX / 2);
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "subtotal"
        ));

        let mut sale = new_sale();
        sale.shipping_fee = Money::from_cents(i64::MAX);
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "total"
        ));
    }

    #[test]
    fn test_validate_logo_data_url() {
        assert!(validate_logo_data_url("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(validate_logo_data_url("https://example.com/logo.png").is_err());
        assert!(validate_logo_data_url("data:image/png,rawbytes").is_err());
        assert!(validate_logo_data_url("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_validate_company_profile() {
        assert!(validate_company_profile(&CompanyProfile::default()).is_ok());

        let nameless = CompanyProfile {
            name: " ".to_string(),
            ..CompanyProfile::default()
        };
        assert!(validate_company_profile(&nameless).is_err());

        let bad_logo = CompanyProfile {
            logo: Some("not a data url".to_string()),
            ..CompanyProfile::default()
        };
        assert!(validate_company_profile(&bad_logo).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  maria ").unwrap(), "maria");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }
}
