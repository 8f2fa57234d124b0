//! # Shipping and Payment Methods
//!
//! Lookups behind the sale form's two selects. The Pricing Resolver takes
//! the shipping list and picks the fee by name.

use aquagas_core::validation::{validate_amount, validate_item_name};
use aquagas_core::{Money, PaymentMethod, ShippingMethod};
use sqlx::SqlitePool;

use crate::error::DbResult;

/// Repository for shipping and payment methods.
#[derive(Debug, Clone)]
pub struct MethodRepository {
    pool: SqlitePool,
}

impl MethodRepository {
    /// Creates a new MethodRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MethodRepository { pool }
    }

    pub async fn list_shipping_methods(&self) -> DbResult<Vec<ShippingMethod>> {
        let methods = sqlx::query_as::<_, ShippingMethod>(
            "SELECT id, name, fee_cents FROM shipping_methods ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(methods)
    }

    pub async fn list_payment_methods(&self) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name FROM payment_methods ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(methods)
    }

    /// Names are unique; a duplicate is a `UniqueViolation`.
    pub async fn insert_shipping_method(&self, name: &str, fee: Money) -> DbResult<ShippingMethod> {
        validate_item_name(name)?;
        validate_amount("fee", fee)?;

        let id = sqlx::query("INSERT INTO shipping_methods (name, fee_cents) VALUES (?1, ?2)")
            .bind(name)
            .bind(fee)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(ShippingMethod {
            id,
            name: name.to_string(),
            fee,
        })
    }

    pub async fn insert_payment_method(&self, name: &str) -> DbResult<PaymentMethod> {
        validate_item_name(name)?;

        let id = sqlx::query("INSERT INTO payment_methods (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(PaymentMethod {
            id,
            name: name.to_string(),
        })
    }
}
