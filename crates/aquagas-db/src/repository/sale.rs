//! # Sale Repository
//!
//! The persistence boundary of the Sale Submitter.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     ├── validate NewSale (items, total = subtotal + fee)               │
//! │     ├── snapshot client name                                           │
//! │     ├── INSERT, items stored as JSON [{name, qty, price}]              │
//! │     └── → Sale { id: next sequential id, created_at: now }             │
//! │                                                                         │
//! │  2. READ (any time later)                                              │
//! │     └── get_sale / list_recent_sales → re-print the control note       │
//! │                                                                         │
//! │  There is no update or void: a correction is a new sale.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use aquagas_core::validation::validate_new_sale;
use aquagas_core::{decode_sale_lines, encode_sale_lines, Money, NewSale, Sale};
use chrono::{DateTime, FixedOffset, Local};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Row shape of the `sales` table.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    client_id: i64,
    client_name: String,
    items: String,
    payment_method: String,
    shipping_method: String,
    shipping_fee_cents: i64,
    subtotal_cents: i64,
    total_cents: i64,
    created_at: String,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at).map_err(|e| {
            DbError::InvalidData(format!("sale {} created_at: {}", row.id, e))
        })?;

        Ok(Sale {
            id: row.id,
            client_id: row.client_id,
            client_name: row.client_name,
            lines: decode_sale_lines(&row.items)?,
            payment_method: row.payment_method,
            shipping_method: row.shipping_method,
            shipping_fee: Money::from_cents(row.shipping_fee_cents),
            subtotal: Money::from_cents(row.subtotal_cents),
            total: Money::from_cents(row.total_cents),
            created_at,
        })
    }
}

const SELECT_SALE: &str = r#"
    SELECT
        id, client_id, client_name, items,
        payment_method, shipping_method,
        shipping_fee_cents, subtotal_cents, total_cents,
        created_at
    FROM sales
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale stamped with the current local time.
    pub async fn create_sale(&self, sale: &NewSale) -> DbResult<Sale> {
        self.create_sale_at(sale, Local::now().fixed_offset()).await
    }

    /// Creates a sale with an explicit timestamp.
    ///
    /// ## Errors
    /// - `InvalidData` if the request fails validation
    /// - `NotFound` if the client does not exist
    pub async fn create_sale_at(
        &self,
        sale: &NewSale,
        created_at: DateTime<FixedOffset>,
    ) -> DbResult<Sale> {
        validate_new_sale(sale)?;

        let mut tx = self.pool.begin().await?;

        let client_name: Option<String> =
            sqlx::query_scalar("SELECT name FROM clients WHERE id = ?1")
                .bind(sale.client_id)
                .fetch_optional(&mut *tx)
                .await?;
        let client_name = client_name.ok_or_else(|| DbError::not_found("Client", sale.client_id))?;

        let items = encode_sale_lines(&sale.items)?;

        let id = sqlx::query(
            r#"
            INSERT INTO sales (
                client_id, client_name, items,
                payment_method, shipping_method,
                shipping_fee_cents, subtotal_cents, total_cents,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(sale.client_id)
        .bind(&client_name)
        .bind(&items)
        .bind(&sale.payment_method)
        .bind(&sale.shipping_method)
        .bind(sale.shipping_fee.cents())
        .bind(sale.subtotal.cents())
        .bind(sale.total.cents())
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!(sale_id = id, client = %client_name, total = %sale.total, "Sale created");

        Ok(Sale {
            id,
            client_id: sale.client_id,
            client_name,
            lines: sale.items.clone(),
            payment_method: sale.payment_method.clone(),
            shipping_method: sale.shipping_method.clone(),
            shipping_fee: sale.shipping_fee,
            subtotal: sale.subtotal,
            total: sale.total,
            created_at,
        })
    }

    /// Gets a sale by ID.
    pub async fn get_sale(&self, id: i64) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_SALE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Sale::try_from).transpose()
    }

    /// Most recent sales first.
    pub async fn list_recent_sales(&self, limit: u32) -> DbResult<Vec<Sale>> {
        debug!(limit, "Listing recent sales");

        let rows: Vec<SaleRow> =
            sqlx::query_as(&format!("{} ORDER BY id DESC LIMIT ?1", SELECT_SALE))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Number of stored sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use aquagas_core::SaleLine;

    async fn db_with_client() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let client = db
            .clients()
            .insert("Maria Silva", Some("(27) 99999-0000"), None)
            .await
            .unwrap();
        (db, client.id)
    }

    fn new_sale(client_id: i64) -> NewSale {
        NewSale {
            client_id,
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

    #[tokio::test]
    async fn test_create_and_get_sale() {
        let (db, client_id) = db_with_client().await;
        let at = DateTime::parse_from_rfc3339("2026-03-05T14:30:00-03:00").unwrap();

        let sale = db.sales().create_sale_at(&new_sale(client_id), at).await.unwrap();
        assert_eq!(sale.client_name, "Maria Silva");
        assert_eq!(sale.total.cents(), 10100);

        let stored = db.sales().get_sale(sale.id).await.unwrap().unwrap();
        assert_eq!(stored, sale);
        assert_eq!(stored.created_at.offset().local_minus_utc(), -3 * 3600);
        assert_eq!(stored.items_summary(), "Água Mineral 20L (x2), Gás GLP P13 (x1)");
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let (db, client_id) = db_with_client().await;

        let first = db.sales().create_sale(&new_sale(client_id)).await.unwrap();
        let second = db.sales().create_sale(&new_sale(client_id)).await.unwrap();
        assert_eq!(second.id, first.id + 1);

        let recent = db.sales().list_recent_sales(10).await.unwrap();
        assert_eq!(recent.iter().map(|s| s.id).collect::<Vec<_>>(), vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found() {
        let (db, _) = db_with_client().await;

        let result = db.sales().create_sale(&new_sale(999)).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_sale_is_rejected() {
        let (db, client_id) = db_with_client().await;
        let mut sale = new_sale(client_id);
        sale.total = Money::from_cents(1);

        let result = db.sales().create_sale(&sale).await;
        assert!(matches!(result, Err(DbError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_get_missing_sale() {
        let (db, _) = db_with_client().await;
        assert!(db.sales().get_sale(42).await.unwrap().is_none());
    }
}
