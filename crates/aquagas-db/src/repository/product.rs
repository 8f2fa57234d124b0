//! # Product Repository
//!
//! The product grid of the sale form. Prices are read here and frozen into
//! cart lines by the Cart Model.

use aquagas_core::validation::{validate_amount, validate_item_name};
use aquagas_core::{Money, Product};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, grouped by category then name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price_cents, category
            FROM products
            ORDER BY category, name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price_cents, category FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Inserts a product and returns it with its new id.
    pub async fn insert(&self, name: &str, price: Money, category: &str) -> DbResult<Product> {
        validate_item_name(name)?;
        validate_amount("price", price)?;

        let id = sqlx::query("INSERT INTO products (name, price_cents, category) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(price)
            .bind(category)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Product {
            id,
            name: name.to_string(),
            price,
            category: category.to_string(),
        })
    }

    /// Number of products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let gas = db
            .products()
            .insert("Gás GLP P13", Money::from_cents(6000), "gas")
            .await
            .unwrap();
        db.products()
            .insert("Água Mineral 20L", Money::from_cents(1800), "agua")
            .await
            .unwrap();

        let products = db.products().list().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].category, "agua");
        assert_eq!(products[1], gas);
        assert_eq!(db.products().get_by_id(gas.id).await.unwrap(), Some(gas));
        assert_eq!(db.products().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let result = db
            .products()
            .insert("Água", Money::from_cents(-1), "agua")
            .await;
        assert!(matches!(result, Err(DbError::InvalidData(_))));
    }
}
