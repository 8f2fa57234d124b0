//! # Client Repository
//!
//! Read access for the sale form's client picker. Inserts exist for the
//! seed binary and tests; client editing belongs to the CRUD screens.

use aquagas_core::validation::{validate_item_name, validate_search_query};
use aquagas_core::Client;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// All clients, by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, phone, address FROM clients ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    /// Gets a client by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, phone, address FROM clients WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    /// Case-insensitive substring search on the name.
    ///
    /// Matching happens in Rust: SQLite's `LIKE` only folds ASCII, and
    /// names here are full of accents ("João", "Conceição").
    pub async fn search(&self, query: &str) -> DbResult<Vec<Client>> {
        let query = validate_search_query(query)?;
        debug!(query = %query, "Searching clients");

        let clients = self.list().await?;
        Ok(clients.into_iter().filter(|c| c.matches(&query)).collect())
    }

    /// Inserts a client and returns it with its new id.
    pub async fn insert(
        &self,
        name: &str,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> DbResult<Client> {
        validate_item_name(name)?;

        let id = sqlx::query("INSERT INTO clients (name, phone, address) VALUES (?1, ?2, ?3)")
            .bind(name)
            .bind(phone)
            .bind(address)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(Client {
            id,
            name: name.to_string(),
            phone: phone.map(str::to_string),
            address: address.map(str::to_string),
        })
    }
}
