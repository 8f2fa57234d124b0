//! # Catalog Commands
//!
//! Read-only lookups the sale form renders: product grid, client picker,
//! payment and shipping options, and the recent sales list used by
//! "print again".

use aquagas_core::{Client, Money, PaymentMethod, Product, Sale, ShippingMethod};
use aquagas_db::Database;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiResult;

/// Default page size for [`list_recent_sales`].
pub const DEFAULT_RECENT_LIMIT: u32 = 20;

/// One row of the sales history list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub id: i64,
    pub client_name: String,

    /// `"Água Mineral 20L (x2), Gás GLP P13 (x1)"`
    pub items_summary: String,
    pub payment_method: String,
    pub total: Money,
    pub created_at: String,
}

impl From<&Sale> for SaleSummary {
    fn from(sale: &Sale) -> Self {
        SaleSummary {
            id: sale.id,
            client_name: sale.client_name.clone(),
            items_summary: sale.items_summary(),
            payment_method: sale.payment_method.clone(),
            total: sale.total,
            created_at: sale.created_at.to_rfc3339(),
        }
    }
}

pub async fn get_products(db: &Database) -> ApiResult<Vec<Product>> {
    Ok(db.products().list().await?)
}

pub async fn get_clients(db: &Database) -> ApiResult<Vec<Client>> {
    Ok(db.clients().list().await?)
}

/// Case-insensitive substring search on the client name. Empty returns all.
pub async fn search_clients(db: &Database, query: String) -> ApiResult<Vec<Client>> {
    let clients = db.clients().search(&query).await?;
    debug!(query = %query, results = clients.len(), "Client search");
    Ok(clients)
}

pub async fn get_shipping_methods(db: &Database) -> ApiResult<Vec<ShippingMethod>> {
    Ok(db.methods().list_shipping_methods().await?)
}

pub async fn get_payment_methods(db: &Database) -> ApiResult<Vec<PaymentMethod>> {
    Ok(db.methods().list_payment_methods().await?)
}

/// Newest first.
pub async fn list_recent_sales(db: &Database, limit: Option<u32>) -> ApiResult<Vec<SaleSummary>> {
    let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let sales = db.sales().list_recent_sales(limit).await?;
    Ok(sales.iter().map(SaleSummary::from).collect())
}
