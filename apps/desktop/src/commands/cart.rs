//! # Cart Commands
//!
//! Cart edits and the client / payment / shipping selections of the sale
//! form. Every command returns the updated [`SaleFormView`].
//!
//! ## Form Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────────┐     ┌──────────┐   │
//! │  │  Empty   │────►│ In Cart  │────►│ Selections   │────►│ Submitted│   │
//! │  │  Form    │     │          │     │ complete     │     │  Sale    │   │
//! │  └──────────┘     └──────────┘     └──────────────┘     └──────────┘   │
//! │                        │                  │                             │
//! │                   add_to_cart       select_client                      │
//! │                   update_quantity   select_payment_method              │
//! │                   remove_from_cart  select_shipping_method             │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   cancel_sale ──────────────────► (back to empty)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use aquagas_db::Database;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::{SaleFormView, SessionState};

pub fn get_form(session: &SessionState) -> SaleFormView {
    session.view()
}

/// Adds one unit of a product; a second add bumps the existing line.
pub async fn add_to_cart(
    db: &Database,
    session: &SessionState,
    product_id: i64,
) -> ApiResult<SaleFormView> {
    let product = db
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &product_id.to_string()))?;

    debug!(product_id, name = %product.name, "Adding product to cart");
    Ok(session.add_product(&product).into())
}

/// Sets a line's quantity. Zero or below removes the line.
pub fn update_quantity(session: &SessionState, product_id: i64, quantity: i64) -> SaleFormView {
    debug!(product_id, quantity, "Updating cart quantity");
    session.set_quantity(product_id, quantity).into()
}

pub fn remove_from_cart(session: &SessionState, product_id: i64) -> SaleFormView {
    debug!(product_id, "Removing product from cart");
    session.remove_line(product_id).into()
}

pub async fn select_client(
    db: &Database,
    session: &SessionState,
    client_id: i64,
) -> ApiResult<SaleFormView> {
    let client = db
        .clients()
        .get_by_id(client_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client", &client_id.to_string()))?;

    debug!(client_id, name = %client.name, "Client selected");
    Ok(session.select_client(client).into())
}

pub fn clear_client(session: &SessionState) -> SaleFormView {
    session.clear_client().into()
}

pub fn select_payment_method(session: &SessionState, name: String) -> SaleFormView {
    session.select_payment_method(name).into()
}

/// Selects a shipping method; its fee comes from the stored methods, and an
/// unknown name means no fee.
pub async fn select_shipping_method(
    db: &Database,
    session: &SessionState,
    name: String,
) -> ApiResult<SaleFormView> {
    let methods = db.methods().list_shipping_methods().await?;
    let form = session.select_shipping_method(name, &methods);
    debug!(method = %form.shipping_method, fee = %form.shipping_fee, "Shipping method selected");
    Ok(form.into())
}

/// Discards the cart and every selection.
pub fn cancel_sale(session: &SessionState) -> SaleFormView {
    debug!("Sale form cancelled");
    session.cancel().into()
}
