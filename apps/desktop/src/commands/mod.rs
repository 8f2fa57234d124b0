//! # Commands Module
//!
//! All commands exposed to the sale form.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart edits and form selections
//! ├── catalog.rs   ◄─── Products, clients, methods, recent sales
//! ├── sale.rs      ◄─── submit_sale, submit_and_print
//! ├── print.rs     ◄─── Preview, print again, blank form, PDF payload
//! └── settings.rs  ◄─── Company profile settings
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn get_products(db: &Database)
//!
//! // Only needs the session
//! fn get_form(session: &SessionState)
//!
//! // Needs both
//! async fn add_to_cart(db: &Database, session: &SessionState, product_id: i64)
//! ```
//!
//! Every command returns `ApiResult<T>` with a serializable payload.

pub mod cart;
pub mod catalog;
pub mod print;
pub mod sale;
pub mod settings;
