//! # Repository Module
//!
//! Database repository implementations for Aquagas POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  desktop command                                                       │
//! │       │                                                                 │
//! │       │  db.sales().create_sale(&new_sale)                             │
//! │       ▼                                                                 │
//! │  SaleRepository ──► SQL ──► SQLite                                     │
//! │                                                                         │
//! │  SQL lives only in this module; callers see domain types.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SaleRepository`](sale::SaleRepository) - Sale creation and history
//! - [`ProductRepository`](product::ProductRepository) - Product catalog
//! - [`ClientRepository`](client::ClientRepository) - Clients and search
//! - [`MethodRepository`](method::MethodRepository) - Shipping and payment methods
//! - [`SettingsRepository`](settings::SettingsRepository) - Key-value settings, company profile

pub mod client;
pub mod method;
pub mod product;
pub mod sale;
pub mod settings;
