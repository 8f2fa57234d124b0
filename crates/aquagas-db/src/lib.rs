//! # aquagas-db: Database Layer for Aquagas POS
//!
//! The persistence boundary: sales with sequential ids, catalog lookups for
//! the sale form and the key-value settings that hold the CompanyProfile.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Aquagas POS Data Flow                            │
//! │                                                                         │
//! │  Sale Submitter (desktop)                                              │
//! │       │ NewSale                                                         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    aquagas-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ Sale, Product  │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ Client, Method │    │ 001_init.sql │  │   │
//! │  │   │               │    │ Settings       │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file in the platform data dir (aquagas.db)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aquagas_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("aquagas.db")).await?;
//! let methods = db.methods().list_shipping_methods().await?;
//! let sale = db.sales().create_sale(&new_sale).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::client::ClientRepository;
pub use repository::method::MethodRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::{SettingsRepository, COMPANY_SETTINGS_KEY};
