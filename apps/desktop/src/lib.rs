//! # Aquagas Desktop Library
//!
//! Application layer for the Aquagas POS sale screen: configuration,
//! logging, shared state and the commands the sale form invokes.
//!
//! ## Module Organization
//! ```text
//! aquagas_desktop_lib/
//! ├── lib.rs          ◄─── You are here (startup & AppContext)
//! ├── config.rs       ◄─── TOML config + environment overrides
//! ├── backend.rs      ◄─── SaleGateway / CompanyProfileStore boundary
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Sale form + submission lock
//! │   ├── profile.rs  ◄─── Company profile cache
//! │   └── notify.rs   ◄─── Operator notifications
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── cart.rs     ◄─── Cart and selection commands
//! │   ├── catalog.rs  ◄─── Products, clients, methods, history
//! │   ├── sale.rs     ◄─── Sale submission
//! │   ├── print.rs    ◄─── Preview, print, blank form, PDF payload
//! │   └── settings.rs ◄─── Company profile settings
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management (Multiple State Types)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         AppContext                                      │
//! │                                                                         │
//! │  ┌──────────┐ ┌──────────────┐ ┌──────────────┐ ┌───────────────────┐  │
//! │  │ Database │ │ SessionState │ │ ProfileState │ │  Notifications    │  │
//! │  └──────────┘ └──────────────┘ └──────────────┘ └───────────────────┘  │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │ PrintDispatcher<SpoolPrintHost>                                   │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                                                                         │
//! │  Commands borrow only the pieces they need.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use aquagas_db::{Database, DbConfig};
use aquagas_print::{PrintDispatcher, SpoolPrintHost};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use error::ApiResult;
use state::{Notifications, ProfileState, SessionState};

/// Everything the commands run against.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub db: Database,
    pub session: SessionState,
    pub profile: ProfileState,
    pub notifications: Notifications,
    pub dispatcher: Arc<PrintDispatcher<SpoolPrintHost>>,
}

impl AppContext {
    /// Opens the configured database and builds the state objects.
    pub async fn initialize(config: AppConfig) -> ApiResult<Self> {
        let db_path = config.database_path()?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        Self::with_database(config, db)
    }

    /// Builds the state objects around an already open database.
    pub fn with_database(config: AppConfig, db: Database) -> ApiResult<Self> {
        let print = &config.print;
        let mut host = SpoolPrintHost::new(config.spool_dir())?
            .with_command(print.command.clone(), print.args.clone())?;
        if let Some(viewer) = &print.preview_command {
            host = host.with_preview_command(viewer.clone());
        }

        let dispatcher = PrintDispatcher::new(Arc::new(host)).with_format(print.format);

        info!(format = ?print.format, command = %print.command, "Print dispatcher ready");

        Ok(AppContext {
            config,
            db,
            session: SessionState::new(),
            profile: ProfileState::new(),
            notifications: Notifications::new(),
            dispatcher: Arc::new(dispatcher),
        })
    }
}

/// Loads configuration, initializes logging and builds the [`AppContext`].
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Load Config ──────────────────────────────────────────────────────► │
/// │     • aquagas.toml in the platform config dir (or the given path)       │
/// │     • AQUAGAS_DB_PATH / AQUAGAS_PRINT_COMMAND / AQUAGAS_LOG overrides   │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • RUST_LOG wins, otherwise logging.filter                           │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  4. Initialize State Objects ─────────────────────────────────────────► │
/// │     • Session, profile cache, notifications, print dispatcher           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn start(config_path: Option<PathBuf>) -> ApiResult<AppContext> {
    let config = AppConfig::load(config_path)?;
    init_tracing(&config.logging.filter);

    info!("Starting Aquagas POS");
    AppContext::initialize(config).await
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over `filter`. Safe to call more than once;
/// later calls are ignored.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::PrintSettings;

    #[tokio::test]
    async fn test_context_with_in_memory_db() {
        let spool = tempfile::tempdir().unwrap();
        let config = AppConfig {
            print: PrintSettings {
                spool_dir: Some(spool.path().join("spool")),
                ..PrintSettings::default()
            },
            ..AppConfig::default()
        };
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let ctx = AppContext::with_database(config, db).unwrap();

        assert!(spool.path().join("spool").is_dir());
        assert!(ctx.session.form().cart.is_empty());
        assert!(ctx.notifications.list().is_empty());
        assert!(ctx.profile.cached().is_none());
        assert_eq!(ctx.dispatcher.host().surface_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_print_command_rejected() {
        let spool = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.print.spool_dir = Some(spool.path().to_path_buf());
        config.print.command = String::new();
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = AppContext::with_database(config, db).err().unwrap();
        assert_eq!(err.code, error::ErrorCode::PrintFailed);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing("info");
        init_tracing("debug");
    }
}
