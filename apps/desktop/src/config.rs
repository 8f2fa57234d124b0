//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     AQUAGAS_DB_PATH=/srv/aquagas.db                                    │
//! │     AQUAGAS_PRINT_COMMAND=lpr                                          │
//! │     AQUAGAS_LOG=debug                                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/aquagas-pos/aquagas.toml (Linux)                         │
//! │     ~/Library/Application Support/com.aquagas.pos/aquagas.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CompanyProfile is not configuration: it lives in the database
//! settings table and is edited from the settings screen. Neither is the
//! 10 second release of temporary print surfaces, which is fixed.
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/home/caixa/aquagas.db"
//!
//! [print]
//! command = "lp"
//! args = ["-d", "EPSON_L3150", "{file}"]
//! spool_dir = "/tmp/aquagas-spool"
//! format = "pdf"              # pdf | markup
//!
//! [logging]
//! filter = "info,aquagas=debug,sqlx=warn"
//! ```

use std::path::PathBuf;

use aquagas_print::ArtifactFormat;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

pub const CONFIG_FILE_NAME: &str = "aquagas.toml";
pub const DATABASE_FILE_NAME: &str = "aquagas.db";
pub const DEFAULT_LOG_FILTER: &str = "info,aquagas=debug,sqlx=warn";

pub const ENV_DB_PATH: &str = "AQUAGAS_DB_PATH";
pub const ENV_PRINT_COMMAND: &str = "AQUAGAS_PRINT_COMMAND";
pub const ENV_LOG: &str = "AQUAGAS_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Could not determine the application directories")]
    NoProjectDirs,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("com", "aquagas", "pos").ok_or(ConfigError::NoProjectDirs)
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. Default: `aquagas.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// System print command.
    #[serde(default = "default_print_command")]
    pub command: String,

    /// Command arguments; `{file}` marks where the spool file goes.
    #[serde(default)]
    pub args: Vec<String>,

    /// Where temporary print surfaces are written.
    #[serde(default)]
    pub spool_dir: Option<PathBuf>,

    /// Viewer used to show previews (e.g. `xdg-open`).
    #[serde(default)]
    pub preview_command: Option<String>,

    #[serde(default)]
    pub format: ArtifactFormat,
}

fn default_print_command() -> String {
    aquagas_print::host::DEFAULT_PRINT_COMMAND.to_string()
}

impl Default for PrintSettings {
    fn default() -> Self {
        PrintSettings {
            command: default_print_command(),
            args: Vec::new(),
            spool_dir: None,
            preview_command: None,
            format: ArtifactFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive string. `RUST_LOG` still wins at startup.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub print: PrintSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads from `config_path` (or the platform default), then applies
    /// environment overrides and validates.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// [`AppConfig::load`] with an explicit environment lookup.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoProjectDirs)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.print.command.trim().is_empty() {
            return Err(ConfigError::Invalid("print.command must not be empty".into()));
        }

        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            ConfigError::Invalid(format!("logging.filter '{}': {}", self.logging.filter, e))
        })?;

        Ok(())
    }

    fn apply_env_overrides<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = env(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(command) = env(ENV_PRINT_COMMAND) {
            debug!(command = %command, "Overriding print command from environment");
            self.print.command = command;
        }

        if let Some(filter) = env(ENV_LOG) {
            self.logging.filter = filter;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs()
            .ok()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Database file, creating the data directory when defaulted.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs()?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DATABASE_FILE_NAME))
    }

    /// Spool directory for temporary print surfaces.
    pub fn spool_dir(&self) -> PathBuf {
        self.print
            .spool_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("aquagas-spool"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_with_env(Some(dir.path().join("nope.toml")), no_env).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.print.command, "lp");
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
[print]
command = "lpr"
args = ["-P", "balcao", "{file}"]
format = "markup"
"#,
        )
        .unwrap();

        let config = AppConfig::load_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.print.command, "lpr");
        assert_eq!(config.print.args, vec!["-P", "balcao", "{file}"]);
        assert_eq!(config.print.format, ArtifactFormat::Markup);
        assert_eq!(config.database.path, None);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[database]\npath = \"/data/file.db\"\n").unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_DB_PATH, "/data/env.db"),
            (ENV_PRINT_COMMAND, "lpr"),
            (ENV_LOG, "warn"),
        ]
        .into_iter()
        .collect();

        let config =
            AppConfig::load_with_env(Some(path), |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/data/env.db")));
        assert_eq!(config.print.command, "lpr");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, "[print]\ncommand = \"  \"\n").unwrap();
        assert!(matches!(
            AppConfig::load_with_env(Some(path.clone()), no_env),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "[print\n").unwrap();
        assert!(matches!(
            AppConfig::load_with_env(Some(path), no_env),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_release_delay_is_not_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[print]\nrelease_delay_secs = 3\n").unwrap();

        let config = AppConfig::load_with_env(Some(path), no_env).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!toml::to_string(&config).unwrap().contains("release_delay"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from("/srv/aquagas.db"));
        config.print.spool_dir = Some(PathBuf::from("/var/spool/aquagas"));
        config.save(Some(path.clone())).unwrap();

        let loaded = AppConfig::load_with_env(Some(path), no_env).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_explicit_database_path() {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from("/tmp/x.db"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/x.db"));
    }
}
