//! # Settings Repository
//!
//! Key-value settings with JSON values. The only key this subsystem owns is
//! `company_settings`, the CompanyProfile printed on every receipt.
//!
//! ```text
//! settings
//! ┌──────────────────┬──────────────────────────────────────────────┐
//! │ key              │ value                                        │
//! ├──────────────────┼──────────────────────────────────────────────┤
//! │ company_settings │ {"name":"MORAIS","tagline":"distribuidora",…}│
//! └──────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! A missing key means the default profile. A corrupt blob is logged and
//! salvaged field by field, so printing keeps working. Saving replaces the
//! whole blob.

use aquagas_core::CompanyProfile;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;

/// Key of the CompanyProfile blob.
pub const COMPANY_SETTINGS_KEY: &str = "company_settings";

/// Repository for key-value settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Raw value for `key`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Inserts or replaces the value for `key`.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key, "Writing setting");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The stored profile, or the default one when nothing was saved yet.
    ///
    /// Only a failed query is an error.
    pub async fn company_profile(&self) -> DbResult<CompanyProfile> {
        match self.get(COMPANY_SETTINGS_KEY).await? {
            Some(json) => match CompanyProfile::from_json(&json) {
                Ok(profile) => Ok(profile),
                Err(e) => {
                    warn!(error = %e, "Stored company settings are corrupt, falling back to defaults");
                    Ok(CompanyProfile::salvage(&json))
                }
            },
            None => {
                debug!("No company settings stored, using defaults");
                Ok(CompanyProfile::default())
            }
        }
    }

    /// Overwrites the stored profile.
    pub async fn save_company_profile(&self, profile: &CompanyProfile) -> DbResult<()> {
        let json = profile.to_json()?;
        self.set(COMPANY_SETTINGS_KEY, &json).await?;
        info!(name = %profile.name, has_logo = profile.logo.is_some(), "Company profile saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_missing_profile_is_default() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let profile = db.settings().company_profile().await.unwrap();
        assert_eq!(profile, CompanyProfile::default());
    }

    #[tokio::test]
    async fn test_save_replaces_whole_profile() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings();

        let first = CompanyProfile {
            name: "AQUA BOA".to_string(),
            logo: Some("data:image/png;base64,AAAA".to_string()),
            ..CompanyProfile::default()
        };
        settings.save_company_profile(&first).await.unwrap();

        let second = CompanyProfile {
            name: "GÁS FORTE".to_string(),
            ..CompanyProfile::default()
        };
        settings.save_company_profile(&second).await.unwrap();

        let loaded = settings.company_profile().await.unwrap();
        assert_eq!(loaded, second);
        assert_eq!(loaded.logo, None);
    }

    #[tokio::test]
    async fn test_partial_blob_fills_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings()
            .set(COMPANY_SETTINGS_KEY, r#"{"name":"OUTRA"}"#)
            .await
            .unwrap();

        let profile = db.settings().company_profile().await.unwrap();
        assert_eq!(profile.name, "OUTRA");
        assert_eq!(profile.footer_message, "Deus é nossa fonte!");
    }

    #[tokio::test]
    async fn test_corrupt_blob_falls_back_to_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings().set(COMPANY_SETTINGS_KEY, "{not json").await.unwrap();

        let profile = db.settings().company_profile().await.unwrap();
        assert_eq!(profile, CompanyProfile::default());
    }

    #[tokio::test]
    async fn test_mistyped_blob_keeps_readable_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings()
            .set(COMPANY_SETTINGS_KEY, r#"{"name":"OUTRA","logoBase64":false}"#)
            .await
            .unwrap();

        let profile = db.settings().company_profile().await.unwrap();
        assert_eq!(profile.name, "OUTRA");
        assert_eq!(profile.logo, None);
        assert_eq!(profile.tagline, "distribuidora");
    }
}
