//! # Settings Commands
//!
//! Company profile read and save. A save replaces the whole profile and
//! the next composed receipt uses it.

use aquagas_core::CompanyProfile;
use tracing::error;

use crate::backend::CompanyProfileStore;
use crate::error::ApiResult;
use crate::state::{
    NotificationCategory, Notifications, ProfileState, SETTINGS_FAILED, SETTINGS_SAVED,
};

pub async fn get_company_settings<S: CompanyProfileStore>(
    store: &S,
    profile: &ProfileState,
) -> ApiResult<CompanyProfile> {
    profile.current(store).await
}

pub async fn save_company_settings<S: CompanyProfileStore>(
    store: &S,
    profile: &ProfileState,
    notifications: &Notifications,
    settings: CompanyProfile,
) -> ApiResult<CompanyProfile> {
    match profile.save(store, settings).await {
        Ok(saved) => {
            notifications.success(NotificationCategory::Settings, SETTINGS_SAVED);
            Ok(saved)
        }
        Err(e) => {
            error!(error = %e, "Failed to save company settings");
            notifications.error(NotificationCategory::Settings, SETTINGS_FAILED);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::NotificationKind;
    use crate::testing::seeded_db;
    use aquagas_core::compose_blank;

    #[tokio::test]
    async fn test_defaults_then_save() {
        let db = seeded_db().await;
        let profile = ProfileState::new();
        let notifications = Notifications::new();

        let current = get_company_settings(&db, &profile).await.unwrap();
        assert_eq!(current.name, "MORAIS");

        let updated = CompanyProfile {
            name: "AQUA BOA".to_string(),
            footer_message: "Obrigado!".to_string(),
            ..current
        };
        save_company_settings(&db, &profile, &notifications, updated.clone())
            .await
            .unwrap();

        // A fresh cache reads back what was stored
        let reloaded = get_company_settings(&db, &ProfileState::new()).await.unwrap();
        assert_eq!(reloaded, updated);

        let document = compose_blank(&get_company_settings(&db, &profile).await.unwrap());
        assert_eq!(document.vias[0].company.name, "AQUA BOA");

        let list = notifications.list();
        assert_eq!(list[0].kind, NotificationKind::Success);
        assert_eq!(list[0].message, SETTINGS_SAVED);
    }

    #[tokio::test]
    async fn test_invalid_settings_notify() {
        let db = seeded_db().await;
        let profile = ProfileState::new();
        let notifications = Notifications::new();

        let bad = CompanyProfile {
            name: String::new(),
            ..CompanyProfile::default()
        };
        let err = save_company_settings(&db, &profile, &notifications, bad)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(notifications.list()[0].message, SETTINGS_FAILED);
        assert_eq!(get_company_settings(&db, &profile).await.unwrap(), CompanyProfile::default());
    }
}
