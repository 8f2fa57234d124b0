//! # Company Profile State
//!
//! Process-wide cache of the [`CompanyProfile`]. Loaded from the store on
//! first use; a save replaces the cached value as a whole, so the next
//! receipt composed sees it.

use std::sync::{Arc, RwLock};

use aquagas_core::validation::validate_company_profile;
use aquagas_core::CompanyProfile;
use tracing::{debug, info};

use crate::backend::CompanyProfileStore;
use crate::error::ApiResult;

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    cached: Arc<RwLock<Option<CompanyProfile>>>,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current profile, loading it from `store` the first time.
    pub async fn current<S: CompanyProfileStore>(&self, store: &S) -> ApiResult<CompanyProfile> {
        if let Some(profile) = self.cached() {
            return Ok(profile);
        }

        let profile = store.load().await?;
        debug!(name = %profile.name, "Company profile loaded");
        *self.cached.write().expect("profile cache poisoned") = Some(profile.clone());
        Ok(profile)
    }

    /// Validates, persists and caches `profile`.
    pub async fn save<S: CompanyProfileStore>(
        &self,
        store: &S,
        profile: CompanyProfile,
    ) -> ApiResult<CompanyProfile> {
        validate_company_profile(&profile)?;
        store.save(&profile).await?;
        *self.cached.write().expect("profile cache poisoned") = Some(profile.clone());
        info!(name = %profile.name, "Company profile updated");
        Ok(profile)
    }

    /// Cached value, if loaded.
    pub fn cached(&self) -> Option<CompanyProfile> {
        self.cached.read().expect("profile cache poisoned").clone()
    }
}
