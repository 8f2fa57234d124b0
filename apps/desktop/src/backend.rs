//! # Backend Boundary
//!
//! The two things the sale flow needs from persistence, as traits so the
//! submitter and the profile cache can be tested against fakes.
//!
//! ```text
//!  Sale Submitter ──► SaleGateway::create_sale ──► Sale { id, created_at, .. }
//!  Print again    ──► SaleGateway::get_sale
//!  ProfileState   ──► CompanyProfileStore::load / save
//! ```
//!
//! [`Database`] implements both.

use std::future::Future;

use aquagas_core::{CompanyProfile, NewSale, Sale};
use aquagas_db::{Database, DbResult};

/// Where finalized sales go.
pub trait SaleGateway: Send + Sync {
    /// Stores one sale and returns it with its assigned id and timestamp.
    fn create_sale(&self, sale: &NewSale) -> impl Future<Output = DbResult<Sale>> + Send;

    fn get_sale(&self, id: i64) -> impl Future<Output = DbResult<Option<Sale>>> + Send;
}

/// Persistence for the branding block. Saves replace the whole profile.
pub trait CompanyProfileStore: Send + Sync {
    /// The stored profile, or the default one.
    fn load(&self) -> impl Future<Output = DbResult<CompanyProfile>> + Send;

    fn save(&self, profile: &CompanyProfile) -> impl Future<Output = DbResult<()>> + Send;
}

impl SaleGateway for Database {
    async fn create_sale(&self, sale: &NewSale) -> DbResult<Sale> {
        self.sales().create_sale(sale).await
    }

    async fn get_sale(&self, id: i64) -> DbResult<Option<Sale>> {
        self.sales().get_sale(id).await
    }
}

impl CompanyProfileStore for Database {
    async fn load(&self) -> DbResult<CompanyProfile> {
        self.settings().company_profile().await
    }

    async fn save(&self, profile: &CompanyProfile) -> DbResult<()> {
        self.settings().save_company_profile(profile).await
    }
}
