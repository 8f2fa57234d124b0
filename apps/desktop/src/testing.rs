//! Test doubles shared by the command tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aquagas_core::{CompanyProfile, Money, NewSale, Sale};
use aquagas_db::{Database, DbConfig, DbError, DbResult};
use aquagas_print::{
    Artifact, ArtifactFormat, PrintDispatcher, PrintError, PrintHost, PrintResult, PrintTrigger,
    SurfaceId,
};
use chrono::DateTime;
use tokio::sync::Notify;

use crate::backend::{CompanyProfileStore, SaleGateway};

/// In-memory database with a small catalog:
/// products 1 "Água Mineral 20L" R$ 18.00 and 2 "Gás GLP P13" R$ 60.00,
/// client 1 "Maria Silva", payment "PIX", shipping "Retirada" (0) and
/// "Entrega" (R$ 5.00).
pub async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.products()
        .insert("Água Mineral 20L", Money::from_cents(1800), "agua")
        .await
        .unwrap();
    db.products()
        .insert("Gás GLP P13", Money::from_cents(6000), "gas")
        .await
        .unwrap();
    db.clients()
        .insert("Maria Silva", Some("(27) 99812-3344"), None)
        .await
        .unwrap();
    db.methods().insert_payment_method("PIX").await.unwrap();
    db.methods()
        .insert_shipping_method("Retirada", Money::zero())
        .await
        .unwrap();
    db.methods()
        .insert_shipping_method("Entrega", Money::from_cents(500))
        .await
        .unwrap();
    db
}

/// Gateway that stores sales in memory, can fail, and can hold a request
/// until released.
#[derive(Default)]
pub struct FakeGateway {
    pub sales: Mutex<Vec<Sale>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub hold: AtomicBool,
    pub release: Notify,
}

impl SaleGateway for FakeGateway {
    async fn create_sale(&self, sale: &NewSale) -> DbResult<Sale> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionFailed("backend unreachable".to_string()));
        }

        let mut sales = self.sales.lock().unwrap();
        let stored = Sale {
            id: sales.len() as i64 + 1,
            client_id: sale.client_id,
            client_name: "Maria Silva".to_string(),
            lines: sale.items.clone(),
            payment_method: sale.payment_method.clone(),
            shipping_method: sale.shipping_method.clone(),
            shipping_fee: sale.shipping_fee,
            subtotal: sale.subtotal,
            total: sale.total,
            created_at: DateTime::parse_from_rfc3339("2026-03-05T14:30:00-03:00").unwrap(),
        };
        sales.push(stored.clone());
        Ok(stored)
    }

    async fn get_sale(&self, id: i64) -> DbResult<Option<Sale>> {
        Ok(self.sales.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }
}

impl CompanyProfileStore for FakeGateway {
    async fn load(&self) -> DbResult<CompanyProfile> {
        Ok(CompanyProfile::default())
    }

    async fn save(&self, _profile: &CompanyProfile) -> DbResult<()> {
        Ok(())
    }
}

/// Print host that records what it was asked to do.
#[derive(Default)]
pub struct RecordingHost {
    pub previews: Mutex<Vec<String>>,
    pub acquired: Mutex<Vec<String>>,
    pub printed: Mutex<Vec<SurfaceId>>,
    pub released: Mutex<Vec<SurfaceId>>,
    pub fail: AtomicBool,
}

impl PrintHost for RecordingHost {
    fn show_preview(&self, artifact: &Artifact) -> PrintResult<SurfaceId> {
        self.previews.lock().unwrap().push(artifact.sale_number.clone());
        Ok(SurfaceId::new())
    }

    fn acquire_surface(&self, artifact: &Artifact) -> PrintResult<SurfaceId> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PrintError::Surface("surface failed to load".to_string()));
        }
        self.acquired.lock().unwrap().push(artifact.sale_number.clone());
        Ok(SurfaceId::new())
    }

    fn print(&self, surface: SurfaceId) -> PrintResult<PrintTrigger> {
        self.printed.lock().unwrap().push(surface);
        Ok(PrintTrigger::Started)
    }

    fn release_surface(&self, surface: SurfaceId) -> PrintResult<()> {
        self.released.lock().unwrap().push(surface);
        Ok(())
    }
}

pub fn dispatcher() -> PrintDispatcher<RecordingHost> {
    PrintDispatcher::new(Arc::new(RecordingHost::default())).with_format(ArtifactFormat::Markup)
}
