//! # Print Commands
//!
//! Preview, "print again", the blank control form and the backend PDF
//! payload. Every receipt is composed from the current company profile.
//!
//! ## Print Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open_preview(sale) ──► preview surface shows sale N                    │
//! │                                                                         │
//! │  print_sale(sale N) ──┬─ preview shows N ──► print the preview surface  │
//! │                       └─ otherwise ───────► temporary surface,          │
//! │                                             released after 10s          │
//! │                                                                         │
//! │  print_blank ─────────────────────────────► temporary surface           │
//! │                                                                         │
//! │  generate_sale_pdf ──► base64 PDF for the frontend (no surface)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures here never touch stored sales; they raise a print notification.

use aquagas_core::receipt::{format_date, format_sale_number, SaleSnapshot};
use aquagas_core::validation::validate_sale_lines;
use aquagas_core::{compose, Money, ReceiptDocument, Sale, SaleLine};
use aquagas_print::{render_pdf, PrintDispatcher, PrintError, PrintHost, PrintJob, SurfaceId};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use serde::Deserialize;
use tracing::{error, info};

use crate::backend::{CompanyProfileStore, SaleGateway};
use crate::error::{ApiError, ApiResult};
use crate::state::{
    NotificationCategory, Notifications, ProfileState, BLANK_FORM_FAILED, PRINT_FAILED,
};

/// Loose sale data for backend PDF rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSalePdfRequest {
    pub client_name: String,
    pub items: Vec<SaleLine>,
    pub total: Money,
    pub sale_number: i64,
}

async fn load_sale<G: SaleGateway>(gateway: &G, sale_id: i64) -> ApiResult<Sale> {
    gateway
        .get_sale(sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &sale_id.to_string()))
}

async fn compose_stored<B>(
    backend: &B,
    profile: &ProfileState,
    sale_id: i64,
) -> ApiResult<ReceiptDocument>
where
    B: SaleGateway + CompanyProfileStore,
{
    let sale = load_sale(backend, sale_id).await?;
    let company = profile.current(backend).await?;
    Ok(compose(&sale, &company))
}

fn report(notifications: &Notifications, message: &str, err: ApiError) -> ApiError {
    error!(error = %err, "{}", message);
    notifications.error(NotificationCategory::Print, message);
    err
}

/// Shows a stored sale in the preview.
pub async fn open_preview<B, H>(
    backend: &B,
    profile: &ProfileState,
    dispatcher: &PrintDispatcher<H>,
    notifications: &Notifications,
    sale_id: i64,
) -> ApiResult<SurfaceId>
where
    B: SaleGateway + CompanyProfileStore,
    H: PrintHost,
{
    let document = compose_stored(backend, profile, sale_id).await?;
    dispatcher
        .open_preview(&document)
        .await
        .map_err(|e| report(notifications, PRINT_FAILED, e.into()))
}

pub fn close_preview<H: PrintHost>(dispatcher: &PrintDispatcher<H>) -> bool {
    dispatcher.close_preview()
}

/// Prints a stored sale again.
pub async fn print_sale<B, H>(
    backend: &B,
    profile: &ProfileState,
    dispatcher: &PrintDispatcher<H>,
    notifications: &Notifications,
    sale_id: i64,
) -> ApiResult<PrintJob>
where
    B: SaleGateway + CompanyProfileStore,
    H: PrintHost,
{
    let document = compose_stored(backend, profile, sale_id).await?;
    let job = dispatcher
        .print(&document)
        .await
        .map_err(|e| report(notifications, PRINT_FAILED, e.into()))?;

    info!(sale_id, job = %job.id, path = ?job.path, "Sale printed");
    Ok(job)
}

/// Prints the unfilled control form ("nota branca").
pub async fn print_blank<S, H>(
    store: &S,
    profile: &ProfileState,
    dispatcher: &PrintDispatcher<H>,
    notifications: &Notifications,
) -> ApiResult<PrintJob>
where
    S: CompanyProfileStore,
    H: PrintHost,
{
    let printed = async {
        let company = profile.current(store).await?;
        Ok::<PrintJob, ApiError>(dispatcher.print_blank(&company).await?)
    }
    .await;

    printed.map_err(|e| report(notifications, BLANK_FORM_FAILED, e))
}

/// Renders a control note from loose parts and returns the PDF as base64.
/// The note is dated now.
pub async fn generate_sale_pdf<S: CompanyProfileStore>(
    store: &S,
    profile: &ProfileState,
    notifications: &Notifications,
    request: GenerateSalePdfRequest,
) -> ApiResult<String> {
    validate_sale_lines(&request.items)?;
    let company = profile.current(store).await?;

    let snapshot = SaleSnapshot::from_parts(
        format_sale_number(request.sale_number),
        request.client_name,
        format_date(&Local::now().fixed_offset()),
        request.items,
        request.total,
    );
    let document = ReceiptDocument::from_snapshot(snapshot, &company);

    let rendered = tokio::task::spawn_blocking(move || render_pdf(&document))
        .await
        .map_err(|e| PrintError::Task(e.to_string()))
        .and_then(|result| result);

    match rendered {
        Ok(bytes) => {
            info!(sale_number = request.sale_number, bytes = bytes.len(), "Sale PDF generated");
            Ok(STANDARD.encode(bytes))
        }
        Err(e) => Err(report(notifications, PRINT_FAILED, e.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{dispatcher, FakeGateway};
    use aquagas_core::NewSale;
    use aquagas_print::PrintPath;
    use std::sync::atomic::Ordering;

    async fn gateway_with_sale() -> FakeGateway {
        let gateway = FakeGateway::default();
        gateway
            .create_sale(&NewSale {
                client_id: 1,
                items: vec![SaleLine {
                    name: "Gás GLP P13".to_string(),
                    qty: 1,
                    price: Money::from_cents(6000),
                }],
                payment_method: "PIX".to_string(),
                shipping_method: "Retirada".to_string(),
                shipping_fee: Money::zero(),
                subtotal: Money::from_cents(6000),
                total: Money::from_cents(6000),
            })
            .await
            .unwrap();
        gateway
    }

    #[tokio::test]
    async fn test_print_reuses_open_preview() {
        let gateway = gateway_with_sale().await;
        let profile = ProfileState::new();
        let dispatcher = dispatcher();
        let notifications = Notifications::new();

        let surface = open_preview(&gateway, &profile, &dispatcher, &notifications, 1)
            .await
            .unwrap();
        let first = print_sale(&gateway, &profile, &dispatcher, &notifications, 1)
            .await
            .unwrap();
        let second = print_sale(&gateway, &profile, &dispatcher, &notifications, 1)
            .await
            .unwrap();

        assert_eq!(first.path, PrintPath::Preview);
        assert_eq!(second.surface, surface);
        assert_eq!(dispatcher.artifacts_generated(), 1);
        assert!(dispatcher.host().acquired.lock().unwrap().is_empty());

        assert!(close_preview(&dispatcher));
        assert!(!close_preview(&dispatcher));
    }

    #[tokio::test]
    async fn test_print_without_preview_uses_fallback() {
        let gateway = gateway_with_sale().await;
        let dispatcher = dispatcher();

        let job = print_sale(&gateway, &ProfileState::new(), &dispatcher, &Notifications::new(), 1)
            .await
            .unwrap();

        assert_eq!(job.path, PrintPath::Fallback);
        assert_eq!(*dispatcher.host().acquired.lock().unwrap(), vec!["0001".to_string()]);
    }

    #[tokio::test]
    async fn test_print_unknown_sale() {
        let gateway = FakeGateway::default();
        let notifications = Notifications::new();

        let err = print_sale(&gateway, &ProfileState::new(), &dispatcher(), &notifications, 7)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(notifications.list().is_empty());
    }

    #[tokio::test]
    async fn test_print_blank() {
        let gateway = FakeGateway::default();
        let dispatcher = dispatcher();

        let job = print_blank(&gateway, &ProfileState::new(), &dispatcher, &Notifications::new())
            .await
            .unwrap();

        assert_eq!(job.path, PrintPath::Fallback);
        assert_eq!(*dispatcher.host().acquired.lock().unwrap(), vec!["0000".to_string()]);
    }

    #[tokio::test]
    async fn test_print_blank_failure_notifies() {
        let gateway = FakeGateway::default();
        let dispatcher = dispatcher();
        dispatcher.host().fail.store(true, Ordering::SeqCst);
        let notifications = Notifications::new();

        let err = print_blank(&gateway, &ProfileState::new(), &dispatcher, &notifications)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PrintFailed);
        let list = notifications.list();
        assert_eq!(list[0].category, NotificationCategory::Print);
        assert_eq!(list[0].message, BLANK_FORM_FAILED);
    }

    #[tokio::test]
    async fn test_corrupt_company_settings_still_print() {
        use crate::testing::seeded_db;
        use aquagas_core::CompanyProfile;
        use aquagas_db::COMPANY_SETTINGS_KEY;

        let db = seeded_db().await;
        db.settings().set(COMPANY_SETTINGS_KEY, "{not json").await.unwrap();
        let dispatcher = dispatcher();
        let notifications = Notifications::new();

        let job = print_blank(&db, &ProfileState::new(), &dispatcher, &notifications)
            .await
            .unwrap();

        assert_eq!(job.path, PrintPath::Fallback);
        assert!(notifications.list().is_empty());
        assert_eq!(
            crate::commands::settings::get_company_settings(&db, &ProfileState::new())
                .await
                .unwrap(),
            CompanyProfile::default()
        );
    }

    #[tokio::test]
    async fn test_generate_sale_pdf() {
        let gateway = FakeGateway::default();
        let request = GenerateSalePdfRequest {
            client_name: "Maria Silva".to_string(),
            items: vec![SaleLine {
                name: "Água Mineral 20L".to_string(),
                qty: 2,
                price: Money::from_cents(1800),
            }],
            total: Money::from_cents(3600),
            sale_number: 12,
        };

        let encoded = generate_sale_pdf(&gateway, &ProfileState::new(), &Notifications::new(), request)
            .await
            .unwrap();

        let bytes = STANDARD.decode(encoded).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_generate_sale_pdf_rejects_empty_items() {
        let gateway = FakeGateway::default();
        let request = GenerateSalePdfRequest {
            client_name: "Maria Silva".to_string(),
            items: Vec::new(),
            total: Money::zero(),
            sale_number: 1,
        };

        let err = generate_sale_pdf(&gateway, &ProfileState::new(), &Notifications::new(), request)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
