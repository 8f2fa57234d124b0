//! # Sale Commands
//!
//! The Sale Submitter. One request per submission, at most one in flight
//! per session; printing afterwards is best effort and never undoes a
//! stored sale.

use aquagas_core::{compose, Sale};
use aquagas_print::{PrintDispatcher, PrintHost, PrintJob};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::backend::{CompanyProfileStore, SaleGateway};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::{
    NotificationCategory, Notifications, ProfileState, SessionState, PRINT_FAILED, SALE_FAILED,
    SALE_SAVED,
};

/// Result of "save and print".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub sale: Sale,

    /// None when printing failed; the sale is stored either way.
    pub print_job: Option<PrintJob>,
}

/// Submits the current form.
///
/// ## Flow
/// ```text
/// begin_submit ──► lock + snapshot ──► gateway.create_sale ──┬─ Ok  ──► form cleared, success notice
///      │                                                     └─ Err ──► form kept, error notice
///      └─ already submitting ──► SUBMISSION_IN_FLIGHT (nothing sent)
/// ```
///
/// If this future is dropped mid-request the guard releases the lock and
/// the form stays as it was.
pub async fn submit_sale<G: SaleGateway>(
    session: &SessionState,
    gateway: &G,
    notifications: &Notifications,
) -> ApiResult<Sale> {
    let guard = match session.begin_submit() {
        Ok(guard) => guard,
        Err(e) => {
            if e.code == ErrorCode::SubmissionInFlight {
                warn!("Submission rejected: another one is in flight");
            } else {
                debug!(reason = %e.message, "Submission rejected: form incomplete");
            }
            return Err(e);
        }
    };

    let request = guard.request();
    info!(
        client_id = request.client_id,
        items = request.items.len(),
        total = %request.total,
        payment_method = %request.payment_method,
        "Submitting sale"
    );

    let created = gateway.create_sale(request).await;
    match created {
        Ok(sale) => {
            guard.complete();
            notifications.success(NotificationCategory::Sale, SALE_SAVED);
            info!(sale_id = sale.id, total = %sale.total, "Sale submitted");
            Ok(sale)
        }
        Err(e) => {
            drop(guard);
            error!(error = %e, "Sale submission failed");
            notifications.error(NotificationCategory::Sale, SALE_FAILED);
            Err(ApiError::submission_failed(e))
        }
    }
}

/// Submits the form, then prints the new sale's control note.
pub async fn submit_and_print<B, H>(
    session: &SessionState,
    backend: &B,
    profile: &ProfileState,
    dispatcher: &PrintDispatcher<H>,
    notifications: &Notifications,
) -> ApiResult<SubmitOutcome>
where
    B: SaleGateway + CompanyProfileStore,
    H: PrintHost,
{
    let sale = submit_sale(session, backend, notifications).await?;

    let printed = async {
        let company = profile.current(backend).await?;
        let job = dispatcher.print(&compose(&sale, &company)).await?;
        Ok::<PrintJob, ApiError>(job)
    }
    .await;

    let print_job = match printed {
        Ok(job) => Some(job),
        Err(e) => {
            error!(sale_id = sale.id, error = %e, "Sale stored but printing failed");
            notifications.error(NotificationCategory::Print, PRINT_FAILED);
            None
        }
    };

    Ok(SubmitOutcome { sale, print_job })
}
