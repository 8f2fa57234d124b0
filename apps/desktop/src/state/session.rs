//! # Sale Session State
//!
//! The in-progress sale form: cart, client, payment and shipping
//! selections, and the submission lock.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   editing ──(submit_enabled)──► begin_submit ──► submitting = true      │
//! │      ▲                                               │                  │
//! │      │                          ┌────────────────────┴───────┐          │
//! │      │                          ▼                            ▼          │
//! │      │                   complete_submit               abort_submit     │
//! │      │                   (form cleared)                (form intact)    │
//! │      └──────────────────────────┴────────────────────────────┘          │
//! │                                                                         │
//! │   A second begin_submit while submitting is rejected locally.           │
//! │   Dropping the SubmitGuard without completing it aborts.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition goes through the [`Observable`], so subscribers see
//! each change and can re-read `submit_enabled()`.

use aquagas_core::pricing::SaleTotals;
use aquagas_core::{
    can_submit, resolve_shipping_fee, Cart, Client, Money, NewSale, Observable, Product,
    ShippingMethod, SubscriptionId,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Everything the sale form holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleForm {
    pub cart: Cart,
    pub client: Option<Client>,
    pub payment_method: String,
    pub shipping_method: String,

    /// Fee of the selected shipping method, resolved on selection.
    pub shipping_fee: Money,

    /// True while a submission is pending.
    pub submitting: bool,
}

impl SaleForm {
    pub fn can_submit(&self) -> bool {
        can_submit(
            &self.cart,
            self.client.as_ref(),
            &self.payment_method,
            &self.shipping_method,
        )
    }

    /// What the submit button binds to.
    pub fn submit_enabled(&self) -> bool {
        self.can_submit() && !self.submitting
    }

    pub fn totals(&self) -> SaleTotals {
        SaleTotals::compute(&self.cart, self.shipping_fee)
    }

    /// Creation request from a snapshot of the current form.
    fn to_new_sale(&self) -> Option<NewSale> {
        let client = self.client.as_ref()?;
        let totals = self.totals();
        Some(NewSale {
            client_id: client.id,
            items: self.cart.snapshot(),
            payment_method: self.payment_method.clone(),
            shipping_method: self.shipping_method.clone(),
            shipping_fee: totals.shipping_fee,
            subtotal: totals.subtotal,
            total: totals.total,
        })
    }
}

/// The form as the UI renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFormView {
    #[serde(flatten)]
    pub form: SaleForm,
    pub totals: SaleTotals,
    pub submit_enabled: bool,
}

impl From<SaleForm> for SaleFormView {
    fn from(form: SaleForm) -> Self {
        SaleFormView {
            totals: form.totals(),
            submit_enabled: form.submit_enabled(),
            form,
        }
    }
}

/// Shared sale session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    form: Observable<SaleForm>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> SaleForm {
        self.form.get()
    }

    pub fn view(&self) -> SaleFormView {
        SaleFormView::from(self.form())
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SaleForm) + Send + Sync + 'static,
    {
        self.form.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.form.unsubscribe(id)
    }

    // =========================================================================
    // Form transitions
    // =========================================================================

    pub fn add_product(&self, product: &Product) -> SaleForm {
        self.form.update(|f| SaleForm {
            cart: f.cart.add_line(product),
            ..f.clone()
        })
    }

    pub fn set_quantity(&self, product_id: i64, qty: i64) -> SaleForm {
        self.form.update(|f| SaleForm {
            cart: f.cart.set_quantity(product_id, qty),
            ..f.clone()
        })
    }

    pub fn remove_line(&self, product_id: i64) -> SaleForm {
        self.form.update(|f| SaleForm {
            cart: f.cart.remove_line(product_id),
            ..f.clone()
        })
    }

    pub fn select_client(&self, client: Client) -> SaleForm {
        self.form.modify(|f| {
            f.client = Some(client);
            f.clone()
        })
    }

    pub fn clear_client(&self) -> SaleForm {
        self.form.modify(|f| {
            f.client = None;
            f.clone()
        })
    }

    pub fn select_payment_method(&self, name: impl Into<String>) -> SaleForm {
        let name = name.into();
        self.form.modify(|f| {
            f.payment_method = name;
            f.clone()
        })
    }

    /// Selects a shipping method and resolves its fee from `methods`.
    pub fn select_shipping_method(
        &self,
        name: impl Into<String>,
        methods: &[ShippingMethod],
    ) -> SaleForm {
        let name = name.into();
        let fee = resolve_shipping_fee(&name, methods);
        self.form.modify(|f| {
            f.shipping_method = name;
            f.shipping_fee = fee;
            f.clone()
        })
    }

    /// Drops the cart and every selection.
    pub fn cancel(&self) -> SaleForm {
        self.form.modify(|f| {
            let submitting = f.submitting;
            *f = SaleForm {
                submitting,
                ..SaleForm::default()
            };
            f.clone()
        })
    }

    // =========================================================================
    // Submission lock
    // =========================================================================

    /// Takes the submission lock and snapshots the form.
    ///
    /// Check and lock happen under one state update, so two concurrent
    /// callers can never both get a request. The lock is held by the
    /// returned guard and released when it is completed or dropped.
    pub fn begin_submit(&self) -> ApiResult<SubmitGuard<'_>> {
        let request = self.form.modify(|f| {
            if f.submitting {
                return Err(ApiError::in_flight());
            }
            if !f.can_submit() {
                return Err(ApiError::validation(
                    "Select a client, a payment method and a shipping method, and add at least one product",
                ));
            }
            let request = f
                .to_new_sale()
                .ok_or_else(|| ApiError::validation("No client selected"))?;
            f.submitting = true;
            Ok(request)
        })?;

        Ok(SubmitGuard {
            session: self,
            request,
            active: true,
        })
    }

    /// Sale stored: clears cart and selections, releases the lock.
    fn complete_submit(&self) {
        self.form.set(SaleForm::default());
    }

    /// Sale not stored: releases the lock, keeps the form for a retry.
    fn abort_submit(&self) {
        self.form.modify(|f| f.submitting = false);
    }
}

/// Holds the submission lock for one request.
///
/// `complete` clears the form. Dropping the guard any other way (an error
/// path, a timeout, a cancelled task) releases the lock and keeps the form.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    session: &'a SessionState,
    request: NewSale,
    active: bool,
}

impl SubmitGuard<'_> {
    /// The snapshot taken when the lock was acquired.
    pub fn request(&self) -> &NewSale {
        &self.request
    }

    /// Marks the sale as stored.
    pub fn complete(mut self) {
        self.active = false;
        self.session.complete_submit();
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.session.abort_submit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn product(id: i64, name: &str, cents: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            price: Money::from_cents(cents),
            category: "agua".to_string(),
        }
    }

    fn client() -> Client {
        Client {
            id: 1,
            name: "Maria Silva".to_string(),
            phone: None,
            address: None,
        }
    }

    fn methods() -> Vec<ShippingMethod> {
        vec![
            ShippingMethod {
                id: 1,
                name: "Retirada".to_string(),
                fee: Money::zero(),
            },
            ShippingMethod {
                id: 2,
                name: "Entrega".to_string(),
                fee: Money::from_cents(500),
            },
        ]
    }

    fn ready_session() -> SessionState {
        let session = SessionState::new();
        let water = product(1, "Água Mineral 20L", 1800);
        session.add_product(&water);
        session.add_product(&water);
        session.add_product(&product(2, "Gás GLP P13", 6000));
        session.select_client(client());
        session.select_payment_method("PIX");
        session.select_shipping_method("Entrega", &methods());
        session
    }

    #[test]
    fn test_totals() {
        let totals = ready_session().form().totals();
        assert_eq!(totals.subtotal, Money::from_cents(9600));
        assert_eq!(totals.shipping_fee, Money::from_cents(500));
        assert_eq!(totals.total, Money::from_cents(10100));
    }

    #[test]
    fn test_gate_needs_payment_method() {
        let session = ready_session();
        session.select_payment_method("");

        let form = session.form();
        assert!(!form.cart.is_empty());
        assert!(form.client.is_some());
        assert!(!form.can_submit());
        assert!(!form.submit_enabled());
    }

    #[test]
    fn test_begin_submit_locks() {
        let session = ready_session();
        let guard = session.begin_submit().unwrap();

        let request = guard.request();
        assert_eq!(request.client_id, 1);
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.total, Money::from_cents(10100));
        assert!(session.form().submitting);
        assert!(!session.form().submit_enabled());

        let err = session.begin_submit().unwrap_err();
        assert_eq!(err, ApiError::in_flight());
    }

    #[test]
    fn test_request_is_detached_from_cart() {
        let session = ready_session();
        let guard = session.begin_submit().unwrap();
        session.set_quantity(1, 10);

        assert_eq!(guard.request().items[0].qty, 2);
        assert_eq!(guard.request().subtotal, Money::from_cents(9600));
    }

    #[test]
    fn test_complete_clears_everything() {
        let session = ready_session();
        session.begin_submit().unwrap().complete();

        assert_eq!(session.form(), SaleForm::default());
    }

    #[test]
    fn test_dropped_guard_keeps_form() {
        let session = ready_session();
        let before = session.form();
        let guard = session.begin_submit().unwrap();
        drop(guard);

        assert_eq!(session.form(), before);
        assert!(session.form().submit_enabled());
        assert!(session.begin_submit().is_ok());
    }

    #[test]
    fn test_not_ready_is_validation_error() {
        let session = SessionState::new();
        let err = session.begin_submit().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert!(!session.form().submitting);
    }

    #[test]
    fn test_unknown_shipping_method_has_zero_fee() {
        let session = ready_session();
        session.select_shipping_method("Drone", &methods());
        assert_eq!(session.form().shipping_fee, Money::zero());
    }

    #[test]
    fn test_every_transition_notifies() {
        let session = SessionState::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        session.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.add_product(&product(1, "Água Mineral 20L", 1800));
        session.set_quantity(1, 3);
        session.select_client(client());
        session.clear_client();
        session.remove_line(1);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_view_flattens_form() {
        let view = ready_session().view();
        assert!(view.submit_enabled);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["paymentMethod"], "PIX");
        assert_eq!(json["submitEnabled"], true);
        assert!(json["totals"]["total"].is_number());
    }
}
