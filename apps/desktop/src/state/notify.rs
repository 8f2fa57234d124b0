//! # Notifications
//!
//! Transient, dismissible messages for the operator, held in an
//! [`Observable`] list the UI subscribes to.
//!
//! Submission, print and settings failures get their own category so the
//! UI can tell "the sale was not saved" apart from "the sale was saved but
//! did not print".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use aquagas_core::{Observable, SubscriptionId};
use serde::Serialize;

pub const SALE_SAVED: &str = "Venda realizada com sucesso!";
pub const SALE_FAILED: &str = "Erro ao salvar venda.";
pub const PRINT_FAILED: &str = "Erro ao gerar arquivo de impressão.";
pub const BLANK_FORM_FAILED: &str = "Erro ao gerar nota branca";
pub const SETTINGS_SAVED: &str = "Configurações salvas!";
pub const SETTINGS_FAILED: &str = "Erro ao salvar configurações.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    Sale,
    Print,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub message: String,
}

/// Queue of pending notifications.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    list: Observable<Vec<Notification>>,
    next_id: Arc<AtomicU64>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &self,
        kind: NotificationKind,
        category: NotificationCategory,
        message: impl Into<String>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let notification = Notification {
            id,
            kind,
            category,
            message: message.into(),
        };
        self.list.modify(|list| list.push(notification));
        id
    }

    pub fn success(&self, category: NotificationCategory, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, category, message)
    }

    pub fn error(&self, category: NotificationCategory, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, category, message)
    }

    /// Removes one notification. Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        self.list.modify(|list| {
            let before = list.len();
            list.retain(|n| n.id != id);
            list.len() != before
        })
    }

    pub fn list(&self) -> Vec<Notification> {
        self.list.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Vec<Notification>) + Send + Sync + 'static,
    {
        self.list.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.list.unsubscribe(id)
    }
}
