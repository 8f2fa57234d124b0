//! # State Module
//!
//! Manages application state for the desktop app, as separate focused
//! types rather than one `AppState`: each command takes only what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ SessionState │  │ ProfileState │  │Notifications │  │ Dispatcher │  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │ Observable<  │  │ RwLock<      │  │ Observable<  │  │ preview,   │  │
//! │  │  SaleForm>   │  │  Option<     │  │  Vec<        │  │ jobs,      │  │
//! │  │              │  │  Profile>>   │  │  Notif>>     │  │ blobs      │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: check-and-lock under one mutex for submissions        │
//! │  • ProfileState: read-mostly, saves replace the whole value            │
//! │  • Notifications: append/dismiss under the observable's mutex          │
//! │  • PrintDispatcher: owns surfaces; release tasks hold their own Arcs   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod notify;
mod profile;
mod session;

pub use notify::{
    Notification, NotificationCategory, NotificationKind, Notifications, BLANK_FORM_FAILED,
    PRINT_FAILED, SALE_FAILED, SALE_SAVED, SETTINGS_FAILED, SETTINGS_SAVED,
};
pub use profile::ProfileState;
pub use session::{SaleForm, SaleFormView, SessionState, SubmitGuard};
