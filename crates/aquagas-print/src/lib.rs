//! # aquagas-print: Receipt Renderer and Print Dispatcher
//!
//! Lays out the two-copy control note, turns it into a printable artifact
//! and gets it onto paper without leaking surfaces or blob handles.
//!
//! ## Modules
//! - [`layout`]: page geometry, pagination and logo placement (pure)
//! - [`pdf`]: writes a layout as PDF (printpdf, builtin Helvetica)
//! - [`markup`]: standalone printable HTML for the lightweight path
//! - [`host`]: the print environment (`PrintHost`) and the spool-directory host
//! - [`dispatch`]: preview reuse, fallback surfaces and the timed release
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aquagas_print::{PrintDispatcher, SpoolPrintHost};
//!
//! let host = Arc::new(SpoolPrintHost::new(spool_dir)?);
//! let dispatcher = PrintDispatcher::new(host);
//! let job = dispatcher.print(&aquagas_core::compose(&sale, &company)).await?;
//! ```

pub mod dispatch;
pub mod error;
pub mod host;
pub mod layout;
pub mod markup;
pub mod pdf;

pub use dispatch::{
    ArtifactFormat, DispatchState, JobId, PrintDispatcher, PrintJob, PrintPath, RELEASE_DELAY,
};
pub use error::{PrintError, PrintResult};
pub use host::{
    Artifact, ArtifactKind, ArtifactRegistry, BlobHandle, PrintHost, PrintTrigger, SpoolPrintHost,
    SurfaceId,
};
pub use layout::{layout, ReceiptLayout};
pub use markup::render_markup;
pub use pdf::render_pdf;
