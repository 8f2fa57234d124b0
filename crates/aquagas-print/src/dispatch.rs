//! # Print Dispatcher
//!
//! Turns a [`ReceiptDocument`] into paper through a [`PrintHost`].
//!
//! ## State Machine
//! ```text
//!   Idle ──► Generating ──► Presenting ──► Printing ──┐
//!                                    └───► Cancelled ─┴──► released
//!                                                (after 10s, untracked)
//! ```
//!
//! ## Paths
//! - **Preview**: the document is already shown in the live preview. The
//!   preview surface is printed as is; nothing is generated and the
//!   surface stays with the preview.
//! - **Fallback**: a fresh artifact is generated, loaded into a temporary
//!   surface and printed. The surface and its blob handle are released by
//!   a detached task after [`RELEASE_DELAY`], whatever the print outcome.
//!   The host gives no reliable completion signal, so the release is timed.
//!
//! No call waits for the print to finish.
//!
//! The job table only holds jobs that still own something. A preview job
//! leaves it as soon as the print is triggered, a fallback job when its
//! surface is released, so `job_state` returns `None` for both afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aquagas_core::{compose_blank, CompanyProfile, ReceiptDocument};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{PrintError, PrintResult};
use crate::host::{Artifact, ArtifactRegistry, BlobHandle, PrintHost, PrintTrigger, SurfaceId};
use crate::markup::render_markup;
use crate::pdf::render_pdf;

/// Lifetime of temporary surfaces and blob handles.
pub const RELEASE_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactFormat {
    #[default]
    Pdf,
    Markup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchState {
    Idle,
    Generating,
    Presenting,
    Printing,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct JobId(Uuid);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrintPath {
    Preview,
    Fallback,
}

/// Snapshot of a dispatched job, taken when `print` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: JobId,
    pub path: PrintPath,
    pub state: DispatchState,
    pub surface: SurfaceId,
}

#[derive(Debug)]
struct LivePreview {
    sale_number: String,
    surface: SurfaceId,
    handle: BlobHandle,
}

type JobTable = Arc<Mutex<HashMap<JobId, DispatchState>>>;

/// Owns every surface and blob handle it creates.
pub struct PrintDispatcher<H: PrintHost> {
    host: Arc<H>,
    registry: ArtifactRegistry,
    preview: Mutex<Option<LivePreview>>,
    jobs: JobTable,
    format: ArtifactFormat,
    generated: AtomicUsize,
}

impl<H: PrintHost> PrintDispatcher<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            registry: ArtifactRegistry::new(),
            preview: Mutex::new(None),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            format: ArtifactFormat::default(),
            generated: AtomicUsize::new(0),
        }
    }

    pub fn with_format(mut self, format: ArtifactFormat) -> Self {
        self.format = format;
        self
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// Artifacts generated since creation.
    pub fn artifacts_generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }

    pub fn job_state(&self, id: JobId) -> Option<DispatchState> {
        self.jobs.lock().expect("job table poisoned").get(&id).copied()
    }

    /// Jobs whose temporary surface is not released yet.
    pub fn active_jobs(&self) -> usize {
        self.jobs.lock().expect("job table poisoned").len()
    }

    /// Sale number of the document in the live preview.
    pub fn preview_sale_number(&self) -> Option<String> {
        self.preview
            .lock()
            .expect("preview slot poisoned")
            .as_ref()
            .map(|p| p.sale_number.clone())
    }

    fn track(&self, id: JobId, state: DispatchState) {
        self.jobs.lock().expect("job table poisoned").insert(id, state);
    }

    /// Updates a tracked job. A job already released stays gone.
    fn set_state(&self, id: JobId, state: DispatchState) {
        if let Some(current) = self.jobs.lock().expect("job table poisoned").get_mut(&id) {
            *current = state;
        }
    }

    fn forget_job(&self, id: JobId) {
        self.jobs.lock().expect("job table poisoned").remove(&id);
    }

    // =========================================================================
    // Generation
    // =========================================================================

    async fn generate(&self, document: &ReceiptDocument) -> PrintResult<Artifact> {
        let sale_number = document.sale_number().to_string();
        let artifact = match self.format {
            ArtifactFormat::Pdf => {
                let document = document.clone();
                let bytes = tokio::task::spawn_blocking(move || render_pdf(&document))
                    .await
                    .map_err(|e| PrintError::Task(e.to_string()))??;
                Artifact::pdf(sale_number, bytes)
            }
            ArtifactFormat::Markup => Artifact::markup(sale_number, render_markup(document)),
        };

        self.generated.fetch_add(1, Ordering::SeqCst);
        debug!(
            sale_number = %artifact.sale_number,
            kind = ?artifact.kind,
            bytes = artifact.bytes.len(),
            "Generated artifact"
        );
        Ok(artifact)
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Shows `document` in the preview, replacing whatever was there.
    pub async fn open_preview(&self, document: &ReceiptDocument) -> PrintResult<SurfaceId> {
        let artifact = Arc::new(self.generate(document).await?);
        let handle = self.registry.register(Arc::clone(&artifact));

        let surface = match self.host.show_preview(&artifact) {
            Ok(surface) => surface,
            Err(e) => {
                self.registry.revoke(handle);
                return Err(e);
            }
        };

        let previous = self
            .preview
            .lock()
            .expect("preview slot poisoned")
            .replace(LivePreview {
                sale_number: artifact.sale_number.clone(),
                surface,
                handle,
            });
        if let Some(previous) = previous {
            self.release_preview(previous);
        }

        info!(sale_number = %artifact.sale_number, surface = %surface, "Preview opened");
        Ok(surface)
    }

    /// Closes the preview. Returns false if none was open.
    pub fn close_preview(&self) -> bool {
        let current = self.preview.lock().expect("preview slot poisoned").take();
        match current {
            Some(preview) => {
                self.release_preview(preview);
                true
            }
            None => false,
        }
    }

    fn release_preview(&self, preview: LivePreview) {
        if let Err(e) = self.host.release_surface(preview.surface) {
            warn!(surface = %preview.surface, error = %e, "Failed to release preview surface");
        }
        self.registry.revoke(preview.handle);
        debug!(sale_number = %preview.sale_number, "Preview closed");
    }

    // =========================================================================
    // Printing
    // =========================================================================

    /// Prints `document`, reusing the live preview when it shows the same sale.
    pub async fn print(&self, document: &ReceiptDocument) -> PrintResult<PrintJob> {
        let live = self
            .preview
            .lock()
            .expect("preview slot poisoned")
            .as_ref()
            .filter(|p| p.sale_number == document.sale_number())
            .map(|p| p.surface);

        match live {
            Some(surface) => self.print_preview(surface, document.sale_number()),
            None => self.print_fallback(document).await,
        }
    }

    /// Prints an unfilled form for `company`.
    pub async fn print_blank(&self, company: &CompanyProfile) -> PrintResult<PrintJob> {
        self.print_fallback(&compose_blank(company)).await
    }

    fn print_preview(&self, surface: SurfaceId, sale_number: &str) -> PrintResult<PrintJob> {
        let id = JobId(Uuid::new_v4());
        self.track(id, DispatchState::Presenting);

        // The surface belongs to the preview, so the job ends here either way.
        let printed = self.host.print(surface);
        self.forget_job(id);
        let state = trigger_state(printed?);

        info!(job = %id, sale_number = %sale_number, surface = %surface, "Printed from preview");
        Ok(PrintJob {
            id,
            path: PrintPath::Preview,
            state,
            surface,
        })
    }

    async fn print_fallback(&self, document: &ReceiptDocument) -> PrintResult<PrintJob> {
        let id = JobId(Uuid::new_v4());
        self.track(id, DispatchState::Generating);

        let artifact = match self.generate(document).await {
            Ok(artifact) => Arc::new(artifact),
            Err(e) => {
                self.forget_job(id);
                return Err(e);
            }
        };
        let handle = self.registry.register(Arc::clone(&artifact));

        let surface = match self.host.acquire_surface(&artifact) {
            Ok(surface) => surface,
            Err(e) => {
                self.registry.revoke(handle);
                self.forget_job(id);
                return Err(e);
            }
        };
        self.set_state(id, DispatchState::Presenting);
        debug!(job = %id, surface = %surface, blob = %handle, "Temporary surface acquired");

        // From here on the surface exists, so its release is scheduled
        // before anything else can fail.
        self.schedule_release(id, surface, handle);

        let state = match self.host.print(surface) {
            Ok(trigger) => trigger_state(trigger),
            Err(e) => {
                self.set_state(id, DispatchState::Cancelled);
                return Err(e);
            }
        };
        self.set_state(id, state);

        info!(job = %id, sale_number = %artifact.sale_number, state = ?state, "Print dispatched");
        Ok(PrintJob {
            id,
            path: PrintPath::Fallback,
            state,
            surface,
        })
    }

    fn schedule_release(&self, id: JobId, surface: SurfaceId, handle: BlobHandle) {
        let host = Arc::clone(&self.host);
        let registry = self.registry.clone();
        let jobs = Arc::clone(&self.jobs);
        let deadline = tokio::time::Instant::now() + RELEASE_DELAY;

        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            if let Err(e) = host.release_surface(surface) {
                warn!(job = %id, surface = %surface, error = %e, "Failed to release surface");
            }
            registry.revoke(handle);
            jobs.lock().expect("job table poisoned").remove(&id);

            debug!(job = %id, surface = %surface, "Temporary surface released");
        });
    }
}

fn trigger_state(trigger: PrintTrigger) -> DispatchState {
    match trigger {
        PrintTrigger::Started => DispatchState::Printing,
        PrintTrigger::Dismissed => DispatchState::Cancelled,
    }
}
