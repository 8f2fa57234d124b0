//! # Print Host
//!
//! The operating environment the dispatcher prints through.
//!
//! ## Concepts
//! ```text
//! ┌──────────────┐   register    ┌──────────────────┐
//! │   Artifact   │ ────────────► │ ArtifactRegistry │ ──► BlobHandle ("blob:<uuid>")
//! │ (PDF / HTML) │               └──────────────────┘
//! └──────┬───────┘
//!        │ show_preview / acquire_surface
//!        ▼
//! ┌──────────────┐    print      ┌──────────────────┐
//! │  SurfaceId   │ ────────────► │   PrintTrigger   │  Started | Dismissed
//! └──────┬───────┘               └──────────────────┘
//!        │ release_surface
//!        ▼
//!      (gone)
//! ```
//!
//! Host methods are synchronous and cheap: they hand work to the
//! environment (a file write, a spawned process) and return. Nothing here
//! waits for paper.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{PrintError, PrintResult};

/// Default system print command.
pub const DEFAULT_PRINT_COMMAND: &str = "lp";

/// Placeholder replaced by the spool file path in command arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

// =============================================================================
// Artifacts
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    Pdf,
    Markup,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Markup => "html",
        }
    }
}

/// A generated printable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub sale_number: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn pdf(sale_number: impl Into<String>, bytes: Vec<u8>) -> Self {
        Artifact {
            sale_number: sale_number.into(),
            kind: ArtifactKind::Pdf,
            bytes,
        }
    }

    pub fn markup(sale_number: impl Into<String>, html: String) -> Self {
        Artifact {
            sale_number: sale_number.into(),
            kind: ArtifactKind::Markup,
            bytes: html.into_bytes(),
        }
    }
}

/// Handle to an artifact held in an [`ArtifactRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobHandle(Uuid);

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:{}", self.0)
    }
}

/// Temporary binary handles, alive until revoked.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    blobs: Arc<Mutex<HashMap<BlobHandle, Arc<Artifact>>>>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, artifact: Arc<Artifact>) -> BlobHandle {
        let handle = BlobHandle(Uuid::new_v4());
        self.blobs
            .lock()
            .expect("artifact registry poisoned")
            .insert(handle, artifact);
        handle
    }

    pub fn get(&self, handle: BlobHandle) -> Option<Arc<Artifact>> {
        self.blobs
            .lock()
            .expect("artifact registry poisoned")
            .get(&handle)
            .cloned()
    }

    /// Releases a handle. Returns false if it was already gone.
    pub fn revoke(&self, handle: BlobHandle) -> bool {
        self.blobs
            .lock()
            .expect("artifact registry poisoned")
            .remove(&handle)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().expect("artifact registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Surfaces
// =============================================================================

/// A presentation surface created by a [`PrintHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        SurfaceId(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the environment reported when print was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrintTrigger {
    /// The print action is under way (dialog open or job spooled).
    Started,
    /// The operator dismissed the print action.
    Dismissed,
}

/// Trait for print environments
pub trait PrintHost: Send + Sync + 'static {
    /// Shows `artifact` on the embedded preview surface.
    fn show_preview(&self, artifact: &Artifact) -> PrintResult<SurfaceId>;

    /// Creates a detached, hidden surface loaded with `artifact`.
    fn acquire_surface(&self, artifact: &Artifact) -> PrintResult<SurfaceId>;

    /// Invokes the print action on a surface's content.
    fn print(&self, surface: SurfaceId) -> PrintResult<PrintTrigger>;

    /// Removes a surface.
    fn release_surface(&self, surface: SurfaceId) -> PrintResult<()>;
}

// =============================================================================
// Spool Host
// =============================================================================

/// Production host: surfaces are files in a spool directory, printing
/// spawns the system print command on them.
#[derive(Debug)]
pub struct SpoolPrintHost {
    spool_dir: PathBuf,
    command: String,
    args: Vec<String>,
    preview_command: Option<String>,
    surfaces: Mutex<HashMap<SurfaceId, NamedTempFile>>,
}

impl SpoolPrintHost {
    /// Host spooling into `spool_dir` (created if missing), printing with `lp`.
    pub fn new(spool_dir: impl Into<PathBuf>) -> PrintResult<Self> {
        let spool_dir = spool_dir.into();
        std::fs::create_dir_all(&spool_dir)?;

        Ok(Self {
            spool_dir,
            command: DEFAULT_PRINT_COMMAND.to_string(),
            args: Vec::new(),
            preview_command: None,
            surfaces: Mutex::new(HashMap::new()),
        })
    }

    /// Sets the print command. An argument equal to `{file}` is replaced by
    /// the spool file; without one the file is appended.
    pub fn with_command(mut self, command: impl Into<String>, args: Vec<String>) -> PrintResult<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(PrintError::InvalidConfig("Print command is empty".to_string()));
        }
        self.command = command;
        self.args = args;
        Ok(self)
    }

    /// Command that opens previews (e.g. `xdg-open`).
    pub fn with_preview_command(mut self, command: impl Into<String>) -> Self {
        self.preview_command = Some(command.into());
        self
    }

    pub fn spool_dir(&self) -> &Path {
        &self.spool_dir
    }

    /// Path of a live surface's spool file.
    pub fn surface_path(&self, surface: SurfaceId) -> Option<PathBuf> {
        self.surfaces
            .lock()
            .expect("surface table poisoned")
            .get(&surface)
            .map(|file| file.path().to_path_buf())
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.lock().expect("surface table poisoned").len()
    }

    fn command_args(&self, file: &Path) -> Vec<String> {
        let file = file.to_string_lossy().into_owned();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| if a == FILE_PLACEHOLDER { file.clone() } else { a.clone() })
            .collect();
        if !self.args.iter().any(|a| a == FILE_PLACEHOLDER) {
            args.push(file);
        }
        args
    }

    fn spool(&self, artifact: &Artifact) -> PrintResult<(SurfaceId, PathBuf)> {
        let mut file = tempfile::Builder::new()
            .prefix("aquagas-")
            .suffix(&format!(".{}", artifact.kind.extension()))
            .tempfile_in(&self.spool_dir)?;
        file.write_all(&artifact.bytes)?;
        file.flush()?;

        let id = SurfaceId::new();
        let path = file.path().to_path_buf();
        self.surfaces
            .lock()
            .expect("surface table poisoned")
            .insert(id, file);

        debug!(surface = %id, path = %path.display(), sale_number = %artifact.sale_number, "Spooled artifact");
        Ok((id, path))
    }

    fn spawn(&self, program: &str, args: &[String]) -> PrintResult<()> {
        tokio::process::Command::new(program)
            .args(args)
            .spawn()
            .map(|_child| ())
            .map_err(|e| PrintError::Command(format!("{}: {}", program, e)))
    }
}

impl PrintHost for SpoolPrintHost {
    fn show_preview(&self, artifact: &Artifact) -> PrintResult<SurfaceId> {
        let (id, path) = self.spool(artifact)?;
        if let Some(viewer) = &self.preview_command {
            let args = vec![path.to_string_lossy().into_owned()];
            if let Err(e) = self.spawn(viewer, &args) {
                let _ = self.release_surface(id);
                return Err(e);
            }
        }
        Ok(id)
    }

    fn acquire_surface(&self, artifact: &Artifact) -> PrintResult<SurfaceId> {
        self.spool(artifact).map(|(id, _)| id)
    }

    fn print(&self, surface: SurfaceId) -> PrintResult<PrintTrigger> {
        let path = self
            .surface_path(surface)
            .ok_or(PrintError::UnknownSurface(surface))?;
        let args = self.command_args(&path);

        self.spawn(&self.command, &args)?;
        info!(surface = %surface, command = %self.command, "Print job handed to spooler");
        Ok(PrintTrigger::Started)
    }

    fn release_surface(&self, surface: SurfaceId) -> PrintResult<()> {
        let file = self
            .surfaces
            .lock()
            .expect("surface table poisoned")
            .remove(&surface)
            .ok_or(PrintError::UnknownSurface(surface))?;
        file.close()?;
        debug!(surface = %surface, "Released surface");
        Ok(())
    }
}
