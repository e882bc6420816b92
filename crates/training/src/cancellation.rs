// In crates/training/src/cancellation.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A one-way abort signal shared by every worker of a run.
///
/// Clones observe the same flag. Once cancelled, a token stays cancelled.
///
/// A token created with [`CancellationToken::with_marker`] is also visible
/// across processes: cancelling it creates the marker file, and a marker file
/// created by another process (see [`request_abort`]) cancels it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    marker: Option<PathBuf>,
}

impl CancellationToken {
    /// An in-process token.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token backed by an abort-marker file.
    ///
    /// A marker left behind by an earlier run is removed so it cannot abort
    /// the new one.
    pub fn with_marker(marker: impl Into<PathBuf>) -> Self {
        let marker = marker.into();
        match fs::remove_file(&marker) {
            Ok(()) => tracing::info!(path = %marker.display(), "Removed stale abort marker."),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %marker.display(), error = %e, "Could not remove stale abort marker."),
        }
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                marker: Some(marker),
            }),
        }
    }

    /// Signals every holder of this token to stop.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::warn!("Cancellation requested. Workers will stop after their current sample.");
        if let Some(marker) = &self.inner.marker {
            if let Err(e) = request_abort(marker) {
                tracing::warn!(path = %marker.display(), error = %e, "Could not write abort marker.");
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Relaxed) {
            return true;
        }
        match &self.inner.marker {
            Some(marker) if marker.exists() => {
                self.inner.cancelled.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }

    pub fn marker_path(&self) -> Option<&Path> {
        self.inner.marker.as_deref()
    }
}

/// Asks a training run in another process to stop by creating its abort marker.
pub fn request_abort(marker: &Path) -> std::io::Result<()> {
    if let Some(parent) = marker.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(marker, b"abort\n")
}
