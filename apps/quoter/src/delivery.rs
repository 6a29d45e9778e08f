//! # Artifact Delivery
//!
//! Where finished bytes go: a file in the output directory, or the system
//! clipboard. Both are traits so the platform mechanics stay outside the
//! quote actions.
//!
//! ```text
//!   Artifact ──► ArtifactSink::save ──► <output dir>/Factura_VT-..._Ana.pdf
//!            └─► Clipboard::copy_image ──✗──► ArtifactSink::save (fallback)
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

/// Delivery errors
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No clipboard on this platform or session.
    #[error("Clipboard not available")]
    ClipboardUnavailable,

    #[error("Clipboard write failed: {0}")]
    ClipboardFailed(String),
}

pub type DeliveryResult<T> = Result<T, DeliveryError>;

// =============================================================================
// Artifact
// =============================================================================

/// A rendered file ready to hand over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Artifact {
            filename: filename.into(),
            media_type: "application/pdf",
            bytes,
        }
    }

    pub fn png(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Artifact {
            filename: filename.into(),
            media_type: "image/png",
            bytes,
        }
    }
}

// =============================================================================
// Seams
// =============================================================================

/// Persists an artifact and returns where it ended up.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn save(&self, artifact: &Artifact) -> DeliveryResult<PathBuf>;
}

/// Places an image on the system clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn copy_image(&self, artifact: &Artifact) -> DeliveryResult<()>;
}

// =============================================================================
// File Sink
// =============================================================================

/// Writes artifacts into one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn save(&self, artifact: &Artifact) -> DeliveryResult<PathBuf> {
        // Only the last component; the name never escapes the directory
        let name = Path::new(&artifact.filename).file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid artifact name: {:?}", artifact.filename),
            )
        })?;

        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        fs::write(&path, &artifact.bytes).await?;

        info!(path = %path.display(), bytes = artifact.bytes.len(), "Artifact saved");
        Ok(path)
    }
}

// =============================================================================
// Headless Clipboard
// =============================================================================

/// Clipboard for sessions without one. Every copy fails, so actions fall
/// back to saving the file.
///
/// This is the only [`Clipboard`] the crate ships. Writing images to a real
/// system clipboard is left to the embedding shell, which passes its own
/// implementation to [`QuoteService::with_clipboard`](crate::QuoteService::with_clipboard).
/// The `vt-quoter` binary uses this type, so its copy action always ends in
/// the save fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClipboard;

#[async_trait]
impl Clipboard for UnavailableClipboard {
    async fn copy_image(&self, artifact: &Artifact) -> DeliveryResult<()> {
        debug!(filename = %artifact.filename, "No clipboard in this session");
        Err(DeliveryError::ClipboardUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_sink_writes_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("quotes"));

        let path = sink
            .save(&Artifact::pdf("Factura_VT-1_Ana.pdf", b"%PDF-1.4".to_vec()))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("quotes").join("Factura_VT-1_Ana.pdf"));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_file_sink_strips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        let path = sink
            .save(&Artifact::png("../escape.png", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("escape.png"));
    }

    #[tokio::test]
    async fn test_unavailable_clipboard_fails() {
        let result = UnavailableClipboard
            .copy_image(&Artifact::png("a.png", Vec::new()))
            .await;
        assert!(matches!(result, Err(DeliveryError::ClipboardUnavailable)));
    }
}
