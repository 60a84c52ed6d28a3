//! Byte-compare-then-replace writer.
//!
//! ## `sync_if_changed` protocol
//!
//! 1. Read the current target, if any.
//! 2. Compare byte-for-byte with the new content → skip if identical.
//! 3. Write to `<path>.autowsd.tmp`.
//! 4. Rename over the final path (atomic on POSIX).
//!
//! A crash between 3 and 4 leaves the `.tmp` file behind and the target
//! untouched; readers never see a truncated image.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Sync outcome
// ---------------------------------------------------------------------------

/// Outcome of syncing one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — bytes on disk already match.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl SyncOutcome {
    /// Whether the file on disk differs (or would differ) from before.
    pub fn is_changed(&self) -> bool {
        !matches!(self, SyncOutcome::Unchanged { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            SyncOutcome::Written { path }
            | SyncOutcome::Unchanged { path }
            | SyncOutcome::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// sync_if_changed
// ---------------------------------------------------------------------------

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.autowsd.tmp", path.display()))
}

/// Write `content` to `path` unless the file already holds exactly these bytes.
///
/// Concurrent calls for the same `path` race; callers keep paths disjoint.
pub async fn sync_if_changed(
    path: &Path,
    content: &[u8],
    dry_run: bool,
) -> Result<SyncOutcome, SyncError> {
    let existing = match fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(io_err(path, e)),
    };

    if existing.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(SyncOutcome::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(SyncOutcome::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_err(parent, e))?;
    }

    let tmp = tmp_path(path);
    fs::write(&tmp, content).await.map_err(|e| io_err(&tmp, e))?;
    publish(&tmp, path).await?;

    if existing.is_some() {
        tracing::info!("updated: {}", path.display());
    } else {
        tracing::info!("created: {}", path.display());
    }
    Ok(SyncOutcome::Written {
        path: path.to_path_buf(),
    })
}

/// Rename `tmp` over `path`, removing `tmp` if the rename fails.
async fn publish(tmp: &Path, path: &Path) -> Result<(), SyncError> {
    if let Err(e) = fs::rename(tmp, path).await {
        let _ = fs::remove_file(tmp).await;
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
