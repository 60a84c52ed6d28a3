//! Error types for wsd-sync.

use std::path::PathBuf;

use thiserror::Error;

use wsd_renderer::{PostProcessError, RenderError};

/// All errors that can arise from a render cycle or diagram sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The rendering service failed or could not be reached.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The rendered bytes could not be post-processed.
    #[error("post-processing error: {0}")]
    PostProcess(#[from] PostProcessError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output path would overwrite the diagram source itself.
    #[error("output {path} would overwrite its own diagram source")]
    OutputIsSource { path: PathBuf },

    /// A cycle task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
