//! # wsd-sync
//!
//! Byte-gated atomic writer and render orchestration.
//!
//! Build an [`Orchestrator`] from a render client and a post-processor, then
//! call [`Orchestrator::render_diagram`] for a single `.wsd` file or
//! [`Orchestrator::render_all`] for many.

pub mod error;
pub mod pipeline;
pub mod writer;

pub use error::SyncError;
pub use pipeline::{
    output_path, CycleReport, DiagramReport, Orchestrator, RenderMode, RenderOptions,
};
pub use writer::{sync_if_changed, SyncOutcome};
