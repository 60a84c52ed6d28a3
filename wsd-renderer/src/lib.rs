//! # wsd-renderer
//!
//! Remote rendering of sequence diagrams and post-processing of the returned
//! images.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wsd_core::{RenderRequest, Style};
//! use wsd_renderer::{ClientConfig, DiagramRenderClient, PostProcess, PostProcessor, RenderClient};
//!
//! async fn render(text: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
//!     let client = DiagramRenderClient::new(ClientConfig::default())?;
//!     let raw = client.render(&RenderRequest::new(text, Style::Rose, "png")).await?;
//!     Ok(PostProcess::for_format("png").process(&raw)?)
//! }
//! ```

pub mod client;
pub mod error;
pub mod postprocess;

pub use client::{ClientConfig, DiagramRenderClient, RenderClient};
pub use error::{PostProcessError, RenderError, Stage};
pub use postprocess::{ClipFooter, Passthrough, PostProcess, PostProcessor, FOOTER_HEIGHT};
