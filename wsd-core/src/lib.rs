//! wsd-core — diagram domain types and `#style` directive lookup.
//!
//! - [`types`] — [`Style`], [`DiagramSource`], [`RenderRequest`]
//! - [`style`] — [`resolve_style`]
//! - [`error`] — [`ParseStyleError`]

pub mod error;
pub mod style;
pub mod types;

pub use error::ParseStyleError;
pub use style::resolve_style;
pub use types::{DiagramSource, RenderRequest, Style};
