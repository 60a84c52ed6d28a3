//! Error types for wsd-core.

use thiserror::Error;

/// A style name that does not map onto [`crate::Style`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown style '{name}'")]
pub struct ParseStyleError {
    pub name: String,
}
