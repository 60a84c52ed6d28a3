//! Error types for wsd-renderer.

use std::fmt;

use thiserror::Error;

/// Which half of the two-call protocol failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submit,
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Submit => write!(f, "submit"),
            Stage::Fetch => write!(f, "fetch"),
        }
    }
}

/// All errors that can arise from talking to the rendering service.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The service answered, but not with something we can use.
    #[error("rendering service {stage} failed: {message}")]
    Protocol { stage: Stage, message: String },

    /// The service could not be reached or the body could not be read.
    #[error("rendering service unavailable during {stage}: {source}")]
    Unavailable {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client itself could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl RenderError {
    pub(crate) fn protocol(stage: Stage, message: impl Into<String>) -> Self {
        RenderError::Protocol {
            stage,
            message: message.into(),
        }
    }

    pub(crate) fn unavailable(stage: Stage) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| RenderError::Unavailable { stage, source }
    }
}

/// Errors from image post-processing.
#[derive(Debug, Error)]
pub enum PostProcessError {
    #[error("cannot decode rendered image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("cannot encode processed image: {0}")]
    Encode(#[source] image::ImageError),
}
