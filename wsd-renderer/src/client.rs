//! Two-call client for the websequencediagrams.com rendering API.
//!
//! ## Protocol
//!
//! 1. `POST <base>/index.php` with a form body
//!    `style=<wire>&apiVersion=1&format=<fmt>&message=<url-encoded text>`.
//! 2. The service answers `{"img": "?png=mscKTO107", "errors": []}`.
//! 3. `GET <base>/?png=mscKTO107` returns the image bytes.
//!
//! The handle is only valid for the fetch that immediately follows, so it is
//! never stored. Neither call is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use wsd_core::RenderRequest;

use crate::error::{RenderError, Stage};

pub const DEFAULT_BASE_URL: &str = "http://www.websequencediagrams.com";
pub const DEFAULT_SUBMIT_PATH: &str = "index.php";
pub const API_VERSION: &str = "1";

/// Anything that can turn a [`RenderRequest`] into raw image bytes.
#[async_trait]
pub trait RenderClient: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where the rendering service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host, optionally with a path prefix. No trailing slash needed.
    pub base_url: String,
    pub submit_path: String,
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn submit_url(&self) -> String {
        format!(
            "{}/{}",
            self.base(),
            self.submit_path.trim_start_matches('/')
        )
    }

    /// URL of the image named by a handle returned from the submit call.
    pub fn image_url(&self, handle: &str) -> String {
        format!("{}/{}", self.base(), handle.trim_start_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Form body for the submit call. Field order matches what the service expects.
pub fn submit_body(request: &RenderRequest) -> String {
    format!(
        "style={}&apiVersion={}&format={}&message={}",
        request.style.wire_name(),
        API_VERSION,
        urlencoding::encode(&request.format),
        urlencoding::encode(&request.text),
    )
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    img: Option<String>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

fn describe_errors(errors: &[serde_json::Value]) -> String {
    errors
        .iter()
        .map(|e| match e {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Extract the image handle from a submit response body.
pub fn parse_handle(body: &[u8]) -> Result<String, RenderError> {
    let response: SubmitResponse = serde_json::from_slice(body).map_err(|e| {
        RenderError::protocol(
            Stage::Submit,
            format!(
                "malformed response ({e}): {}",
                String::from_utf8_lossy(body)
            ),
        )
    })?;

    match response.img {
        Some(handle) if !handle.trim().is_empty() => {
            if !response.errors.is_empty() {
                tracing::warn!(
                    "rendering service reported errors: {}",
                    describe_errors(&response.errors)
                );
            }
            Ok(handle)
        }
        _ if !response.errors.is_empty() => Err(RenderError::protocol(
            Stage::Submit,
            format!(
                "no image reference; service errors: {}",
                describe_errors(&response.errors)
            ),
        )),
        _ => Err(RenderError::protocol(
            Stage::Submit,
            "response has no image reference",
        )),
    }
}

// ---------------------------------------------------------------------------
// DiagramRenderClient
// ---------------------------------------------------------------------------

/// [`RenderClient`] backed by the HTTP rendering service.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DiagramRenderClient {
    http: Client,
    config: ClientConfig,
}

impl DiagramRenderClient {
    /// Build a client with its own connection pool.
    ///
    /// hyper never sends `Expect: 100-continue` on its own, which the service
    /// rejects with 417, so no extra header handling is needed.
    pub fn new(config: ClientConfig) -> Result<Self, RenderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(RenderError::Build)?;
        Ok(Self { http, config })
    }

    async fn submit(&self, request: &RenderRequest) -> Result<String, RenderError> {
        let url = self.config.submit_url();
        tracing::debug!("submitting {} diagram to {url}", request.style.wire_name());

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(submit_body(request))
            .send()
            .await
            .map_err(RenderError::unavailable(Stage::Submit))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::protocol(
                Stage::Submit,
                format!("unexpected HTTP status {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(RenderError::unavailable(Stage::Submit))?;
        parse_handle(&body)
    }

    async fn fetch(&self, handle: &str) -> Result<Vec<u8>, RenderError> {
        let url = self.config.image_url(handle);
        tracing::debug!("fetching rendered image from {url}");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(RenderError::unavailable(Stage::Fetch))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::protocol(
                Stage::Fetch,
                format!("unexpected HTTP status {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(RenderError::unavailable(Stage::Fetch))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl RenderClient for DiagramRenderClient {
    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        let handle = self.submit(request).await?;
        self.fetch(&handle).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
