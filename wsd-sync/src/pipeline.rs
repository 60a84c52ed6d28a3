//! Render orchestration: one diagram in, one or many synced images out.
//!
//! A diagram with a `#style` directive is rendered once, to
//! `<stem>.<format>`. A diagram without one is rendered in every
//! [`Style`], to `<stem>.<Style>.<format>`, with all cycles running
//! concurrently.
//!
//! ## Failure policy
//!
//! - Explicit style: a failed cycle fails the whole diagram.
//! - Fan-out: each cycle fails on its own. Siblings still finish and write
//!   their files; failures are recorded in the [`DiagramReport`].
//! - A diagram whose output path is the source file itself (`flow.png` with a
//!   `#style` line) is rejected before anything is rendered.
//!
//! ## Shared outputs
//!
//! Distinct sources can map to the same output (`a.wsd` and `a.WSD`, or
//! `a.wsd` fanning out to `a.Rose.png` next to an explicit `a.Rose.wsd`).
//! [`Orchestrator::render_all`] runs such diagrams one after another, in input
//! order, so the last one wins and the writer never races itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::oneshot;
use wsd_core::{resolve_style, DiagramSource, RenderRequest, Style};
use wsd_renderer::{PostProcessor, RenderClient};

use crate::error::{io_err, SyncError};
use crate::writer::{sync_if_changed, SyncOutcome};

// ---------------------------------------------------------------------------
// Options and reports
// ---------------------------------------------------------------------------

/// Per-run settings shared by every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Output format token sent to the service and used as file extension.
    pub format: String,
    pub dry_run: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            dry_run: false,
        }
    }
}

/// How a diagram was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Explicit(Style),
    FanOut,
}

/// Result of one render → post-process → sync cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub style: Style,
    pub path: PathBuf,
    pub result: Result<SyncOutcome, SyncError>,
}

/// Everything that happened to one diagram.
#[derive(Debug)]
pub struct DiagramReport {
    pub source: PathBuf,
    pub mode: RenderMode,
    pub cycles: Vec<CycleReport>,
}

impl DiagramReport {
    /// True if any successful cycle changed (or would change) its file.
    pub fn changed(&self) -> bool {
        self.cycles
            .iter()
            .any(|c| c.result.as_ref().is_ok_and(SyncOutcome::is_changed))
    }

    pub fn failures(&self) -> impl Iterator<Item = &CycleReport> {
        self.cycles.iter().filter(|c| c.result.is_err())
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

// ---------------------------------------------------------------------------
// Output paths
// ---------------------------------------------------------------------------

/// Where the image for `source` goes.
///
/// `fan_out_style` is `Some` in fan-out mode, where the style name is inserted
/// before the format extension.
pub fn output_path(source: &Path, fan_out_style: Option<Style>, format: &str) -> PathBuf {
    match fan_out_style {
        Some(style) => source.with_extension(format!("{}.{format}", style.name())),
        None => source.with_extension(format),
    }
}

/// Key shared by every diagram whose outputs could collide with `source`'s.
///
/// Output names all begin with the source file name up to its first `.`, so
/// that prefix plus the directory, lowercased for case-insensitive file
/// systems, covers every collision. Over-grouping only costs concurrency.
fn output_group(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let prefix = name.split('.').next().unwrap_or_default();
    let parent = source
        .parent()
        .map(|p| p.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    PathBuf::from(parent).join(prefix)
}

fn is_same_file_name(a: &Path, b: &Path) -> bool {
    a.as_os_str().eq_ignore_ascii_case(b.as_os_str())
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives render cycles for diagrams.
///
/// Cloning is cheap; clones share the client and post-processor.
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn RenderClient>,
    post: Arc<dyn PostProcessor>,
    options: Arc<RenderOptions>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn RenderClient>,
        post: Arc<dyn PostProcessor>,
        options: RenderOptions,
    ) -> Self {
        Self {
            client,
            post,
            options: Arc::new(options),
        }
    }

    /// Render and sync a single diagram file.
    ///
    /// Returns `Err` only when the source cannot be read or an explicit-style
    /// cycle fails; fan-out failures are carried in the report.
    pub async fn render_diagram(&self, path: &Path) -> Result<DiagramReport, SyncError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| io_err(path, e))?;
        self.render_source(DiagramSource::new(path, text)).await
    }

    /// Render and sync an already loaded diagram.
    pub async fn render_source(&self, source: DiagramSource) -> Result<DiagramReport, SyncError> {
        let style = resolve_style(source.lines());
        self.refuse_overwriting_source(source.path(), style)?;
        match style {
            Some(style) => self.render_explicit(source, style).await,
            None => Ok(self.render_fan_out(source).await),
        }
    }

    fn refuse_overwriting_source(
        &self,
        source: &Path,
        style: Option<Style>,
    ) -> Result<(), SyncError> {
        let format = &self.options.format;
        let outputs: Vec<PathBuf> = match style {
            Some(_) => vec![output_path(source, None, format)],
            None => Style::ALL
                .iter()
                .map(|&s| output_path(source, Some(s), format))
                .collect(),
        };
        match outputs.into_iter().find(|out| is_same_file_name(out, source)) {
            Some(path) => Err(SyncError::OutputIsSource { path }),
            None => Ok(()),
        }
    }

    async fn render_explicit(
        &self,
        source: DiagramSource,
        style: Style,
    ) -> Result<DiagramReport, SyncError> {
        let path = output_path(source.path(), None, &self.options.format);
        tracing::debug!("{}: explicit style {style}", source.path().display());

        let outcome = self.cycle(source.text(), style, &path).await?;
        Ok(DiagramReport {
            source: source.path().to_path_buf(),
            mode: RenderMode::Explicit(style),
            cycles: vec![CycleReport {
                style,
                path,
                result: Ok(outcome),
            }],
        })
    }

    async fn render_fan_out(&self, source: DiagramSource) -> DiagramReport {
        tracing::debug!(
            "{}: no style directive, rendering {} styles",
            source.path().display(),
            Style::ALL.len()
        );
        let text: Arc<str> = Arc::from(source.text());

        let handles: Vec<_> = Style::ALL
            .iter()
            .map(|&style| {
                let path = output_path(source.path(), Some(style), &self.options.format);
                let this = self.clone();
                let text = Arc::clone(&text);
                let task_path = path.clone();
                let handle =
                    tokio::spawn(async move { this.cycle(&text, style, &task_path).await });
                (style, path, handle)
            })
            .collect();

        let mut cycles = Vec::with_capacity(handles.len());
        for (style, path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join) => Err(SyncError::Join(join)),
            };
            if let Err(err) = &result {
                tracing::warn!("{}: style {style} failed: {err}", source.path().display());
            }
            cycles.push(CycleReport {
                style,
                path,
                result,
            });
        }

        DiagramReport {
            source: source.path().to_path_buf(),
            mode: RenderMode::FanOut,
            cycles,
        }
    }

    /// One render → post-process → sync cycle.
    async fn cycle(&self, text: &str, style: Style, path: &Path) -> Result<SyncOutcome, SyncError> {
        let request = RenderRequest::new(text, style, self.options.format.clone());
        let raw = self.client.render(&request).await?;

        let post = Arc::clone(&self.post);
        let processed = tokio::task::spawn_blocking(move || post.process(&raw)).await??;

        sync_if_changed(path, &processed, self.options.dry_run).await
    }

    /// Render every diagram concurrently and wait for all of them.
    ///
    /// Diagrams that could write the same output file run one after another
    /// in input order; everything else runs in parallel. Results come back in
    /// the order of `paths`.
    pub async fn render_all(
        &self,
        paths: Vec<PathBuf>,
    ) -> Vec<(PathBuf, Result<DiagramReport, SyncError>)> {
        let mut previous: HashMap<PathBuf, oneshot::Receiver<()>> = HashMap::new();

        let handles: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let (done, next) = oneshot::channel();
                let wait = previous.insert(output_group(&path), next);
                let this = self.clone();
                let task_path = path.clone();
                let handle = tokio::spawn(async move {
                    if let Some(wait) = wait {
                        // Err means the earlier task died; its turn is over either way.
                        let _ = wait.await;
                    }
                    let result = this.render_diagram(&task_path).await;
                    let _ = done.send(());
                    result
                });
                (path, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join) => Err(SyncError::Join(join)),
            };
            results.push((path, result));
        }
        results
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("docs/login.wsd"), None, "png"),
            PathBuf::from("docs/login.png")
        );
    }

    #[test]
    fn fan_out_path_inserts_style_name() {
        assert_eq!(
            output_path(Path::new("docs/login.wsd"), Some(Style::ModernBlue), "png"),
            PathBuf::from("docs/login.ModernBlue.png")
        );
        assert_eq!(
            output_path(Path::new("login"), Some(Style::Default), "svg"),
            PathBuf::from("login.Default.svg")
        );
    }

    #[test]
    fn fan_out_paths_are_disjoint() {
        let paths: std::collections::HashSet<_> = Style::ALL
            .iter()
            .map(|s| output_path(Path::new("a.wsd"), Some(*s), "png"))
            .collect();
        assert_eq!(paths.len(), Style::ALL.len());
    }

    #[test]
    fn colliding_sources_share_an_output_group() {
        let group = output_group(Path::new("docs/a.wsd"));
        assert_eq!(output_group(Path::new("docs/a.WSD")), group);
        assert_eq!(output_group(Path::new("docs/a.Rose.wsd")), group);
        assert_eq!(output_group(Path::new("docs/A.png")), group);
        assert_ne!(output_group(Path::new("docs/ab.wsd")), group);
        assert_ne!(output_group(Path::new("other/a.wsd")), group);
    }

    #[test]
    fn output_group_matches_every_output_of_its_source() {
        let source = Path::new("docs/login.flow.wsd");
        let group = output_group(source);
        assert_eq!(output_group(&output_path(source, None, "png")), group);
        for style in Style::ALL {
            assert_eq!(output_group(&output_path(source, Some(*style), "png")), group);
        }
    }

    #[test]
    fn default_options_render_png() {
        let options = RenderOptions::default();
        assert_eq!(options.format, "png");
        assert!(!options.dry_run);
    }
}
