//! `autowsd [-r] [PATH]` — render every diagram under PATH.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use wsd_renderer::client::{DEFAULT_BASE_URL, DEFAULT_SUBMIT_PATH};
use wsd_renderer::{ClientConfig, DiagramRenderClient, PostProcess};
use wsd_sync::{DiagramReport, Orchestrator, RenderMode, RenderOptions, SyncError, SyncOutcome};

use crate::discover::discover;

/// Arguments for a render run.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Diagram file or directory to scan (defaults to the current directory).
    pub path: Option<PathBuf>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Output format requested from the service and used as file extension.
    #[arg(long, default_value = "png")]
    pub format: String,

    /// Base URL of the rendering service.
    #[arg(long, env = "AUTOWSD_ENDPOINT", default_value = DEFAULT_BASE_URL)]
    pub endpoint: String,

    /// Path of the submit endpoint, relative to `--endpoint`.
    #[arg(long, default_value = DEFAULT_SUBMIT_PATH)]
    pub submit_path: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "AUTOWSD_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write images exactly as the service returns them.
    #[arg(long)]
    pub raw: bool,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Extension of diagram files picked up from directories.
    #[arg(long, default_value = "wsd")]
    pub extension: String,
}

impl RenderArgs {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.endpoint.clone(),
            submit_path: self.submit_path.clone(),
            timeout: self.timeout.map(Duration::from_secs),
        }
    }

    fn orchestrator(&self) -> Result<Orchestrator> {
        let client = DiagramRenderClient::new(self.client_config())
            .context("cannot set up rendering client")?;
        let post = if self.raw {
            PostProcess::none()
        } else {
            PostProcess::for_format(&self.format)
        };
        let options = RenderOptions {
            format: self.format.clone(),
            dry_run: self.dry_run,
        };
        Ok(Orchestrator::new(Arc::new(client), post, options))
    }

    pub async fn run(self) -> Result<()> {
        let root = match &self.path {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let diagrams = discover(&root, self.recursive, &self.extension)?;
        if diagrams.is_empty() {
            println!("No .{} files found in {}", self.extension, root.display());
            return Ok(());
        }
        tracing::debug!("rendering {} diagram(s)", diagrams.len());

        let orchestrator = self.orchestrator()?;
        let results = orchestrator.render_all(diagrams).await;

        let mut failed = 0;
        for (path, result) in &results {
            match result {
                Ok(report) => {
                    print_report(report, self.dry_run);
                    if !report.is_complete() {
                        failed += 1;
                    }
                }
                Err(err) => {
                    print_failure(path, err);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} diagram(s) failed", results.len());
        }
        Ok(())
    }
}

fn print_failure(path: &std::path::Path, err: &SyncError) {
    println!("✗ '{}' — {err}", path.display());
}

fn print_report(report: &DiagramReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = report
        .cycles
        .iter()
        .filter(|c| c.result.as_ref().is_ok_and(SyncOutcome::is_changed))
        .count();
    let unchanged = report
        .cycles
        .iter()
        .filter(|c| matches!(c.result, Ok(SyncOutcome::Unchanged { .. })))
        .count();
    let failed = report.failures().count();
    let mode = match report.mode {
        RenderMode::Explicit(style) => style.to_string(),
        RenderMode::FanOut => "all styles".to_string(),
    };

    let mark = if failed == 0 { "✓" } else { "✗" };
    println!(
        "{prefix}{mark} '{}' [{mode}] ({written} written, {unchanged} unchanged, {failed} failed)",
        report.source.display()
    );

    for cycle in &report.cycles {
        match &cycle.result {
            Ok(outcome) => {
                let marker = match outcome {
                    SyncOutcome::Written { .. } => "✎",
                    SyncOutcome::WouldWrite { .. } => "~",
                    SyncOutcome::Unchanged { .. } => "·",
                };
                println!("  {marker}  {}", outcome.path().display());
            }
            Err(err) => println!("  ✗  {} ({}): {err}", cycle.path.display(), cycle.style),
        }
    }
}
