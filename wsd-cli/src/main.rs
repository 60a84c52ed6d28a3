//! autowsd — render `.wsd` sequence diagrams through websequencediagrams.com.
//!
//! # Usage
//!
//! ```text
//! autowsd [-r] [PATH] [--format png] [--endpoint URL] [--raw] [--dry-run]
//! ```
//!
//! A diagram with a `#style <name>` line is rendered once to `<stem>.png`;
//! one without is rendered in every style to `<stem>.<Style>.png`.
//! Files are only rewritten when their bytes change.

mod discover;
mod render;

use anyhow::{Context, Result};
use clap::Parser;

use render::RenderArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "autowsd",
    version,
    about = "Render sequence diagrams and keep the images in sync",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    render: RenderArgs,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    runtime.block_on(cli.render.run())
}
