//! `jsonl` command-line binary.

use anyhow::Result;
use jsonl_cli::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Diagnostics go to stderr so stdout stays valid JSONL.
    // Example: RUST_LOG=jsonl=debug jsonl cat events.jsonl
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jsonl=warn,jsonl_cli=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting jsonl CLI");

    let cli = Cli::parse_args();
    cli.execute()?;

    tracing::debug!("jsonl CLI completed successfully");
    Ok(())
}
