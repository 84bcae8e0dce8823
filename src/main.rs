//! symstrip CLI entry point

use clap::Parser;
use symstrip::cli::Cli;
use symstrip::core::error::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for operator output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("SYMSTRIP_LOG"))
        .init();

    let cli = Cli::parse();

    let code = symstrip::cli::run::run(cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
