//! Playdeck - headless driver for the playback session controller.
//!
//! Lists and resolves catalog tracks, and runs scripted sessions against a
//! simulated media element.

use clap::Parser;
use playdeck::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("playdeck=info".parse()?))
        .init();

    cli::run_command(&args)
}
