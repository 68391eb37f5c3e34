//! Command-line interface for playdeck.
//!
//! This module provides CLI commands for inspecting the track catalog and
//! driving a headless playback session without a browser.

mod commands;

pub use commands::{Cli, Commands, SimStep, run_command};
