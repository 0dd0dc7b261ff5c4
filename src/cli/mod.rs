//! CLI module for postdir
//!
//! Provides command-line interface for:
//! - init: Write a default configuration file
//! - serve: Load configuration and serve the post API

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
