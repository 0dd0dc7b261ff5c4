//! CLI argument definitions using clap
//!
//! Commands:
//! - postdir init --config <path>
//! - postdir serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// postdir - short text posts with a recency-ordered directory
#[derive(Parser, Debug)]
#[command(name = "postdir")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./postdir.json")]
        config: PathBuf,
    },

    /// Serve the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./postdir.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_config() {
        let cli = Cli::try_parse_from(["postdir", "serve", "--config", "/tmp/p.json"]).unwrap();
        match cli.command {
            Command::Serve { config } => assert_eq!(config, PathBuf::from("/tmp/p.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_default_path() {
        let cli = Cli::try_parse_from(["postdir", "init"]).unwrap();
        match cli.command {
            Command::Init { config } => assert_eq!(config, PathBuf::from("./postdir.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
