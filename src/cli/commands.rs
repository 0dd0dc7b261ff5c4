//! CLI command implementations

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http_server::{HttpServer, HttpServerConfig};
use crate::kv::MemoryStore;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::posts::{DirectoryConfig, PostService};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory document key and retry budget
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Bind address and CORS
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Minimum log severity: trace, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            http: HttpServerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.directory
            .validate()
            .map_err(|e| CliError::config_error(format!("Invalid directory config: {}", e)))?;

        self.http
            .validate()
            .map_err(|e| CliError::config_error(format!("Invalid http config: {}", e)))?;

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(CliError::config_error)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config } => serve(&config),
    }
}

/// Write a default configuration file to `config_path`.
///
/// Refuses to overwrite an existing file.
pub fn init(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::already_initialized(config_path.display()));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(&Config::default())?;
    fs::write(config_path, content)?;

    println!("Wrote default configuration to {}", config_path.display());
    Ok(())
}

/// Build the server described by `config` over a fresh in-memory store
fn build_server(config: &Config) -> CliResult<HttpServer> {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(PostService::new(store, config.directory.clone()));
    HttpServer::with_service(config.http.clone(), service).map_err(CliError::config_error)
}

/// Load configuration and serve HTTP until the listener fails
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("directory_key", config.directory.directory_key.as_str()),
            ("max_retries", config.directory.max_retries.to_string().as_str()),
            ("path", config_path.display().to_string().as_str()),
        ],
    );

    let server = build_server(&config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}
