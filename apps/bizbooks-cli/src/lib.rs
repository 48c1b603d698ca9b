//! # BizBooks CLI Library
//!
//! Host shell for the BizBooks database: configuration, storage selection
//! and the commands behind the `bizbooks` binary.
//!
//! ## Module Organization
//! ```text
//! bizbooks_cli/
//! ├── lib.rs          ◄─── You are here (run & logging)
//! ├── cli.rs          ◄─── clap command line
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── bizbooks.toml + BIZBOOKS_* overrides
//! │   └── db.rs       ◄─── Lifecycle controller wrapper
//! ├── commands/       ◄─── One module per command group
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Run Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Load AppConfig ── defaults, then bizbooks.toml, then environment    │
//! │                                                                         │
//! │  2. Pick host dialogs from the command (--to / --from)                  │
//! │                                                                         │
//! │  3. DbState::open                                                       │
//! │     • native file or object store, per storage.backend                  │
//! │     • stored database loaded, or a fresh one created                    │
//! │     • a fresh one imports the legacy dump when configured               │
//! │                                                                         │
//! │  4. Execute the command, return its JSON                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::ApiError;
use state::{AppConfig, DbState};

/// Runs one invocation and returns the command's JSON output.
pub async fn run(cli: Cli) -> Result<Value, ApiError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    debug!(?config, "Configuration loaded");

    let dialogs = commands::dialogs_for(&cli.command);
    let db = DbState::open(&config, dialogs).await?;

    let result = commands::execute(cli.command, &db, &config).await;
    db.controller().shutdown().await;
    info!(ok = result.is_ok(), "Command finished");
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout carries only the JSON result.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bizbooks=trace` - Show trace for bizbooks crates only
/// - Default: INFO, with debug for bizbooks
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bizbooks=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
