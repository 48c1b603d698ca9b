//! # BizBooks Command Line Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bizbooks <command> [--config FILE] [--pretty]                          │
//! │                                                                         │
//! │  stdout ◄── command result as JSON                                      │
//! │  stderr ◄── logs, and {"code": ..., "message": ...} on failure          │
//! │  exit 1 ◄── any failure                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use serde::Serialize;

use bizbooks_cli::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    bizbooks_cli::init_tracing();

    let pretty = cli.pretty;
    match bizbooks_cli::run(cli).await {
        Ok(value) => println!("{}", render(&value, pretty)),
        Err(err) => {
            eprintln!("{}", render(&err, pretty));
            std::process::exit(1);
        }
    }
}

fn render<T: Serialize>(value: &T, pretty: bool) -> String {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.unwrap_or_else(|e| format!("{{\"code\":\"INTERNAL\",\"message\":\"{}\"}}", e))
}
