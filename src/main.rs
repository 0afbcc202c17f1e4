//! API gateway
//!
//! # Architecture Overview
//!
//! ```text
//! Client ──▶ http server (axum) ──▶ route table snapshot
//!                                     │
//!                                     ├──▶ introspection (/health, /routes)
//!                                     │
//!                                     └──▶ auth gate ──▶ target resolver ──▶ proxy executor
//!                                                       (static / registry)   (hyper client)
//!                                                                                  │
//! Client ◀── streamed body (deadline, hop-by-hop headers stripped) ◀──── Backend ◀─┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_gateway::config::schema::LogFormat;
use api_gateway::lifecycle::{startup, StartupOptions};

#[derive(Debug, Parser)]
#[command(name = "api-gateway", version, about = "HTTP API gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "gateway.toml")]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,

    /// Log output format (pretty or json). Overrides the config file.
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        verbose: cli.verbose,
        log_format: cli.log_format,
    })
    .await?;

    Ok(())
}
