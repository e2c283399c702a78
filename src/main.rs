//! Player Router
//!
//! Single public entry point fanning requests out to per-player services.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────┐
//!                              │                  PLAYER ROUTER                    │
//!                              │                                                   │
//!     Client Request           │  ┌─────────┐    ┌─────────┐    ┌──────────────┐  │
//!     ─────────────────────────┼─▶│   net   │───▶│  http   │───▶│   routing    │  │
//!                              │  │listener │    │ server  │    │   resolver   │  │
//!                              │  └─────────┘    └─────────┘    └──────┬───────┘  │
//!                              │                                       │           │
//!                              │                                       ▼           │
//!     Client Response          │  ┌─────────┐                   ┌──────────────┐  │
//!     ◀────────────────────────┼──│response │◀──────────────────│  forwarder   │◀─┼──── Player
//!                              │  │  relay  │                   │ retry+redir  │  │     Backend
//!                              │  └─────────┘                   └──────────────┘  │
//!                              │                                                   │
//!                              │  ┌─────────────────────────────────────────────┐ │
//!                              │  │ config │ observability │ lifecycle (signals) │ │
//!                              │  └─────────────────────────────────────────────┘ │
//!                              └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use player_router::config::load_or_default;
use player_router::lifecycle::{startup, Lifecycle, EXIT_CODE};
use player_router::observability::init_logging;

#[derive(Parser)]
#[command(name = "player-router")]
#[command(about = "Routes /<player id>/... to the matching player backend", long_about = None)]
struct Cli {
    /// Optional TOML config; built-in defaults apply to anything it omits.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("player-router: {e}");
            return ExitCode::from(EXIT_CODE as u8);
        }
    };

    init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        service_prefix = %config.backends.service_prefix,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    let lifecycle = Lifecycle::install();
    startup::run(config, lifecycle).await
}
