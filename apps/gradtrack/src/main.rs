//! # GradTrack - Graduation Project Allocation
//!
//! The main binary for GradTrack project allocation.
//!
//! This application provides:
//! - HTTP admin API server (axum-based)
//! - CLI interface for allocation runs and resets
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                apps/gradtrack (THE BINARY)               │
//! │                                                          │
//! │  ┌─────────────┐   ┌─────────────┐   ┌───────────────┐   │
//! │  │    CLI      │   │  HTTP API   │   │ Snapshot Store│   │
//! │  │   (clap)    │   │   (axum)    │   │  (JSON file)  │   │
//! │  └──────┬──────┘   └──────┬──────┘   └───────┬───────┘   │
//! │         └─────────────────┼──────────────────┘           │
//! │                           ▼                              │
//! │                  ┌─────────────────┐                     │
//! │                  │ gradtrack-core  │                     │
//! │                  │   (THE LOGIC)   │                     │
//! │                  └─────────────────┘                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Preview, then publish, the evening cohort's allocation
//! gradtrack allocate --cohort evening
//! gradtrack allocate --cohort evening --apply
//!
//! # Start the HTTP server
//! gradtrack --config gradtrack.toml server --port 8080
//! ```

use clap::Parser;
use gradtrack::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // GRADTRACK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GRADTRACK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gradtrack=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the GradTrack startup banner.
fn print_banner() {
    println!(
        r#"
   ____               _ _____               _
  / ___|_ __ __ _  __| |_   _| __ __ _  ___| | __
 | |  _| '__/ _` |/ _` | | || '__/ _` |/ __| |/ /
 | |_| | | | (_| | (_| | | || | | (_| | (__|   <
  \____|_|  \__,_|\__,_| |_||_|  \__,_|\___|_|\_\

  Project Allocation v{}

  Highest GPA first • One project per team • No displacement
"#,
        env!("CARGO_PKG_VERSION")
    );
}
