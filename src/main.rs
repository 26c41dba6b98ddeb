//! mvc-dispatch
//!
//! Hosts the dispatch engine behind an Axum/Tokio HTTP server.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                    STARTUP (once)                     │
//!                   │                                                      │
//!   config file ───▶│  catalog ──▶ registry ──▶ injector ──▶ route table   │
//!                   │                                         │            │
//!                   │                            seal ApplicationContext   │
//!                   └─────────────────────────────────────────┬────────────┘
//!                                                             │ Arc
//!                   ┌─────────────────────────────────────────▼────────────┐
//!   Client Request  │  http server ──▶ dispatcher ──▶ handler method       │
//!   ───────────────▶│  (request id,    (normalize,    (bound arguments)    │
//!   ◀───────────────│   timeout)        lookup, 404/500)                   │
//!   Client Response │                                                      │
//!                   │  admin API (optional)   metrics (optional)           │
//!                   └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use mvc_dispatch::config::loader::{read_config, ConfigError};
use mvc_dispatch::config::validation::validate_config;
use mvc_dispatch::lifecycle::{signals, startup};
use mvc_dispatch::observability::{logging, metrics};
use mvc_dispatch::{demo, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "mvc-dispatch")]
#[command(about = "Minimal web dispatch engine", long_about = None)]
struct Args {
    /// Configuration file (TOML or .properties).
    #[arg(short, long, default_value = "dispatch.toml")]
    config: PathBuf,

    /// Overrides `scanPackage` from the configuration file.
    #[arg(long)]
    scan_package: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    demo::link();

    let mut config = read_config(&args.config)?;
    if let Some(scan_package) = args.scan_package {
        config.scan_package = scan_package;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("mvc-dispatch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %args.config.display(),
        scan_package = %config.scan_package,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Initialize metrics server
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Build and seal the application context before accepting traffic
    let context = startup::initialize(&config)?;
    metrics::record_startup(context.report());
    for issue in &context.report().issues {
        tracing::warn!(issue = %issue, "Startup completed with issue");
    }

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(context));
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::shutdown_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
