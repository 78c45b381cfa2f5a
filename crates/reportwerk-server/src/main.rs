// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reportwerk — image + CSV + metadata to PDF report service.
//
// Entry point. Initialises logging, loads configuration, and runs the HTTP
// server until Ctrl-C.

mod config;
mod http;
mod ingest;
mod server;

use reportwerk_core::error::{ReportError, Result};
use tracing::{error, info};

use config::ServerConfig;
use server::ReportServer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Reportwerk starting");

    if let Err(err) = run().await {
        error!(error = %err, "Reportwerk exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = ServerConfig::load()?;
    let mut server = ReportServer::new(config);
    let addr = server.start().await?;
    info!(%addr, route = server::GENERATE_PATH, "Reportwerk ready");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ReportError::Server(format!("listen for Ctrl-C: {e}")))?;

    info!(addr = ?server.local_addr(), "Shutdown requested");
    server.stop().await
}
