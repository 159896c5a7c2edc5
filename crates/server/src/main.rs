// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod cli;
mod routes;

#[cfg(test)]
mod tests;

use clap::Parser;
use shiftbook_api::{PayrollConfig, ShiftService};
use shiftbook_persistence::Persistence;
use shiftbook_replication::{
    CacheInvalidation, CsvMirror, InMemoryMirror, Mirror, PullTask, ReplicationConfig,
    ReplicationWorker, SharedPersistence,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::Args;
use crate::routes::{AppState, build_router};

/// Resolves once Ctrl-C is received, then cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl-C");
            shutdown.cancelled().await;
        }
    }
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Shiftbook Server");

    let payroll: PayrollConfig = args.payroll_config();
    let replication: ReplicationConfig = args.replication_config();

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    }
    .with_bonus_rate(payroll.bonus_rate);
    let shared: SharedPersistence = Arc::new(Mutex::new(persistence));

    let mirror: Arc<dyn Mirror> = if let Some(dir) = &args.mirror_dir {
        info!(dir = %dir.display(), "Replicating to CSV mirror");
        Arc::new(CsvMirror::new(dir)?)
    } else {
        warn!("No mirror directory given; replicating to an in-memory mirror");
        Arc::new(InMemoryMirror::new())
    };

    let service: ShiftService = ShiftService::new(Arc::clone(&shared), &payroll)?;
    info!(timezone = %payroll.timezone, bonus_rate = %payroll.bonus_rate, "Payroll configured");

    // Replication runs until shutdown is cancelled
    let shutdown: CancellationToken = CancellationToken::new();
    let worker: ReplicationWorker = ReplicationWorker::new(
        Arc::clone(&shared),
        Arc::clone(&mirror),
        replication,
        shutdown.clone(),
    );
    let caches: Vec<Arc<dyn CacheInvalidation>> = vec![service.cache()];
    let pull: PullTask = PullTask::new(shared, mirror, caches, replication, shutdown.clone());
    let worker_handle = tokio::spawn(worker.run());
    let pull_handle = tokio::spawn(pull.run());

    // Build router
    let app = build_router(AppState { service });

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Err(e) = worker_handle.await {
        error!(error = %e, "Replication worker ended abnormally");
    }
    if let Err(e) = pull_handle.await {
        error!(error = %e, "Pull task ended abnormally");
    }
    info!("Shiftbook Server stopped");

    Ok(())
}
