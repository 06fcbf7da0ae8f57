//! `EventBoard` store server -- remote record store for board clients.
//!
//! An axum WebSocket server that answers record fetches and workflow status
//! updates. Records live in memory, seeded from a JSON file or the built-in
//! demo set.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:9100 with demo records
//! cargo run --bin eventboard-store
//!
//! # Custom seed, rejecting a quarter of updates after a 500 ms delay
//! cargo run --bin eventboard-store -- --seed-file seed.json \
//!     --reject-rate 0.25 --latency-ms 500
//! ```

use std::sync::Arc;

use clap::Parser;
use eventboard_store::config::{StoreCliArgs, StoreConfig};
use eventboard_store::records::RecordTable;
use eventboard_store::server::{self, StoreState, UpdatePolicy};

#[tokio::main]
async fn main() {
    let cli = StoreCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match StoreConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let records = match config.seed_file.as_deref() {
        Some(path) => match RecordTable::from_seed_file(path) {
            Ok(table) => table,
            Err(e) => {
                tracing::error!(error = %e, "failed to load seed file");
                std::process::exit(1);
            }
        },
        None => RecordTable::new(eventboard_proto::seed::demo_records()),
    };

    tracing::info!(
        addr = %config.bind_addr,
        records = records.len().await,
        reject_rate = config.reject_rate,
        latency_ms = u64::try_from(config.latency.as_millis()).unwrap_or(u64::MAX),
        "starting eventboard store"
    );

    let policy = UpdatePolicy {
        reject_rate: config.reject_rate,
        latency: config.latency,
    };
    let state = Arc::new(StoreState::with_policy(records, policy));

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "store server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "store server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start store server");
            std::process::exit(1);
        }
    }
}
