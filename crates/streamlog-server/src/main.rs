//! streamlog server
//!
//! Main entry point for the streamlog record service.
//!
//! ## Configuration
//! All configuration is done via environment variables:
//!
//! - `STREAMLOG_ADDR`: server bind address (default: 0.0.0.0:8080)
//! - `STREAMLOG_DATA`: log directory (default: ./data/log)
//! - `STREAMLOG_MAX_STORE_BYTES`: segment store roll threshold (default: engine default)
//! - `STREAMLOG_MAX_INDEX_BYTES`: segment index roll threshold (default: engine default)
//!
//! ## Logging
//! Controlled via the `RUST_LOG` environment variable:
//! ```bash
//! RUST_LOG=debug cargo run -p streamlog-server
//! ```

use std::sync::Arc;

use streamlog_server::{create_router, AppState};
use streamlog_storage::{Log, LogConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind_addr = std::env::var("STREAMLOG_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let data_dir = std::env::var("STREAMLOG_DATA").unwrap_or_else(|_| "./data/log".to_string());

    let mut config = LogConfig::default();
    if let Ok(max_store_bytes) = std::env::var("STREAMLOG_MAX_STORE_BYTES") {
        config.segment.max_store_bytes = max_store_bytes.parse()?;
    }
    if let Ok(max_index_bytes) = std::env::var("STREAMLOG_MAX_INDEX_BYTES") {
        config.segment.max_index_bytes = max_index_bytes.parse()?;
    }

    let log = Arc::new(Log::open(&data_dir, config)?);
    let app = create_router(AppState { log });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, data_dir = %data_dir, "streamlog server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
