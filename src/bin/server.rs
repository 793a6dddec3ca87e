//! zset-server
//!
//! Serves an in-memory sorted-set store over TCP for development and tests.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use zset_client::network::Server;
use zset_client::{Config, MemStore};

/// zset-server
#[derive(Parser, Debug)]
#[command(name = "zset-server")]
#[command(about = "In-memory sorted-set server speaking the block protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Largest accepted block in MB
    #[arg(long, default_value = "16")]
    max_frame_mb: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,zset_client=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("zset-server v{}", zset_client::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_frame_size(args.max_frame_mb * 1024 * 1024)
        .try_build();
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, Arc::new(MemStore::new())) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
