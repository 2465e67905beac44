//! Crudrex Server Binary
//!
//! Starts the HTTP mock server.

use std::sync::Arc;

use clap::Parser;
use crudrex::network::Server;
use crudrex::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// Crudrex Server
#[derive(Parser, Debug)]
#[command(name = "crudrex-server")]
#[command(about = "Mock JSON server with schema-less collections and nested endpoints")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8085")]
    port: u16,

    /// Data directory (one JSON file per collection)
    #[arg(short, long, default_value = "data")]
    data_dir: String,

    /// Host to bind
    #[arg(short = 'H', long, default_value = "localhost")]
    host: String,

    /// Address single items of nested endpoints by id-looking trailing segments
    #[arg(long)]
    item_routes: bool,

    /// Maximum request body size in MB
    #[arg(long, default_value = "16")]
    max_body_mb: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,crudrex=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Crudrex Server v{}", crudrex::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}:{}", args.host, args.port);

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .host(&args.host)
        .port(args.port)
        .max_body_bytes(args.max_body_mb * 1024 * 1024)
        .item_routes(args.item_routes)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(collections = engine.collection_count(), "Engine initialized successfully");

    let server = Server::new(config, engine);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
