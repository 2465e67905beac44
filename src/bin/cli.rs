//! Crudrex CLI Client
//!
//! Command-line interface for poking at a running Crudrex server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, Method};
use serde_json::Value;

/// Crudrex CLI
#[derive(Parser, Debug)]
#[command(name = "crudrex-cli")]
#[command(about = "CLI for a Crudrex mock server")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "http://localhost:8085")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a collection, item or endpoint
    Get {
        /// Path such as `/products/` or `/users/42/orders`
        path: String,
    },

    /// Create an item or append to an endpoint
    Post {
        path: String,

        /// JSON body
        json: String,
    },

    /// Create or replace
    Put {
        path: String,

        /// JSON body
        json: String,
    },

    /// Partial update
    Patch {
        path: String,

        /// JSON body
        json: String,
    },

    /// Delete an item or endpoint
    Delete { path: String },
}

impl Commands {
    fn into_parts(self) -> (Method, String, Option<String>) {
        match self {
            Commands::Get { path } => (Method::GET, path, None),
            Commands::Post { path, json } => (Method::POST, path, Some(json)),
            Commands::Put { path, json } => (Method::PUT, path, Some(json)),
            Commands::Patch { path, json } => (Method::PATCH, path, Some(json)),
            Commands::Delete { path } => (Method::DELETE, path, None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (method, path, body) = args.command.into_parts();

    let url = format!(
        "{}/{}",
        args.server.trim_end_matches('/'),
        path.trim_start_matches('/')
    );

    let mut request = Client::new().request(method.clone(), &url);
    if let Some(body) = body {
        let body: Value = serde_json::from_str(&body).context("body is not valid JSON")?;
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("{} {} failed", method, url))?;
    let status = response.status();
    let text = response.text().await.context("failed to read response body")?;

    println!("{}", status);
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) if text.is_empty() => {}
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
