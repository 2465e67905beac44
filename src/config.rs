//! Configuration for Crudrex
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a Crudrex server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the persistence mirror
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── products.json    (one file per collection)
    ///     └── users.json
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Host to bind the HTTP listener on
    pub host: String,

    /// Port to bind the HTTP listener on
    pub port: u16,

    /// Largest request body accepted (in bytes)
    pub max_body_bytes: usize,

    // -------------------------------------------------------------------------
    // Routing Configuration
    // -------------------------------------------------------------------------
    /// Treat id-looking trailing segments of nested paths as item addresses
    /// (`GET /users/42/orders/1234` reads one item of `users-42-orders`)
    pub item_routes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            host: "localhost".to_string(),
            port: 8085,
            max_body_bytes: 16 * 1024 * 1024, // 16 MB
            item_routes: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` string the server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root of the persistence mirror)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the listen host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the listen port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the maximum request body size (in bytes)
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Enable or disable item-level nested routes
    pub fn item_routes(mut self, enabled: bool) -> Self {
        self.config.item_routes = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
