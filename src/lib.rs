//! # Crudrex
//!
//! A mock JSON document server for front-end development and testing:
//! - Schema-less collections of records addressed as `/<collection>/<id>`
//! - Arbitrarily nested endpoints (`/shop/orders/42/lines`) with no setup
//! - Every mutation mirrored to one JSON file per collection
//! - State reloaded from those files on startup
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │               (axum, CORS open, body cap)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Request {method, path, query, body}
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Route Table                               │
//! │        (info / collections / flat / item / nested)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │            (one RwLock over the catalog)                     │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │   Flat Store    │                │  Nested Store   │
//!   │  id → record    │                │  key → items    │
//!   └────────┬────────┘                └────────┬────────┘
//!            └───────────────┬──────────────────┘
//!                            ▼
//!                   ┌─────────────────┐
//!                   │     Mirror      │
//!                   │ <data>/<c>.json │
//!                   └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod collection;
pub mod storage;
pub mod protocol;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CrudrexError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Crudrex
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
