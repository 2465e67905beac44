//! Error types for Crudrex
//!
//! Provides a unified error type for all operations, plus the mapping
//! from each error onto the HTTP status the server answers with.

use std::fmt;

use thiserror::Error;

use crate::collection::Shape;

/// Result type alias using CrudrexError
pub type Result<T> = std::result::Result<T, CrudrexError>;

/// The kind of resource a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Collection,
    Item,
    Endpoint,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Collection => f.write_str("Collection"),
            Resource::Item => f.write_str("Item"),
            Resource::Endpoint => f.write_str("Endpoint"),
        }
    }
}

/// Unified error type for Crudrex operations
#[derive(Debug, Error)]
pub enum CrudrexError {
    // -------------------------------------------------------------------------
    // Lookup / Request Errors
    // -------------------------------------------------------------------------
    #[error("{0} not found")]
    NotFound(Resource),

    /// Duplicate collection name; the name is kept for logging only
    #[error("Collection already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Collection '{collection}' holds {found}, not {expected}")]
    ShapeConflict {
        collection: String,
        expected: Shape,
        found: Shape,
    },

    #[error("Method not allowed")]
    MethodNotAllowed,

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CrudrexError {
    /// Shorthand for a `BadRequest` with the given message
    pub fn bad_request(message: impl Into<String>) -> Self {
        CrudrexError::BadRequest(message.into())
    }

    pub fn shape_conflict(collection: &str, expected: Shape, found: Shape) -> Self {
        CrudrexError::ShapeConflict {
            collection: collection.to_string(),
            expected,
            found,
        }
    }

    /// HTTP status code this error is answered with
    pub fn status(&self) -> u16 {
        match self {
            CrudrexError::NotFound(_) => 404,
            // The collection endpoint has always answered duplicates with 400
            CrudrexError::AlreadyExists(_) => 400,
            CrudrexError::BadRequest(_) => 400,
            CrudrexError::ShapeConflict { .. } => 409,
            CrudrexError::MethodNotAllowed => 405,
            CrudrexError::Io(_)
            | CrudrexError::Serialization(_)
            | CrudrexError::Network(_)
            | CrudrexError::Config(_) => 500,
        }
    }

    /// True for errors caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

impl From<serde_json::Error> for CrudrexError {
    fn from(err: serde_json::Error) -> Self {
        CrudrexError::Serialization(err.to_string())
    }
}

impl From<tempfile::PersistError> for CrudrexError {
    fn from(err: tempfile::PersistError) -> Self {
        CrudrexError::Io(err.error)
    }
}
