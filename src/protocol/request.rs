//! Request definitions
//!
//! A transport-independent request handed to the engine.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::collection::is_blank;
use crate::error::{CrudrexError, Result};

/// HTTP verbs the route table knows about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Other(String),
}

impl Method {
    pub fn parse(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Other(other) => other,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,

    /// URL path, leading slash included (`/products/`)
    pub path: String,

    /// Query parameters, used as equality filters on flat listings
    pub query: HashMap<String, String>,

    /// Parsed JSON body, if one was sent
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Parse a raw body; whitespace-only bodies count as absent
    pub fn parse_body(bytes: &[u8]) -> Result<Option<Value>> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| CrudrexError::bad_request(format!("Invalid JSON body: {}", e)))
    }

    /// Take the body of a verb that requires one
    pub fn take_body(&mut self) -> Result<Value> {
        match self.body.take() {
            Some(body) if !is_blank(&body) => Ok(body),
            _ => Err(CrudrexError::bad_request("JSON data required")),
        }
    }
}
