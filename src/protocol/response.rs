//! Response definitions
//!
//! Status code plus JSON body, as returned by the engine.

use serde_json::{json, Value};

use crate::error::CrudrexError;

/// A response to send to the client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// JSON body (`None` for bodiless answers such as preflight)
    pub body: Option<Value>,
}

impl Response {
    /// 200 with a body
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    /// 201 with a body
    pub fn created(body: Value) -> Self {
        Self {
            status: 201,
            body: Some(body),
        }
    }

    /// 200 without a body
    pub fn empty() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    /// `{"error": message}` with the given status
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Some(json!({ "error": message })),
        }
    }

    pub fn from_error(err: &CrudrexError) -> Self {
        Self::error(err.status(), &err.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
