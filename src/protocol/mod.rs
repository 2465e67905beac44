//! Protocol Module
//!
//! The dispatch boundary between the HTTP transport and the engine.
//!
//! ## Flow
//! ```text
//! HTTP request ──► Request {method, path, query, body}
//!                      │
//!                      ▼  Route::resolve (static table)
//!                   Route ──► Engine ──► Response {status, body}
//! ```
//!
//! ### Status Codes
//! - 200: read / replace / merge / delete succeeded
//! - 201: create / append succeeded
//! - 400: missing body or field, invalid path or JSON
//! - 404: collection, item or endpoint not found
//! - 405: verb not supported
//! - 409: collection accessed through the wrong access style
//! - 500: mirror I/O failure

mod request;
mod response;
mod route;

pub use request::{Method, Request};
pub use response::Response;
pub use route::{looks_like_item_id, Route};
