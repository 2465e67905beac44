//! Network Module
//!
//! HTTP transport in front of the engine.
//!
//! ## Architecture
//! - One axum fallback handler receives every request
//! - The handler resolves nothing itself: it builds a [`Request`] and
//!   hands it to [`Engine::execute`] on the blocking pool
//! - CORS is open to any origin; request bodies are size-capped
//!
//! [`Request`]: crate::protocol::Request
//! [`Engine::execute`]: crate::engine::Engine::execute

mod handler;
mod server;

pub use handler::build_router;
pub use server::{shutdown_signal, Server};
