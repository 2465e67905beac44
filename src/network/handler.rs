//! Request Handler
//!
//! Converts between HTTP and the engine's request/response types.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{self, StatusCode, Uri};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::{Json, Router};
use percent_encoding::percent_decode_str;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::engine::Engine;
use crate::protocol::{Method, Request, Response};

/// Build the router serving every path through the engine
pub fn build_router(engine: Arc<Engine>, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
            http::Method::OPTIONS,
        ]);

    Router::new()
        .fallback(dispatch)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(engine)
}

async fn dispatch(
    State(engine): State<Arc<Engine>>,
    method: http::Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> HttpResponse {
    let body = match Request::parse_body(&body) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("{} {}: {}", method, uri.path(), e);
            return into_http(Response::from_error(&e));
        }
    };

    let request = Request {
        method: Method::parse(method.as_str()),
        path: decode_path(uri.path()),
        query,
        body,
    };

    // Engine calls hold a blocking lock and write files
    let response = match tokio::task::spawn_blocking(move || engine.execute(request)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Request task failed: {}", e);
            Response::error(500, "Internal server error")
        }
    };

    into_http(response)
}

/// Percent-decode a request path; invalid UTF-8 is replaced, not rejected
fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

fn into_http(response: Response) -> HttpResponse {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match response.body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    }
}
