//! Route table
//!
//! Static `(method, path)` → [`Route`] resolution. Rules are tried top to
//! bottom; the first match wins.
//!
//! ```text
//! OPTIONS  *                         Preflight
//! GET      /  |  /api/info           Info
//! GET|POST /collections[/]           list / create collection
//! GET|POST /<c>/                     list (filtered) / create item
//! *        /<c>/<id>                 flat item verbs
//! *        /<...>/<item-id>          nested item verbs (opt-in, not POST)
//! *        /<...>                    nested endpoint verbs
//! ```

use super::Method;

/// Engine operation a request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Info,

    // Collection management
    ListCollections,
    CreateCollection,

    // Flat collection store
    ListItems { collection: String },
    CreateItem { collection: String },
    GetItem { collection: String, id: String },
    PutItem { collection: String, id: String },
    ReplaceItem { collection: String, id: String },
    MergeItem { collection: String, id: String },
    DeleteItem { collection: String, id: String },

    // Nested endpoint store; `path` is the slash-joined segment list
    ReadEndpoint { path: String },
    AppendEndpoint { path: String },
    ReplaceEndpoint { path: String },
    MergeEndpoint { path: String },
    RemoveEndpoint { path: String },

    // Item-level nested operations; `path` addresses the parent endpoint
    GetEndpointItem { path: String, id: String },
    PutEndpointItem { path: String, id: String },
    PatchEndpointItem { path: String, id: String },
    DeleteEndpointItem { path: String, id: String },

    Unsupported,
}

const COLLECTIONS_SEGMENT: &str = "collections";

impl Route {
    /// Resolve a request line into a route
    pub fn resolve(method: &Method, path: &str, item_routes: bool) -> Route {
        if *method == Method::Options {
            return Route::Preflight;
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let trailing_slash = path.len() > 1 && path.ends_with('/');

        match (method, segments.as_slice()) {
            (Method::Get, []) => return Route::Info,
            (Method::Get, ["api", "info"]) if !trailing_slash => return Route::Info,
            (Method::Get, [COLLECTIONS_SEGMENT]) => return Route::ListCollections,
            (Method::Post, [COLLECTIONS_SEGMENT]) => return Route::CreateCollection,
            _ => {}
        }

        if let [collection] = segments.as_slice() {
            if trailing_slash {
                let collection = collection.to_string();
                match method {
                    Method::Get => return Route::ListItems { collection },
                    Method::Post => return Route::CreateItem { collection },
                    _ => {}
                }
            }
        }

        if let [collection, id] = segments.as_slice() {
            if !trailing_slash {
                let (collection, id) = (collection.to_string(), id.to_string());
                match method {
                    Method::Get => return Route::GetItem { collection, id },
                    Method::Post => return Route::PutItem { collection, id },
                    Method::Put => return Route::ReplaceItem { collection, id },
                    Method::Patch => return Route::MergeItem { collection, id },
                    Method::Delete => return Route::DeleteItem { collection, id },
                    _ => {}
                }
            }
        }

        if item_routes && segments.len() >= 2 {
            if let Some((last, parent)) = segments.split_last() {
                if looks_like_item_id(last) {
                    let (path, id) = (parent.join("/"), last.to_string());
                    match method {
                        Method::Get => return Route::GetEndpointItem { path, id },
                        Method::Put => return Route::PutEndpointItem { path, id },
                        Method::Patch => return Route::PatchEndpointItem { path, id },
                        Method::Delete => return Route::DeleteEndpointItem { path, id },
                        _ => {}
                    }
                }
            }
        }

        let path = segments.join("/");
        match method {
            Method::Get => Route::ReadEndpoint { path },
            Method::Post => Route::AppendEndpoint { path },
            Method::Put => Route::ReplaceEndpoint { path },
            Method::Patch => Route::MergeEndpoint { path },
            Method::Delete => Route::RemoveEndpoint { path },
            _ => Route::Unsupported,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Route::Preflight => "preflight",
            Route::Info => "info",
            Route::ListCollections => "list_collections",
            Route::CreateCollection => "create_collection",
            Route::ListItems { .. } => "list_items",
            Route::CreateItem { .. } => "create_item",
            Route::GetItem { .. } => "get_item",
            Route::PutItem { .. } => "put_item",
            Route::ReplaceItem { .. } => "replace_item",
            Route::MergeItem { .. } => "merge_item",
            Route::DeleteItem { .. } => "delete_item",
            Route::ReadEndpoint { .. } => "read_endpoint",
            Route::AppendEndpoint { .. } => "append_endpoint",
            Route::ReplaceEndpoint { .. } => "replace_endpoint",
            Route::MergeEndpoint { .. } => "merge_endpoint",
            Route::RemoveEndpoint { .. } => "remove_endpoint",
            Route::GetEndpointItem { .. } => "get_endpoint_item",
            Route::PutEndpointItem { .. } => "put_endpoint_item",
            Route::PatchEndpointItem { .. } => "patch_endpoint_item",
            Route::DeleteEndpointItem { .. } => "delete_endpoint_item",
            Route::Unsupported => "unsupported",
        }
    }
}

/// All digits, or a UUID-like token (8+ chars containing `-`)
pub fn looks_like_item_id(segment: &str) -> bool {
    let numeric = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
    let uuid_like = segment.len() >= 8 && segment.contains('-');
    numeric || uuid_like
}
