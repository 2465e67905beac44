//! Engine Module
//!
//! The document-store engine that owns every collection.
//!
//! ## Responsibilities
//! - Load the persistence mirror on startup
//! - Resolve requests through the route table and run the operation
//! - Lazily create collections and endpoints on first write
//! - Mirror every mutation to disk before answering
//!
//! The flat collection store lives in `flat.rs`, the nested endpoint
//! store in `nested.rs`; both are `impl Engine` blocks over the same
//! catalog.

mod flat;
mod nested;

use std::path::Path;

use parking_lot::RwLock;
use serde_json::{json, Map, Value};

use crate::collection::{is_blank, Catalog, Collection};
use crate::config::Config;
use crate::error::{CrudrexError, Result};
use crate::protocol::{Request, Response, Route};
use crate::storage::{validate_collection_name, Mirror};

pub use nested::EndpointPath;

/// The main document-store engine
///
/// ## Concurrency Model: one coarse-grained lock
///
/// - The whole catalog sits behind a single `RwLock`
/// - Reads (list/get) take the read lock and run concurrently
/// - Every read-modify-write takes the write lock and keeps it through the
///   mirror write, so the files on disk only ever reflect states that were
///   actually held in memory
/// - A failed mirror write does not roll back memory; the next successful
///   save of that collection brings disk back in line
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// On-disk mirror of the catalog
    mirror: Mirror,

    /// Every collection, by name
    catalog: RwLock<Catalog>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if needed
    /// 2. Load every collection file found there
    pub fn open(config: Config) -> Result<Self> {
        let mirror = Mirror::open(&config.data_dir)?;
        let catalog = mirror.load_all()?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            collections = catalog.len(),
            "Loaded persistence mirror"
        );

        Ok(Self {
            config,
            mirror,
            catalog: RwLock::new(catalog),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Execute a request
    ///
    /// Resolves the route, runs it, and turns any error into its
    /// `{"error": ...}` response.
    pub fn execute(&self, mut request: Request) -> Response {
        let route = Route::resolve(&request.method, &request.path, self.config.item_routes);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            route = route.name(),
            "Dispatching request"
        );

        match self.dispatch(route, &mut request) {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    CrudrexError::ShapeConflict { .. } => tracing::warn!("{} {}: {}", request.method, request.path, e),
                    e if e.is_client_error() => tracing::debug!("{} {}: {}", request.method, request.path, e),
                    e => tracing::error!("{} {}: {}", request.method, request.path, e),
                }
                Response::from_error(&e)
            }
        }
    }

    fn dispatch(&self, route: Route, request: &mut Request) -> Result<Response> {
        match route {
            Route::Preflight => Ok(Response::empty()),
            Route::Info => Ok(Response::ok(self.info())),

            Route::ListCollections => Ok(Response::ok(json!({
                "collections": self.list_collections(),
            }))),
            Route::CreateCollection => {
                let name = required_name(request.body.take())?;
                self.create_collection(&name)?;
                Ok(Response::created(json!({
                    "message": format!("Collection '{}' created", name),
                })))
            }

            Route::ListItems { collection } => {
                let items = self.list_items(&collection, &request.query)?;
                Ok(Response::ok(Value::Array(items)))
            }
            Route::CreateItem { collection } => {
                let body = request.take_body()?;
                Ok(Response::created(self.create_item(&collection, body)?))
            }
            Route::GetItem { collection, id } => Ok(Response::ok(self.get_item(&collection, &id)?)),
            Route::PutItem { collection, id } => {
                let body = request.take_body()?;
                Ok(Response::created(self.put_item(&collection, &id, body)?))
            }
            Route::ReplaceItem { collection, id } => {
                let body = request.take_body()?;
                Ok(Response::ok(self.replace_item(&collection, &id, body)?))
            }
            Route::MergeItem { collection, id } => {
                let body = request.take_body()?;
                Ok(Response::ok(self.merge_item(&collection, &id, body)?))
            }
            Route::DeleteItem { collection, id } => {
                let deleted = self.delete_item(&collection, &id)?;
                Ok(Response::ok(json!({
                    "message": "Item deleted",
                    "deleted_item": deleted,
                })))
            }

            Route::ReadEndpoint { path } => Ok(Response::ok(self.read_endpoint(&path)?)),
            Route::AppendEndpoint { path } => {
                let body = request.take_body()?;
                Ok(Response::created(self.append(&path, body)?))
            }
            Route::ReplaceEndpoint { path } => {
                let body = request.take_body()?;
                Ok(Response::ok(self.replace_endpoint(&path, body)?))
            }
            Route::MergeEndpoint { path } => {
                let body = request.take_body()?;
                Ok(Response::ok(self.merge_endpoint(&path, body)?))
            }
            Route::RemoveEndpoint { path } => {
                let deleted = self.remove_endpoint(&path)?;
                Ok(Response::ok(json!({
                    "message": "Endpoint deleted",
                    "deleted_data": deleted,
                })))
            }

            Route::GetEndpointItem { path, id } => {
                Ok(Response::ok(self.get_endpoint_item(&path, &id)?))
            }
            Route::PutEndpointItem { path, id } => {
                let body = request.take_body()?;
                match self.put_endpoint_item(&path, &id, body)? {
                    (item, true) => Ok(Response::created(item)),
                    (item, false) => Ok(Response::ok(item)),
                }
            }
            Route::PatchEndpointItem { path, id } => {
                let body = request.take_body()?;
                Ok(Response::ok(self.patch_endpoint_item(&path, &id, body)?))
            }
            Route::DeleteEndpointItem { path, id } => {
                let deleted = self.delete_endpoint_item(&path, &id)?;
                Ok(Response::ok(json!({
                    "message": "Item deleted",
                    "deleted_item": deleted,
                })))
            }

            Route::Unsupported => Err(CrudrexError::MethodNotAllowed),
        }
    }

    /// Server banner: running message, collection names and port
    pub fn info(&self) -> Value {
        json!({
            "message": "Mock JSON Server is running",
            "collections": self.list_collections(),
            "instructions": "Create a new collection by POSTing to /collections/",
            "port": self.config.port,
        })
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        self.mirror.dir()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of collections in memory
    pub fn collection_count(&self) -> usize {
        self.catalog.read().len()
    }

    /// Copy of one collection's in-memory state
    pub fn snapshot(&self, name: &str) -> Option<Collection> {
        self.catalog.read().get(name).cloned()
    }

    // =========================================================================
    // Persistence (called with the write lock held)
    // =========================================================================

    /// Mirror one collection
    fn persist(&self, catalog: &Catalog, name: &str) -> Result<()> {
        let Some(collection) = catalog.get(name) else {
            return Ok(());
        };

        self.mirror.save(name, collection).inspect_err(|e| {
            tracing::error!(
                collection = %name,
                "Mirror write failed, disk is behind memory until the next save: {}",
                e
            );
        })
    }

    /// Mirror every collection
    fn persist_all(&self, catalog: &Catalog) -> Result<()> {
        self.mirror.save_all(catalog)
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Look up a collection, creating an empty one if absent
fn collection_entry<'a>(catalog: &'a mut Catalog, name: &str) -> Result<&'a mut Collection> {
    if !catalog.contains_key(name) {
        validate_collection_name(name)?;
        tracing::debug!(collection = %name, "Auto-creating collection");
    }
    Ok(catalog.entry(name.to_string()).or_default())
}

/// Unwrap a body that must be a non-empty JSON object
fn require_object(payload: Value) -> Result<Map<String, Value>> {
    if is_blank(&payload) {
        return Err(CrudrexError::bad_request("JSON data required"));
    }
    match payload {
        Value::Object(fields) => Ok(fields),
        _ => Err(CrudrexError::bad_request("JSON object required")),
    }
}

/// `name` field of a collection-creation body
fn required_name(body: Option<Value>) -> Result<String> {
    body.as_ref()
        .and_then(|body| body.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CrudrexError::bad_request("Collection name is required"))
}
