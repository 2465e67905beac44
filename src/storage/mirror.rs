//! Persistence Mirror
//!
//! One pretty-printed JSON file per collection.
//!
//! ## Responsibilities
//! - Discover and load every collection file on startup
//! - Rewrite a whole collection file after a mutation
//! - Keep writes atomic (temp file in the same directory, then rename)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::collection::{Catalog, Collection};
use crate::error::{CrudrexError, Result};

/// On-disk mirror of the in-memory catalog
///
/// Holds no in-memory state of its own; callers serialize access to it
/// through the engine's catalog lock.
#[derive(Debug, Clone)]
pub struct Mirror {
    /// Directory holding one `<name>.json` per collection
    dir: PathBuf,
}

impl Mirror {
    const EXTENSION: &'static str = "json";

    /// Open the mirror, creating its directory if needed
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Load every collection file in the directory
    ///
    /// Files that fail to parse, or whose name is not a valid collection
    /// name, are skipped with a warning and left untouched on disk.
    pub fn load_all(&self) -> Result<Catalog> {
        let mut catalog = Catalog::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if !file_path.is_file() {
                continue;
            }
            let Some(name) = Self::parse_collection_name(&file_path) else {
                continue;
            };

            if let Err(e) = validate_collection_name(&name) {
                tracing::warn!("Skipping {}: {}", file_path.display(), e);
                continue;
            }

            match self.load(&name) {
                Ok(Some(collection)) => {
                    tracing::debug!(
                        collection = %name,
                        shape = ?collection.shape(),
                        entries = collection.len(),
                        "Loaded collection"
                    );
                    catalog.insert(name, collection);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Skipping unreadable collection file {}: {}", file_path.display(), e);
                }
            }
        }

        Ok(catalog)
    }

    /// Load one collection, `None` if it has no file
    pub fn load(&self, name: &str) -> Result<Option<Collection>> {
        let path = self.collection_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let value: Value = serde_json::from_slice(&bytes)?;
        Collection::from_value(name, value).map(Some)
    }

    /// Rewrite one collection file in full
    pub fn save(&self, name: &str, collection: &Collection) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(collection)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.collection_path(name))?;

        Ok(())
    }

    /// Rewrite every collection file
    ///
    /// Keeps going past a failed file so one bad write does not leave the
    /// rest stale; the first error is returned.
    pub fn save_all(&self, catalog: &Catalog) -> Result<()> {
        let mut first_error = None;

        for (name, collection) in catalog {
            if let Err(e) = self.save(name, collection) {
                tracing::error!(collection = %name, "Failed to mirror collection: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Get the mirror directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path backing a collection
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, Self::EXTENSION))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// "products.json" → Some("products")
    fn parse_collection_name(path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != Self::EXTENSION {
            return None;
        }
        path.file_stem()?.to_str().map(str::to_string)
    }
}

/// Reject names that cannot safely become a file name in the mirror
pub fn validate_collection_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(CrudrexError::bad_request("Invalid collection name"));
    }
    Ok(())
}
