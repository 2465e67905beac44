//! Storage Module
//!
//! Persistence mirror: the on-disk copy of every collection.
//!
//! ## Responsibilities
//! - Load all collections at startup
//! - Re-serialize whole collections after each mutation
//! - Never append or log; the latest file is the whole truth
//!
//! ## File Layout
//! ```text
//! {data_dir}/
//!   ├── products.json   {"<id>": {...record...}, ...}
//!   └── a.json          {"a-b-c": {"items": [...]}, ...}
//! ```

mod mirror;

pub use mirror::{validate_collection_name, Mirror};
