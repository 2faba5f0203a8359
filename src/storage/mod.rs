//! Snapshot persistence
//!
//! The workspace is mirrored into a flat key-value store, one JSON array per
//! collection. Nothing here runs implicitly: the owner of a [`Workspace`]
//! calls [`Workspace::save`] or [`Workspace::flush`] after a batch of
//! mutations.
//!
//! [`Workspace`]: crate::core::Workspace
//! [`Workspace::save`]: crate::core::Workspace::save
//! [`Workspace::flush`]: crate::core::Workspace::flush

pub mod file;
pub mod memory;
pub mod seed;
pub mod snapshot;

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use snapshot::Snapshot;

/// Store keys, one per collection
pub mod keys {
    pub const TEST_CASES: &str = "testCases";
    pub const PRODUCT_MODULES: &str = "productModules";
    pub const PRODUCT_VERSIONS: &str = "productVersions";
    pub const PRODUCTS: &str = "products";
    pub const TEST_SUITES: &str = "testSuites";
    pub const TEST_RUNS: &str = "testRuns";

    /// Keys that must all be present for a snapshot to be used
    pub const REQUIRED: [&str; 3] = [TEST_CASES, PRODUCT_MODULES, PRODUCT_VERSIONS];

    /// Every key, in write order
    pub const ALL: [&str; 6] = [
        PRODUCTS,
        PRODUCT_VERSIONS,
        PRODUCT_MODULES,
        TEST_CASES,
        TEST_SUITES,
        TEST_RUNS,
    ];
}

#[derive(Debug, Error, Diagnostic)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(code(testledger::storage::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON under '{key}': {source}")]
    #[diagnostic(code(testledger::storage::json))]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Built-in seed file missing: {0}")]
    #[diagnostic(code(testledger::storage::missing_seed))]
    MissingSeed(String),

    #[error("Failed to persist snapshot: {0}")]
    #[diagnostic(code(testledger::storage::persistence))]
    Persistence(String),
}

impl StorageError {
    pub(crate) fn json(key: &str, source: serde_json::Error) -> Self {
        StorageError::Json {
            key: key.to_string(),
            source,
        }
    }
}

/// A flat string-to-string store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove every key
    fn clear(&mut self) -> Result<(), StorageError>;
}
