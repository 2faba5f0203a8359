//! Core module - the in-memory ledger and its rules

pub mod cases;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod integrity;
pub mod legacy;
pub mod modules;
pub mod products;
pub mod result;
pub mod runs;
pub mod suites;
pub mod summary;
pub mod versions;
pub mod workspace;

pub use cases::{BulkOutcome, CaseFilter, ResultCounts, TestCaseStore};
pub use config::Config;
pub use entity::{Entity, EntityKind};
pub use error::{LedgerError, LedgerResult};
pub use identity::{normalize_product_id, same_product};
pub use integrity::{scan, IntegrityReport};
pub use modules::ModuleDirectory;
pub use products::ProductCatalog;
pub use result::{reconcile_result, CaseResult, RunResult, StoredResult};
pub use runs::{
    derive_run_status, ResolvedCase, ResultSource, RunLedger, RunStatistics, SuiteStatistics,
};
pub use suites::SuiteCatalog;
pub use summary::CoverageMatrix;
pub use versions::VersionRegistry;
pub use workspace::Workspace;
