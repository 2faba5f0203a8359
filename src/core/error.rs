//! Errors raised by workspace operations

use miette::Diagnostic;
use thiserror::Error;

use crate::core::entity::EntityKind;

/// Errors that abort a workspace mutation
///
/// Lookups never produce these; they return `Option`, `bool` or an empty
/// collection instead.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0}")]
    #[diagnostic(code(testledger::validation))]
    Validation(String),

    #[error("Invalid version '{0}': expected format vX.Y (e.g. v1.0, v2.1.3)")]
    #[diagnostic(
        code(testledger::invalid_version),
        help("versions start with 'v' followed by dot-separated numbers")
    )]
    InvalidVersion(String),

    #[error("{kind} not found: {id}")]
    #[diagnostic(code(testledger::not_found))]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid moduleId: {0}")]
    #[diagnostic(
        code(testledger::invalid_module),
        help("list modules with 'tledger module list --product <id>'")
    )]
    InvalidModule(String),

    #[error("At least one test suite must be provided to create a test run")]
    #[diagnostic(code(testledger::empty_suite_set))]
    EmptySuiteSet,
}

impl LedgerError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
