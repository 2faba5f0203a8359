//! Workspace - the one owner of every collection
//!
//! Each component type holds its own collection and the operations that
//! touch only that collection. Operations that cross components (foreign-key
//! checks, cascades, version reassignment, run result resolution) are
//! implemented as `impl Workspace` blocks next to the component they start
//! from.

use crate::core::cases::TestCaseStore;
use crate::core::modules::ModuleDirectory;
use crate::core::products::ProductCatalog;
use crate::core::runs::RunLedger;
use crate::core::suites::SuiteCatalog;
use crate::core::versions::VersionRegistry;
use crate::storage::{seed, StorageError};

/// In-memory state of a test ledger
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    pub(crate) products: ProductCatalog,
    pub(crate) versions: VersionRegistry,
    pub(crate) modules: ModuleDirectory,
    pub(crate) cases: TestCaseStore,
    pub(crate) suites: SuiteCatalog,
    pub(crate) runs: RunLedger,
}

impl Workspace {
    /// An empty workspace
    pub fn new() -> Self {
        Self::default()
    }

    /// A workspace holding the built-in sample dataset
    pub fn seeded() -> Result<Self, StorageError> {
        let mut workspace = seed::load()?.into_workspace();
        workspace.recompute_versions();
        Ok(workspace)
    }

    pub fn products(&self) -> &ProductCatalog {
        &self.products
    }

    pub fn products_mut(&mut self) -> &mut ProductCatalog {
        &mut self.products
    }

    pub fn versions(&self) -> &VersionRegistry {
        &self.versions
    }

    pub fn versions_mut(&mut self) -> &mut VersionRegistry {
        &mut self.versions
    }

    pub fn modules(&self) -> &ModuleDirectory {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut ModuleDirectory {
        &mut self.modules
    }

    pub fn cases(&self) -> &TestCaseStore {
        &self.cases
    }

    pub fn cases_mut(&mut self) -> &mut TestCaseStore {
        &mut self.cases
    }

    pub fn suites(&self) -> &SuiteCatalog {
        &self.suites
    }

    pub fn suites_mut(&mut self) -> &mut SuiteCatalog {
        &mut self.suites
    }

    pub fn runs(&self) -> &RunLedger {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut RunLedger {
        &mut self.runs
    }
}
