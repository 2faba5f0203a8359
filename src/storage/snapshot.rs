//! Reading and writing a whole workspace

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::{keys, seed, KeyValueStore, StorageError};
use crate::core::cases::TestCaseStore;
use crate::core::integrity;
use crate::core::legacy::{
    ModuleRecord, ProductRecord, RunRecord, SuiteRecord, TestCaseRecord, VersionRecord,
};
use crate::core::modules::ModuleDirectory;
use crate::core::products::ProductCatalog;
use crate::core::runs::RunLedger;
use crate::core::suites::SuiteCatalog;
use crate::core::versions::VersionRegistry;
use crate::core::workspace::Workspace;
use crate::entities::{Product, ProductModule, ProductVersion, TestCase, TestRun, TestSuite};

/// Every collection of a workspace in its current shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub versions: Vec<ProductVersion>,
    pub modules: Vec<ProductModule>,
    pub cases: Vec<TestCase>,
    pub suites: Vec<TestSuite>,
    pub runs: Vec<TestRun>,
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Vec<T>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::json(key, e))
}

fn encode<T: Serialize>(key: &str, records: &[T]) -> Result<String, StorageError> {
    serde_json::to_string(records).map_err(|e| StorageError::json(key, e))
}

impl Snapshot {
    /// Decode every key through the legacy adapters
    ///
    /// `Ok(None)` when one of the required keys is absent. A missing
    /// supplementary key is filled from `fallback`; an unparsable one too,
    /// with a warning.
    pub(crate) fn decode_from(
        source: &impl KeyValueStore,
        fallback: &dyn Fn() -> Result<Snapshot, StorageError>,
    ) -> Result<Option<Snapshot>, StorageError> {
        let mut required = Vec::with_capacity(keys::REQUIRED.len());
        for key in keys::REQUIRED {
            match source.get(key)? {
                Some(raw) => required.push(raw),
                None => {
                    debug!(key, "snapshot key missing");
                    return Ok(None);
                }
            }
        }
        let (cases_raw, modules_raw, versions_raw) = (&required[0], &required[1], &required[2]);

        let cases: Vec<TestCase> = decode::<TestCaseRecord>(keys::TEST_CASES, cases_raw)?
            .into_iter()
            .map(TestCase::from)
            .collect();
        let modules: Vec<ProductModule> =
            decode::<ModuleRecord>(keys::PRODUCT_MODULES, modules_raw)?
                .into_iter()
                .map(ProductModule::from)
                .collect();
        let versions: Vec<ProductVersion> =
            decode::<VersionRecord>(keys::PRODUCT_VERSIONS, versions_raw)?
                .into_iter()
                .map(ProductVersion::from)
                .collect();

        let products = match supplementary::<ProductRecord>(source, keys::PRODUCTS)? {
            Some(records) => records.into_iter().map(Product::from).collect(),
            None => fallback()?.products,
        };
        let suites = match supplementary::<SuiteRecord>(source, keys::TEST_SUITES)? {
            Some(records) => records.into_iter().map(|r| r.adapt(&modules)).collect(),
            None => fallback()?.suites,
        };
        let runs = match supplementary::<RunRecord>(source, keys::TEST_RUNS)? {
            Some(records) => records.into_iter().map(|r| r.adapt(&suites)).collect(),
            None => fallback()?.runs,
        };

        Ok(Some(Snapshot {
            products,
            versions,
            modules,
            cases,
            suites,
            runs,
        }))
    }

    pub fn from_workspace(workspace: &Workspace) -> Self {
        Self {
            products: workspace.products().list().to_vec(),
            versions: workspace.versions().all().to_vec(),
            modules: workspace.modules().all().to_vec(),
            cases: workspace.cases().all().to_vec(),
            suites: workspace.suites().all().to_vec(),
            runs: workspace.runs().all().to_vec(),
        }
    }

    /// Build a workspace holding exactly these records
    pub fn into_workspace(self) -> Workspace {
        Workspace {
            products: ProductCatalog::from_records(self.products),
            versions: VersionRegistry::from_records(self.versions),
            modules: ModuleDirectory::from_records(self.modules),
            cases: TestCaseStore::from_records(self.cases),
            suites: SuiteCatalog::from_records(self.suites),
            runs: RunLedger::from_records(self.runs),
        }
    }

    /// Serialize every collection, in key order
    pub fn encode(&self) -> Result<Vec<(&'static str, String)>, StorageError> {
        Ok(vec![
            (keys::PRODUCTS, encode(keys::PRODUCTS, &self.products)?),
            (
                keys::PRODUCT_VERSIONS,
                encode(keys::PRODUCT_VERSIONS, &self.versions)?,
            ),
            (
                keys::PRODUCT_MODULES,
                encode(keys::PRODUCT_MODULES, &self.modules)?,
            ),
            (keys::TEST_CASES, encode(keys::TEST_CASES, &self.cases)?),
            (keys::TEST_SUITES, encode(keys::TEST_SUITES, &self.suites)?),
            (keys::TEST_RUNS, encode(keys::TEST_RUNS, &self.runs)?),
        ])
    }
}

/// Decode an optional key; unparsable content counts as absent
fn supplementary<T: DeserializeOwned>(
    source: &impl KeyValueStore,
    key: &str,
) -> Result<Option<Vec<T>>, StorageError> {
    let Some(raw) = source.get(key)? else {
        return Ok(None);
    };
    match decode(key, &raw) {
        Ok(records) => Ok(Some(records)),
        Err(e) => {
            warn!(key, error = %e, "ignoring unparsable collection, using built-in data");
            Ok(None)
        }
    }
}

impl Workspace {
    /// Load a workspace from a store
    ///
    /// A complete snapshot is adapted, its versions recomputed and an
    /// integrity scan logged. A missing or unparsable snapshot is replaced
    /// by the built-in seed, which is written back at once.
    pub fn load(store: &mut impl KeyValueStore) -> Result<Workspace, StorageError> {
        let decoded = match Snapshot::decode_from(&*store, &seed::load) {
            Ok(snapshot) => snapshot,
            Err(e @ StorageError::Json { .. }) => {
                warn!(error = %e, "stored snapshot is unreadable");
                None
            }
            Err(e) => return Err(e),
        };

        let workspace = match decoded {
            Some(snapshot) => {
                let mut workspace = snapshot.into_workspace();
                workspace.recompute_versions();
                debug!(
                    modules = workspace.modules().all().len(),
                    cases = workspace.cases().len(),
                    "loaded snapshot"
                );
                workspace
            }
            None => {
                warn!("no usable snapshot, seeding built-in data");
                store.clear()?;
                let workspace = Workspace::seeded()?;
                workspace.save(store)?;
                workspace
            }
        };

        integrity::scan(&workspace).log();
        Ok(workspace)
    }

    /// Write every collection to the store
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        for (key, value) in Snapshot::from_workspace(self).encode()? {
            store.set(key, value)?;
        }
        debug!("saved snapshot");
        Ok(())
    }

    /// Save, logging instead of returning a failure
    ///
    /// On `false` the in-memory state is ahead of the store.
    pub fn flush(&self, store: &mut impl KeyValueStore) -> bool {
        match self.save(store) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to persist snapshot; in-memory state not saved");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::Persistence("disk full".into()))
        }

        fn clear(&mut self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_store_is_seeded_and_saved() {
        let mut store = MemoryStore::new();
        let ws = Workspace::load(&mut store).unwrap();

        assert_eq!(ws.products().list().len(), 5);
        for key in keys::ALL {
            assert!(store.get(key).unwrap().is_some(), "{} not written", key);
        }
    }

    #[test]
    fn test_save_then_load_keeps_state() {
        let mut store = MemoryStore::new();
        let mut ws = Workspace::load(&mut store).unwrap();
        let product = ws.products_mut().add("Portal", None).unwrap();
        let module = ws.add_module("Login", &product.id, Some("v3.0")).unwrap();
        ws.save(&mut store).unwrap();

        let reloaded = Workspace::load(&mut store).unwrap();
        assert!(reloaded.modules().get(&module).is_some());
        assert!(reloaded.versions().has_version(&product.id, "v3.0"));
        assert_eq!(reloaded.cases().by_module(&module).len(), 1);
    }

    #[test]
    fn test_unparsable_trio_reseeds() {
        let mut store = MemoryStore::new()
            .with_entry(keys::TEST_CASES, "{oops")
            .with_entry(keys::PRODUCT_MODULES, "[]")
            .with_entry(keys::PRODUCT_VERSIONS, "[]");
        let ws = Workspace::load(&mut store).unwrap();

        assert_eq!(ws.modules().all().len(), 7);
        let cases = store.get(keys::TEST_CASES).unwrap().unwrap();
        assert!(cases.starts_with('['));
    }

    #[test]
    fn test_missing_supplementary_keys_use_seed() {
        let mut store = MemoryStore::new()
            .with_entry(keys::TEST_CASES, "[]")
            .with_entry(keys::PRODUCT_MODULES, "[]")
            .with_entry(keys::PRODUCT_VERSIONS, "[]");
        let ws = Workspace::load(&mut store).unwrap();

        assert!(ws.cases().is_empty());
        assert!(ws.modules().all().is_empty());
        assert_eq!(ws.products().list().len(), 5);
        assert_eq!(ws.suites().all().len(), 2);
    }

    #[test]
    fn test_flush_swallows_failure() {
        let ws = Workspace::new();
        assert!(!ws.flush(&mut BrokenStore));
        assert!(ws.flush(&mut MemoryStore::new()));
    }
}
