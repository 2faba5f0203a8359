//! Test suite catalog - reusable, ordered sets of case references

use chrono::Utc;
use tracing::debug;

use crate::core::cases::TestCaseStore;
use crate::core::entity::{find_by_id, find_by_id_mut, remove_by_id, EntityKind};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::identity::same_product;
use crate::core::workspace::Workspace;
use crate::entities::suite::{SuitePatch, TestCaseRef, TestSuite};
use crate::entities::test_case::TestCase;

/// Catalog of test suites
#[derive(Debug, Clone, Default)]
pub struct SuiteCatalog {
    suites: Vec<TestSuite>,
}

impl SuiteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(suites: Vec<TestSuite>) -> Self {
        Self { suites }
    }

    pub fn all(&self) -> &[TestSuite] {
        &self.suites
    }

    pub fn get(&self, id: &str) -> Option<&TestSuite> {
        find_by_id(&self.suites, id)
    }

    /// Suites, optionally restricted to one product
    pub fn list(&self, product_id: Option<&str>) -> Vec<&TestSuite> {
        self.suites
            .iter()
            .filter(|s| product_id.map_or(true, |p| same_product(&s.product_id, p)))
            .collect()
    }

    /// Create an empty suite
    pub fn add(
        &mut self,
        name: &str,
        product_id: &str,
        description: Option<&str>,
    ) -> LedgerResult<TestSuite> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Test suite name is required"));
        }
        if product_id.trim().is_empty() {
            return Err(LedgerError::validation("Product ID is required"));
        }

        let suite = TestSuite::new(name, product_id, description.map(String::from));
        debug!(suite = %suite.id, name, "adding test suite");
        self.suites.push(suite.clone());
        Ok(suite)
    }

    /// Merge-patch a suite; `None` when it does not exist
    pub fn update(&mut self, id: &str, patch: SuitePatch) -> Option<TestSuite> {
        let suite = find_by_id_mut(&mut self.suites, id)?;
        if let Some(name) = patch.name {
            suite.name = name;
        }
        if let Some(description) = patch.description {
            suite.description = Some(description);
        }
        if let Some(active) = patch.is_active {
            suite.is_active = active;
        }
        if let Some(refs) = patch.test_cases {
            suite.test_cases = refs;
        }
        suite.updated_at = Utc::now();
        Some(suite.clone())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.suites, id)
    }

    /// Add a case reference; false when the suite is missing or already holds it
    pub fn add_case_ref(&mut self, suite_id: &str, case_ref: TestCaseRef) -> bool {
        let Some(suite) = find_by_id_mut(&mut self.suites, suite_id) else {
            return false;
        };
        if suite.test_cases.iter().any(|r| r.same_target(&case_ref)) {
            return false;
        }
        suite.test_cases.push(case_ref);
        suite.updated_at = Utc::now();
        true
    }

    /// Remove every reference with the given business ID
    pub fn remove_case_ref(&mut self, suite_id: &str, test_case_id: &str) -> bool {
        let Some(suite) = find_by_id_mut(&mut self.suites, suite_id) else {
            return false;
        };
        let before = suite.test_cases.len();
        suite.test_cases.retain(|r| r.test_case_id != test_case_id);
        let removed = suite.test_cases.len() != before;
        if removed {
            suite.updated_at = Utc::now();
        }
        removed
    }

    /// Resolve a suite's references against the store
    ///
    /// References whose case no longer exists are dropped.
    pub fn resolve_cases(&self, suite_id: &str, store: &TestCaseStore) -> Vec<TestCase> {
        let Some(suite) = self.get(suite_id) else {
            return Vec::new();
        };
        suite
            .test_cases
            .iter()
            .filter_map(|r| store.all().iter().find(|c| r.matches(c)))
            .cloned()
            .collect()
    }

    /// References that no longer resolve, as `(suite_id, test_case_id)`
    pub fn broken_refs(&self, store: &TestCaseStore) -> Vec<(String, String)> {
        self.suites
            .iter()
            .flat_map(|s| {
                s.test_cases
                    .iter()
                    .filter(|r| !store.all().iter().any(|c| r.matches(c)))
                    .map(|r| (s.id.clone(), r.test_case_id.clone()))
            })
            .collect()
    }
}

impl Workspace {
    /// Add a stored case to a suite by its internal ID
    pub fn add_case_to_suite(&mut self, suite_id: &str, case_id: &str) -> LedgerResult<bool> {
        if self.suites.get(suite_id).is_none() {
            return Err(LedgerError::not_found(EntityKind::Suite, suite_id));
        }
        let case_ref = self
            .cases
            .get(case_id)
            .map(TestCaseRef::from)
            .ok_or_else(|| LedgerError::not_found(EntityKind::TestCase, case_id))?;
        Ok(self.suites.add_case_ref(suite_id, case_ref))
    }

    /// Resolve a suite's cases against this workspace's store
    pub fn suite_cases(&self, suite_id: &str) -> Vec<TestCase> {
        self.suites.resolve_cases(suite_id, &self.cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::test_case::NewTestCase;

    fn stored(id: &str, business: &str, module: &str) -> TestCase {
        NewTestCase::new(module, "v1.0").into_case(id.into(), business.into())
    }

    #[test]
    fn test_add_requires_name_and_product() {
        let mut catalog = SuiteCatalog::new();
        assert!(matches!(catalog.add("  ", "1", None), Err(LedgerError::Validation(_))));
        assert!(matches!(catalog.add("Smoke", "", None), Err(LedgerError::Validation(_))));
        let suite = catalog.add("Smoke", "1", Some("quick checks")).unwrap();
        assert_eq!(suite.description.as_deref(), Some("quick checks"));
        assert!(suite.is_active);
    }

    #[test]
    fn test_add_case_ref_dedupes() {
        let mut catalog = SuiteCatalog::new();
        let suite = catalog.add("Smoke", "1", None).unwrap();
        let case = stored("c1", "TC101", "mod1");

        assert!(catalog.add_case_ref(&suite.id, TestCaseRef::from(&case)));
        assert!(!catalog.add_case_ref(&suite.id, TestCaseRef::from(&case)));
        assert!(!catalog.add_case_ref("missing", TestCaseRef::from(&case)));
        assert_eq!(catalog.get(&suite.id).unwrap().case_count(), 1);
    }

    #[test]
    fn test_remove_case_ref_by_business_id() {
        let mut catalog = SuiteCatalog::new();
        let suite = catalog.add("Smoke", "1", None).unwrap();
        catalog.add_case_ref(&suite.id, TestCaseRef::from(&stored("c1", "TC101", "mod1")));

        assert!(!catalog.remove_case_ref(&suite.id, "c1"));
        assert!(catalog.remove_case_ref(&suite.id, "TC101"));
        assert_eq!(catalog.get(&suite.id).unwrap().case_count(), 0);
    }

    #[test]
    fn test_resolve_drops_broken_refs() {
        let mut catalog = SuiteCatalog::new();
        let suite = catalog.add("Smoke", "1", None).unwrap();
        let kept = stored("c1", "TC101", "mod1");
        let gone = stored("c2", "TC102", "mod1");
        catalog.add_case_ref(&suite.id, TestCaseRef::from(&kept));
        catalog.add_case_ref(&suite.id, TestCaseRef::from(&gone));

        let store = TestCaseStore::from_records(vec![kept.clone()]);
        let resolved = catalog.resolve_cases(&suite.id, &store);
        assert_eq!(resolved, vec![kept]);
        assert_eq!(
            catalog.broken_refs(&store),
            vec![(suite.id.clone(), "TC102".to_string())]
        );
        assert!(catalog.resolve_cases("missing", &store).is_empty());
    }

    #[test]
    fn test_resolve_matches_business_id_and_module() {
        let mut catalog = SuiteCatalog::new();
        let suite = catalog.add("Smoke", "1", None).unwrap();
        catalog.add_case_ref(
            &suite.id,
            TestCaseRef {
                id: None,
                test_case_id: "TC101".into(),
                module_id: "mod2".into(),
                version: "v1.0".into(),
            },
        );
        let store = TestCaseStore::from_records(vec![
            stored("c1", "TC101", "mod1"),
            stored("c2", "TC101", "mod2"),
        ]);
        let resolved = catalog.resolve_cases(&suite.id, &store);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "c2");
    }

    #[test]
    fn test_update_and_delete() {
        let mut catalog = SuiteCatalog::new();
        let suite = catalog.add("Smoke", "1", None).unwrap();
        let updated = catalog
            .update(
                &suite.id,
                SuitePatch {
                    name: Some("Regression".into()),
                    ..SuitePatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Regression");
        assert!(catalog.update("missing", SuitePatch::default()).is_none());

        assert!(catalog.delete(&suite.id));
        assert!(!catalog.delete(&suite.id));
    }
}
