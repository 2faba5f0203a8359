//! Test case store - test cases scoped to a module and a version

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::entity::{find_by_id, find_by_id_mut, remove_by_id, EntityKind};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::identity::{generate_business_id, new_id, IdPrefix};
use crate::core::result::{CaseResult, StoredResult};
use crate::core::workspace::Workspace;
use crate::entities::test_case::{ManualTestCaseStep, NewTestCase, TestCase};

/// Store of all test cases
#[derive(Debug, Clone, Default)]
pub struct TestCaseStore {
    cases: Vec<TestCase>,
}

/// Outcome of a bulk insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub success: usize,
    pub errors: usize,
}

/// Case counts over the full result vocabulary; every key is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultCounts(BTreeMap<StoredResult, usize>);

impl ResultCounts {
    fn zeroed() -> Self {
        Self(StoredResult::ALL.into_iter().map(|r| (r, 0)).collect())
    }

    fn bump(&mut self, result: StoredResult) {
        *self.0.entry(result).or_insert(0) += 1;
    }

    /// Count for one stored spelling
    pub fn get(&self, result: StoredResult) -> usize {
        self.0.get(&result).copied().unwrap_or(0)
    }

    /// Count of every spelling that normalizes to `result`
    pub fn normalized(&self, result: CaseResult) -> usize {
        self.0
            .iter()
            .filter(|(stored, _)| stored.normalize() == result)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StoredResult, usize)> + '_ {
        self.0.iter().map(|(r, c)| (*r, *c))
    }
}

/// Search criteria for test cases; empty fields match everything
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Case-insensitive substring of the business ID
    pub test_case_id: Option<String>,
    /// Case-insensitive substring of the use case
    pub use_case: Option<String>,
    pub result: Option<CaseResult>,
    /// Attribute key and case-insensitive value substring
    pub attribute: Option<(String, String)>,
}

impl CaseFilter {
    pub fn matches(&self, case: &TestCase) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };

        self.test_case_id
            .as_deref()
            .map_or(true, |needle| contains(&case.test_case_id, needle))
            && self
                .use_case
                .as_deref()
                .map_or(true, |needle| contains(&case.use_case, needle))
            && self
                .result
                .map_or(true, |result| case.result.normalize() == result)
            && self.attribute.as_ref().map_or(true, |(key, value)| {
                case.attribute(key)
                    .is_some_and(|actual| contains(actual, value))
            })
    }
}

fn sorted(mut cases: Vec<&TestCase>) -> Vec<&TestCase> {
    cases.sort_by(|a, b| a.test_case_id.cmp(&b.test_case_id));
    cases
}

impl TestCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }

    pub fn all(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn get(&self, id: &str) -> Option<&TestCase> {
        find_by_id(&self.cases, id)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TestCase> {
        self.cases.iter_mut()
    }

    /// Insert without any foreign-key check
    pub(crate) fn insert(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// Find by business ID within a module
    pub fn find_business(&self, module_id: &str, test_case_id: &str) -> Option<&TestCase> {
        self.cases
            .iter()
            .find(|c| c.module_id == module_id && c.test_case_id == test_case_id)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let removed = remove_by_id(&mut self.cases, id);
        if removed {
            debug!(case = id, "deleted test case");
        }
        removed
    }

    pub(crate) fn remove_by_module(&mut self, module_id: &str) -> usize {
        let before = self.cases.len();
        self.cases.retain(|c| c.module_id != module_id);
        before - self.cases.len()
    }

    pub fn by_module(&self, module_id: &str) -> Vec<&TestCase> {
        sorted(self.cases.iter().filter(|c| c.module_id == module_id).collect())
    }

    pub fn by_module_and_version(&self, module_id: &str, version: &str) -> Vec<&TestCase> {
        sorted(
            self.cases
                .iter()
                .filter(|c| c.module_id == module_id && c.version == version)
                .collect(),
        )
    }

    /// Cases matching a filter, sorted by business ID
    pub fn search(&self, filter: &CaseFilter) -> Vec<&TestCase> {
        sorted(self.cases.iter().filter(|c| filter.matches(c)).collect())
    }

    /// Count cases by result, optionally scoped to a module and/or version
    pub fn count_by_status(&self, module_id: Option<&str>, version: Option<&str>) -> ResultCounts {
        let mut counts = ResultCounts::zeroed();
        self.cases
            .iter()
            .filter(|c| module_id.map_or(true, |m| c.module_id == m))
            .filter(|c| version.map_or(true, |v| c.version == v))
            .for_each(|c| counts.bump(c.result));
        counts
    }

    fn case_mut(&mut self, case_id: &str) -> LedgerResult<&mut TestCase> {
        find_by_id_mut(&mut self.cases, case_id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::TestCase, case_id))
    }

    /// Append a step to a case, returning the new step ID
    pub fn add_step(&mut self, case_id: &str, steps: &str, expected: &str) -> LedgerResult<u32> {
        let case = self.case_mut(case_id)?;
        let id = case.next_step_id();
        case.steps.push(ManualTestCaseStep {
            id,
            steps: steps.to_string(),
            expected_result: expected.to_string(),
        });
        case.updated_at = Some(Utc::now());
        Ok(id)
    }

    /// Replace a step's text; `Ok(false)` when the step does not exist
    pub fn update_step(
        &mut self,
        case_id: &str,
        step_id: u32,
        steps: Option<&str>,
        expected: Option<&str>,
    ) -> LedgerResult<bool> {
        let case = self.case_mut(case_id)?;
        let Some(step) = case.steps.iter_mut().find(|s| s.id == step_id) else {
            return Ok(false);
        };
        if let Some(steps) = steps {
            step.steps = steps.to_string();
        }
        if let Some(expected) = expected {
            step.expected_result = expected.to_string();
        }
        case.updated_at = Some(Utc::now());
        Ok(true)
    }

    /// Remove a step; `Ok(false)` when the step does not exist
    pub fn remove_step(&mut self, case_id: &str, step_id: u32) -> LedgerResult<bool> {
        let case = self.case_mut(case_id)?;
        let before = case.steps.len();
        case.steps.retain(|s| s.id != step_id);
        let removed = case.steps.len() != before;
        if removed {
            case.updated_at = Some(Utc::now());
        }
        Ok(removed)
    }
}

impl Workspace {
    /// Store a new test case under an existing module
    pub fn add_case(&mut self, draft: NewTestCase) -> LedgerResult<TestCase> {
        let product = self
            .modules
            .get(&draft.module_id)
            .ok_or_else(|| LedgerError::InvalidModule(draft.module_id.clone()))?
            .product_id
            .clone();
        self.versions.add(&product, &draft.version)?;

        let business_id = match draft.test_case_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_business_id(|candidate| {
                self.cases.find_business(&draft.module_id, candidate).is_some()
            }),
        };

        let case = draft.into_case(new_id(IdPrefix::TestCase), business_id);
        debug!(case = %case.id, business = %case.test_case_id, module = %case.module_id, "adding test case");
        self.cases.insert(case.clone());
        Ok(case)
    }

    /// Replace a stored case by internal ID
    pub fn update_case(&mut self, mut case: TestCase) -> LedgerResult<TestCase> {
        let slot = self.cases.case_mut(&case.id)?;
        case.updated_at = Some(Utc::now());
        *slot = case.clone();

        if let Some(module) = self.modules.get(&case.module_id) {
            let product = module.product_id.clone();
            if let Err(e) = self.versions.add(&product, &case.version) {
                warn!(case = %case.id, error = %e, "updated case carries an unregistered version");
            }
        }
        Ok(case)
    }

    /// Insert many cases; failing items are counted and skipped
    pub fn bulk_add_cases(&mut self, drafts: Vec<NewTestCase>) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for (index, draft) in drafts.into_iter().enumerate() {
            match self.add_case(draft) {
                Ok(_) => outcome.success += 1,
                Err(e) => {
                    warn!(row = index + 1, error = %e, "failed to add test case");
                    outcome.errors += 1;
                }
            }
        }
        debug!(success = outcome.success, errors = outcome.errors, "bulk add finished");
        outcome
    }

    /// Cases of every module of a product
    pub fn cases_by_product(&self, product_id: &str) -> Vec<&TestCase> {
        let modules: Vec<&str> = self
            .modules
            .list_by_product(product_id)
            .into_iter()
            .map(|m| m.id.as_str())
            .collect();
        sorted(
            self.cases
                .all()
                .iter()
                .filter(|c| modules.contains(&c.module_id.as_str()))
                .collect(),
        )
    }

    pub fn cases_by_product_and_version(&self, product_id: &str, version: &str) -> Vec<&TestCase> {
        self.cases_by_product(product_id)
            .into_iter()
            .filter(|c| c.version == version)
            .collect()
    }
}
