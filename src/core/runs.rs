//! Test run ledger - executions of suites with a run-scoped result overlay
//!
//! A run never writes to the canonical `TestCase.result`. Results recorded in
//! a run live in its overlay; reads go through [`reconcile_result`].

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::core::entity::{find_by_id, find_by_id_mut, remove_by_id, EntityKind};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::identity::same_product;
use crate::core::result::{reconcile_result, CaseResult, RunResult};
use crate::core::workspace::Workspace;
use crate::entities::run::{
    OverlayEntry, RunPatch, RunStatus, TestRun, TestSuiteRef, DEFAULT_CREATED_BY,
};
use crate::entities::suite::TestSuite;
use crate::entities::test_case::TestCase;

/// Ledger of test runs
#[derive(Debug, Clone, Default)]
pub struct RunLedger {
    runs: Vec<TestRun>,
}

/// Where a resolved result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Overlay,
    Canonical,
}

/// A case as seen through a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCase {
    pub case: TestCase,
    pub result: CaseResult,
    pub source: ResultSource,
}

/// Per-suite figures of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteStatistics {
    pub suite_id: String,
    pub suite_name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub blocked: usize,
    pub completion: u32,
}

/// Figures of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub blocked: usize,
    pub completion: u32,
    pub suites: Vec<SuiteStatistics>,
}

/// Share of passed cases as a rounded percentage; 0 for an empty run
pub fn completion_percent(passed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (passed as f64 / total as f64 * 100.0).round() as u32
}

/// Status implied by how many cases have a Pass or Fail result
pub fn derive_run_status(total: usize, completed: usize) -> RunStatus {
    if completed == 0 {
        RunStatus::NotStarted
    } else if completed >= total {
        RunStatus::Completed
    } else {
        RunStatus::InProgress
    }
}

impl RunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(runs: Vec<TestRun>) -> Self {
        Self { runs }
    }

    pub fn all(&self) -> &[TestRun] {
        &self.runs
    }

    pub fn get(&self, id: &str) -> Option<&TestRun> {
        find_by_id(&self.runs, id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut TestRun> {
        find_by_id_mut(&mut self.runs, id)
    }

    /// Runs, optionally restricted to one product
    pub fn list(&self, product_id: Option<&str>) -> Vec<&TestRun> {
        self.runs
            .iter()
            .filter(|r| product_id.map_or(true, |p| same_product(&r.product_id, p)))
            .collect()
    }

    /// Create a run over the given suites
    pub fn add(
        &mut self,
        name: &str,
        description: &str,
        suites: &[TestSuite],
        created_by: Option<&str>,
    ) -> LedgerResult<TestRun> {
        if suites.is_empty() {
            return Err(LedgerError::EmptySuiteSet);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Test run name is required"));
        }

        let run = TestRun::new(
            name,
            description,
            suites,
            created_by.unwrap_or(DEFAULT_CREATED_BY),
        );
        debug!(run = %run.id, name, suites = suites.len(), "adding test run");
        self.runs.push(run.clone());
        Ok(run)
    }

    /// Merge-patch a run; `None` when it does not exist
    ///
    /// Replacing the suites re-snapshots them and drops the recorded overlay.
    pub fn update(&mut self, id: &str, patch: RunPatch) -> Option<TestRun> {
        let run = find_by_id_mut(&mut self.runs, id)?;
        if let Some(name) = patch.name {
            run.name = name;
        }
        if let Some(description) = patch.description {
            run.description = description;
        }
        if let Some(suites) = patch.test_suites {
            run.test_suites = suites.iter().map(TestSuiteRef::snapshot).collect();
        }
        if let Some(status) = patch.status {
            run.status = status;
        }
        run.updated_at = Utc::now();
        Some(run.clone())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.runs, id)
    }
}

impl Workspace {
    /// Create a run from catalog suite IDs
    pub fn create_run(
        &mut self,
        name: &str,
        description: &str,
        suite_ids: &[&str],
        created_by: Option<&str>,
    ) -> LedgerResult<TestRun> {
        let suites = suite_ids
            .iter()
            .map(|id| {
                self.suites
                    .get(id)
                    .cloned()
                    .ok_or_else(|| LedgerError::not_found(EntityKind::Suite, *id))
            })
            .collect::<LedgerResult<Vec<_>>>()?;
        self.runs.add(name, description, &suites, created_by)
    }

    /// Record a result for a case inside a run
    ///
    /// The raw input accepts either vocabulary. An existing overlay entry for
    /// the case is updated in place; otherwise a new entry goes on the run's
    /// first suite.
    pub fn record_result(
        &mut self,
        run_id: &str,
        case_id: &str,
        raw: &str,
    ) -> LedgerResult<RunResult> {
        let result = CaseResult::parse_lenient(raw).to_run();
        let run = self
            .runs
            .get_mut(run_id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Run, run_id))?;

        let existing = run
            .test_suites
            .iter_mut()
            .flat_map(|s| s.test_cases.iter_mut())
            .find(|entry| entry.id == case_id);
        match existing {
            Some(entry) => entry.result = result,
            None => {
                if let Some(first) = run.test_suites.first_mut() {
                    first.test_cases.push(OverlayEntry {
                        id: case_id.to_string(),
                        result,
                    });
                }
            }
        }
        run.updated_at = Utc::now();
        debug!(run = run_id, case = case_id, %result, "recorded result");

        self.refresh_run_status(run_id);
        Ok(result)
    }

    /// Cases of a catalog suite with the result this run reports for each
    ///
    /// An entry under the internal case ID always wins. Only when the run has
    /// none does a legacy entry under the business ID count. For each key the
    /// suite's own snapshot is consulted first, then the whole run.
    pub fn resolve_run_suite(&self, run_id: &str, suite_id: &str) -> Vec<ResolvedCase> {
        let Some(run) = self.runs.get(run_id) else {
            return Vec::new();
        };
        let snapshot = run.suite(suite_id);

        self.suites
            .resolve_cases(suite_id, &self.cases)
            .into_iter()
            .map(|case| {
                let keys = [case.id.as_str(), case.test_case_id.as_str()];
                let overlay = keys.iter().find_map(|key| {
                    snapshot
                        .and_then(|s| s.overlay_for(&[*key]))
                        .or_else(|| run.overlay_anywhere(&[*key]))
                });
                let source = if overlay.is_some() {
                    ResultSource::Overlay
                } else {
                    ResultSource::Canonical
                };
                let result = reconcile_result(overlay, case.result);
                ResolvedCase {
                    case,
                    result,
                    source,
                }
            })
            .collect()
    }

    /// Every resolved case of a run, suite by suite
    pub fn resolve_run(&self, run_id: &str) -> Vec<(String, ResolvedCase)> {
        let Some(run) = self.runs.get(run_id) else {
            return Vec::new();
        };
        run.test_suites
            .iter()
            .flat_map(|s| {
                self.resolve_run_suite(run_id, &s.id)
                    .into_iter()
                    .map(move |r| (s.id.clone(), r))
            })
            .collect()
    }

    pub fn run_statistics(&self, run_id: &str) -> Option<RunStatistics> {
        let run = self.runs.get(run_id)?;

        let suites: Vec<SuiteStatistics> = run
            .test_suites
            .iter()
            .map(|snapshot| {
                let resolved = self.resolve_run_suite(run_id, &snapshot.id);
                let count = |wanted: CaseResult| {
                    resolved.iter().filter(|r| r.result == wanted).count()
                };
                let (total, passed) = (resolved.len(), count(CaseResult::Pass));
                SuiteStatistics {
                    suite_id: snapshot.id.clone(),
                    suite_name: snapshot.name.clone(),
                    total,
                    passed,
                    failed: count(CaseResult::Fail),
                    pending: count(CaseResult::Pending),
                    blocked: count(CaseResult::Blocked),
                    completion: completion_percent(passed, total),
                }
            })
            .collect();

        let sum = |f: fn(&SuiteStatistics) -> usize| suites.iter().map(f).sum::<usize>();
        let (total, passed) = (sum(|s| s.total), sum(|s| s.passed));
        Some(RunStatistics {
            total,
            passed,
            failed: sum(|s| s.failed),
            pending: sum(|s| s.pending),
            blocked: sum(|s| s.blocked),
            completion: completion_percent(passed, total),
            suites,
        })
    }

    /// Recompute a run's status from its resolved results
    ///
    /// Returns the new status, or `None` for an unknown run.
    pub fn refresh_run_status(&mut self, run_id: &str) -> Option<RunStatus> {
        let resolved = self.resolve_run(run_id);
        let completed = resolved
            .iter()
            .filter(|(_, r)| r.result.is_completed())
            .count();
        let status = derive_run_status(resolved.len(), completed);
        let run = self.runs.get_mut(run_id)?;
        if run.status != status {
            debug!(run = run_id, from = %run.status, to = %status, "run status changed");
            run.status = status;
        }
        Some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_requires_suites() {
        let mut ledger = RunLedger::new();
        let err = ledger.add("Nightly", "", &[], None).unwrap_err();
        assert_eq!(err, LedgerError::EmptySuiteSet);
        assert!(ledger.all().is_empty());
    }

    #[test]
    fn test_add_defaults_created_by() {
        let mut ledger = RunLedger::new();
        let suite = TestSuite::new("Smoke", "p2", None);
        let run = ledger.add("Nightly", "", &[suite], None).unwrap();
        assert_eq!(run.created_by, DEFAULT_CREATED_BY);
        assert_eq!(run.product_id, "p2");
        assert_eq!(ledger.list(Some("2")).len(), 1);
        assert!(ledger.list(Some("3")).is_empty());
    }

    #[test]
    fn test_update_resnapshots_suites() {
        let mut ledger = RunLedger::new();
        let first = TestSuite::new("Smoke", "1", None);
        let run = ledger.add("Nightly", "", &[first], Some("qa")).unwrap();
        ledger.get_mut(&run.id).unwrap().test_suites[0]
            .test_cases
            .push(OverlayEntry {
                id: "CASE-1".into(),
                result: RunResult::Passed,
            });

        let replacement = TestSuite::new("Regression", "1", None);
        let updated = ledger
            .update(
                &run.id,
                RunPatch {
                    test_suites: Some(vec![replacement.clone()]),
                    ..RunPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.test_suites.len(), 1);
        assert_eq!(updated.test_suites[0].name, "Regression");
        assert!(updated.test_suites[0].test_cases.is_empty());
        assert!(ledger.update("missing", RunPatch::default()).is_none());
    }

    #[test]
    fn test_recorded_result_beats_legacy_business_id_entry() {
        let mut ws = Workspace::new();
        let product = ws.products_mut().add("P1", None).unwrap().id;
        let module = ws.add_module("Login", &product, None).unwrap();
        let case = ws
            .add_case(crate::entities::NewTestCase::new(&module, "v1.0").with_use_case("Sign in"))
            .unwrap();
        let suite = ws.suites_mut().add("Smoke", &product, None).unwrap();
        ws.add_case_to_suite(&suite.id, &case.id).unwrap();
        let run = ws.create_run("R", "", &[suite.id.as_str()], None).unwrap();
        ws.runs.get_mut(&run.id).unwrap().test_suites[0]
            .test_cases
            .push(OverlayEntry {
                id: case.test_case_id.clone(),
                result: RunResult::Failed,
            });
        assert_eq!(ws.resolve_run_suite(&run.id, &suite.id)[0].result, CaseResult::Fail);

        ws.record_result(&run.id, &case.id, "Pass").unwrap();

        let resolved = ws.resolve_run_suite(&run.id, &suite.id);
        assert_eq!(resolved[0].result, CaseResult::Pass);
        assert_eq!(resolved[0].source, ResultSource::Overlay);
        assert_eq!(ws.runs.get(&run.id).unwrap().status, RunStatus::Completed);
    }

    #[test]
    fn test_derive_run_status() {
        assert_eq!(derive_run_status(4, 0), RunStatus::NotStarted);
        assert_eq!(derive_run_status(4, 2), RunStatus::InProgress);
        assert_eq!(derive_run_status(4, 4), RunStatus::Completed);
        assert_eq!(derive_run_status(0, 0), RunStatus::NotStarted);
    }

    #[test]
    fn test_completion_percent() {
        assert_eq!(completion_percent(0, 0), 0);
        assert_eq!(completion_percent(1, 3), 33);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(4, 4), 100);
    }
}
