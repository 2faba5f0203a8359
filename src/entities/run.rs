//! Test run entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};
use crate::core::identity::{new_id, IdPrefix};
use crate::core::result::RunResult;
use crate::entities::suite::TestSuite;

/// Default `createdBy` when no author is configured
pub const DEFAULT_CREATED_BY: &str = "currentUser";

/// Execution status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum RunStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Blocked,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::NotStarted => write!(f, "Not Started"),
            RunStatus::InProgress => write!(f, "In Progress"),
            RunStatus::Completed => write!(f, "Completed"),
            RunStatus::Blocked => write!(f, "Blocked"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "not started" => Ok(RunStatus::NotStarted),
            "in progress" => Ok(RunStatus::InProgress),
            "completed" => Ok(RunStatus::Completed),
            "blocked" => Ok(RunStatus::Blocked),
            _ => Err(format!("Unknown run status: {}", s)),
        }
    }
}

/// Run-scoped result for one case (the overlay)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEntry {
    /// Case ID the result was recorded under
    pub id: String,
    pub result: RunResult,
}

/// Snapshot of a suite inside a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteRef {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub test_cases: Vec<OverlayEntry>,
}

impl TestSuiteRef {
    /// Snapshot a suite with an empty overlay
    pub fn snapshot(suite: &TestSuite) -> Self {
        Self {
            id: suite.id.clone(),
            name: suite.name.clone(),
            test_cases: Vec::new(),
        }
    }

    /// Overlay entry for the first key that has one; earlier keys win
    pub fn overlay_for(&self, keys: &[&str]) -> Option<RunResult> {
        keys.iter().find_map(|key| {
            self.test_cases
                .iter()
                .find(|entry| entry.id == *key)
                .map(|entry| entry.result)
        })
    }
}

/// An execution of one or more suites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub id: String,

    pub product_id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub test_suites: Vec<TestSuiteRef>,

    #[serde(default)]
    pub status: RunStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub created_by: String,
}

impl Entity for TestRun {
    const KIND: EntityKind = EntityKind::Run;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

impl TestRun {
    /// Create a run from the given suites; the caller checks `suites` is non-empty
    pub fn new(name: &str, description: &str, suites: &[TestSuite], created_by: &str) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(IdPrefix::Run),
            product_id: suites
                .first()
                .map(|s| s.product_id.clone())
                .unwrap_or_default(),
            name: name.to_string(),
            description: description.to_string(),
            test_suites: suites.iter().map(TestSuiteRef::snapshot).collect(),
            status: RunStatus::NotStarted,
            created_at: now,
            updated_at: now,
            created_by: created_by.to_string(),
        }
    }

    /// Snapshot of a suite within this run
    pub fn suite(&self, suite_id: &str) -> Option<&TestSuiteRef> {
        self.test_suites.iter().find(|s| s.id == suite_id)
    }

    /// Overlay result recorded anywhere in the run
    ///
    /// Every suite is searched for the first key before the next key is tried.
    pub fn overlay_anywhere(&self, keys: &[&str]) -> Option<RunResult> {
        keys.iter().find_map(|key| {
            self.test_suites
                .iter()
                .find_map(|s| s.overlay_for(&[*key]))
        })
    }
}

/// Merge-patch for a run
#[derive(Debug, Clone, Default)]
pub struct RunPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Replacing suites re-snapshots them and drops the prior overlay
    pub test_suites: Option<Vec<TestSuite>>,
    pub status: Option<RunStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_with_spaces() {
        let json = serde_json::to_string(&RunStatus::NotStarted).unwrap();
        assert_eq!(json, "\"Not Started\"");
        let parsed: RunStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, RunStatus::InProgress);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("not-started".parse::<RunStatus>().unwrap(), RunStatus::NotStarted);
        assert_eq!("In Progress".parse::<RunStatus>().unwrap(), RunStatus::InProgress);
        assert!("done".parse::<RunStatus>().is_err());
    }

    #[test]
    fn test_new_run_takes_product_from_first_suite() {
        let first = TestSuite::new("Login", "1", None);
        let second = TestSuite::new("Reports", "2", None);
        let run = TestRun::new("Regression", "", &[first.clone(), second], "qa");

        assert!(run.id.starts_with("RUN-"));
        assert_eq!(run.product_id, "1");
        assert_eq!(run.test_suites.len(), 2);
        assert_eq!(run.test_suites[0].id, first.id);
        assert!(run.test_suites[0].test_cases.is_empty());
        assert_eq!(run.status, RunStatus::NotStarted);
    }

    #[test]
    fn test_overlay_lookup() {
        let suite = TestSuite::new("Login", "1", None);
        let mut run = TestRun::new("R", "", &[suite], "qa");
        run.test_suites[0].test_cases.push(OverlayEntry {
            id: "CASE-1".into(),
            result: RunResult::Passed,
        });

        assert_eq!(run.overlay_anywhere(&["CASE-1"]), Some(RunResult::Passed));
        assert_eq!(run.overlay_anywhere(&["TC1", "CASE-1"]), Some(RunResult::Passed));
        assert_eq!(run.overlay_anywhere(&["CASE-2"]), None);
    }

    #[test]
    fn test_internal_id_wins_over_legacy_entry() {
        let first = TestSuite::new("Login", "1", None);
        let second = TestSuite::new("Reports", "1", None);
        let mut run = TestRun::new("R", "", &[first, second], "qa");
        run.test_suites[0].test_cases.push(OverlayEntry {
            id: "TC7".into(),
            result: RunResult::Failed,
        });
        run.test_suites[1].test_cases.push(OverlayEntry {
            id: "CASE-7".into(),
            result: RunResult::Passed,
        });
        run.test_suites[0].test_cases.push(OverlayEntry {
            id: "CASE-7".into(),
            result: RunResult::Skipped,
        });

        assert_eq!(
            run.test_suites[0].overlay_for(&["CASE-7", "TC7"]),
            Some(RunResult::Skipped)
        );
        assert_eq!(
            run.overlay_anywhere(&["CASE-8", "TC7"]),
            Some(RunResult::Failed)
        );

        run.test_suites[0].test_cases.pop();
        assert_eq!(
            run.overlay_anywhere(&["CASE-7", "TC7"]),
            Some(RunResult::Passed)
        );
    }
}
