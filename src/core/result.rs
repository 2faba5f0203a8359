//! Result vocabulary and the mappings between its three forms
//!
//! - [`CaseResult`]: what a tester picks (`Pass`, `Fail`, `Pending`, `Blocked`)
//! - [`RunResult`]: what a run overlay stores (`Passed`, `Failed`, `Skipped`, `Pending`)
//! - [`StoredResult`]: the merged superset found on test cases, for legacy data

use serde::{Deserialize, Serialize};

/// UI-level result of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
pub enum CaseResult {
    Pass,
    Fail,
    #[default]
    Pending,
    Blocked,
}

impl CaseResult {
    pub const ALL: [CaseResult; 4] = [
        CaseResult::Pass,
        CaseResult::Fail,
        CaseResult::Pending,
        CaseResult::Blocked,
    ];

    /// Map to the storage-level vocabulary
    pub fn to_run(self) -> RunResult {
        match self {
            CaseResult::Pass => RunResult::Passed,
            CaseResult::Fail => RunResult::Failed,
            CaseResult::Blocked => RunResult::Skipped,
            CaseResult::Pending => RunResult::Pending,
        }
    }

    /// Parse any known spelling, case-insensitively; unknown input is Pending
    pub fn parse_lenient(raw: &str) -> CaseResult {
        match raw.trim().to_lowercase().as_str() {
            "pass" | "passed" => CaseResult::Pass,
            "fail" | "failed" => CaseResult::Fail,
            "blocked" | "skipped" => CaseResult::Blocked,
            _ => CaseResult::Pending,
        }
    }

    /// Whether a run counts this result as executed
    pub fn is_completed(self) -> bool {
        matches!(self, CaseResult::Pass | CaseResult::Fail)
    }
}

impl std::fmt::Display for CaseResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseResult::Pass => write!(f, "Pass"),
            CaseResult::Fail => write!(f, "Fail"),
            CaseResult::Pending => write!(f, "Pending"),
            CaseResult::Blocked => write!(f, "Blocked"),
        }
    }
}

impl std::str::FromStr for CaseResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(CaseResult::Pass),
            "fail" => Ok(CaseResult::Fail),
            "pending" => Ok(CaseResult::Pending),
            "blocked" => Ok(CaseResult::Blocked),
            _ => Err(format!("Unknown result: {}. Use Pass/Fail/Pending/Blocked", s)),
        }
    }
}

/// Storage-level result kept in a run's overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum RunResult {
    Passed,
    Failed,
    Skipped,
    #[default]
    Pending,
}

impl RunResult {
    pub const ALL: [RunResult; 4] = [
        RunResult::Passed,
        RunResult::Failed,
        RunResult::Skipped,
        RunResult::Pending,
    ];

    /// Map back to the UI-level vocabulary
    pub fn to_case(self) -> CaseResult {
        match self {
            RunResult::Passed => CaseResult::Pass,
            RunResult::Failed => CaseResult::Fail,
            RunResult::Skipped => CaseResult::Blocked,
            RunResult::Pending => CaseResult::Pending,
        }
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunResult::Passed => write!(f, "Passed"),
            RunResult::Failed => write!(f, "Failed"),
            RunResult::Skipped => write!(f, "Skipped"),
            RunResult::Pending => write!(f, "Pending"),
        }
    }
}

/// Result field of a test case: either vocabulary is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
pub enum StoredResult {
    Pass,
    Fail,
    Blocked,
    #[default]
    Pending,
    Passed,
    Failed,
    Skipped,
}

impl StoredResult {
    pub const ALL: [StoredResult; 7] = [
        StoredResult::Pass,
        StoredResult::Fail,
        StoredResult::Blocked,
        StoredResult::Pending,
        StoredResult::Passed,
        StoredResult::Failed,
        StoredResult::Skipped,
    ];

    /// Collapse to the UI-level vocabulary
    pub fn normalize(self) -> CaseResult {
        match self {
            StoredResult::Pass | StoredResult::Passed => CaseResult::Pass,
            StoredResult::Fail | StoredResult::Failed => CaseResult::Fail,
            StoredResult::Blocked | StoredResult::Skipped => CaseResult::Blocked,
            StoredResult::Pending => CaseResult::Pending,
        }
    }

    /// Parse any of the seven spellings, case-insensitively
    pub fn parse(raw: &str) -> Option<StoredResult> {
        StoredResult::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoredResult::Pass => "Pass",
            StoredResult::Fail => "Fail",
            StoredResult::Blocked => "Blocked",
            StoredResult::Pending => "Pending",
            StoredResult::Passed => "Passed",
            StoredResult::Failed => "Failed",
            StoredResult::Skipped => "Skipped",
        }
    }
}

impl std::fmt::Display for StoredResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<CaseResult> for StoredResult {
    fn from(result: CaseResult) -> Self {
        match result {
            CaseResult::Pass => StoredResult::Pass,
            CaseResult::Fail => StoredResult::Fail,
            CaseResult::Pending => StoredResult::Pending,
            CaseResult::Blocked => StoredResult::Blocked,
        }
    }
}

impl From<RunResult> for StoredResult {
    fn from(result: RunResult) -> Self {
        match result {
            RunResult::Passed => StoredResult::Passed,
            RunResult::Failed => StoredResult::Failed,
            RunResult::Skipped => StoredResult::Skipped,
            RunResult::Pending => StoredResult::Pending,
        }
    }
}

/// Resolve the result a run reports for a case
///
/// A run's overlay wins; without one the canonical case result is used.
pub fn reconcile_result(overlay: Option<RunResult>, canonical: StoredResult) -> CaseResult {
    match overlay {
        Some(result) => result.to_case(),
        None => canonical.normalize(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_to_run_and_back() {
        for result in CaseResult::ALL {
            assert_eq!(result.to_run().to_case(), result);
        }
        assert_eq!(CaseResult::Blocked.to_run(), RunResult::Skipped);
        assert_eq!(RunResult::Skipped.to_case(), CaseResult::Blocked);
    }

    #[test]
    fn test_run_to_case_and_back() {
        for result in RunResult::ALL {
            assert_eq!(result.to_case().to_run(), result);
        }
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(CaseResult::parse_lenient("passed"), CaseResult::Pass);
        assert_eq!(CaseResult::parse_lenient("PASS"), CaseResult::Pass);
        assert_eq!(CaseResult::parse_lenient("Failed"), CaseResult::Fail);
        assert_eq!(CaseResult::parse_lenient("skipped"), CaseResult::Blocked);
        assert_eq!(CaseResult::parse_lenient("Blocked"), CaseResult::Blocked);
        assert_eq!(CaseResult::parse_lenient("whatever"), CaseResult::Pending);
        assert_eq!(CaseResult::parse_lenient(""), CaseResult::Pending);
    }

    #[test]
    fn test_stored_normalize() {
        assert_eq!(StoredResult::Passed.normalize(), CaseResult::Pass);
        assert_eq!(StoredResult::Pass.normalize(), CaseResult::Pass);
        assert_eq!(StoredResult::Skipped.normalize(), CaseResult::Blocked);
        assert_eq!(StoredResult::Pending.normalize(), CaseResult::Pending);
    }

    #[test]
    fn test_stored_parse() {
        assert_eq!(StoredResult::parse("skipped"), Some(StoredResult::Skipped));
        assert_eq!(StoredResult::parse("Pass"), Some(StoredResult::Pass));
        assert_eq!(StoredResult::parse("maybe"), None);
    }

    #[test]
    fn test_stored_serializes_as_plain_string() {
        let json = serde_json::to_string(&StoredResult::Passed).unwrap();
        assert_eq!(json, "\"Passed\"");
        let parsed: StoredResult = serde_json::from_str("\"Blocked\"").unwrap();
        assert_eq!(parsed, StoredResult::Blocked);
    }

    #[test]
    fn test_reconcile_overlay_wins() {
        assert_eq!(
            reconcile_result(Some(RunResult::Failed), StoredResult::Pass),
            CaseResult::Fail
        );
        assert_eq!(reconcile_result(None, StoredResult::Passed), CaseResult::Pass);
        assert_eq!(reconcile_result(None, StoredResult::Pending), CaseResult::Pending);
    }

    #[test]
    fn test_completed_results() {
        assert!(CaseResult::Pass.is_completed());
        assert!(CaseResult::Fail.is_completed());
        assert!(!CaseResult::Pending.is_completed());
        assert!(!CaseResult::Blocked.is_completed());
    }
}
