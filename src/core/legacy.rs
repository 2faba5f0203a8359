//! Load-time adapters for older record shapes
//!
//! Persisted data has drifted over time: steps stored as one string, runs
//! without a product, results in either vocabulary, date-only timestamps.
//! Each `*Record` type accepts every shape seen in the wild and converts
//! into the one current entity type. Business logic only sees the current
//! shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::core::identity::{generate_version_id, normalize_product_id};
use crate::core::result::{CaseResult, RunResult, StoredResult};
use crate::entities::module::{ModuleAttribute, ProductModule};
use crate::entities::product::Product;
use crate::entities::run::{OverlayEntry, RunStatus, TestRun, TestSuiteRef, DEFAULT_CREATED_BY};
use crate::entities::suite::{TestCaseRef, TestSuite};
use crate::entities::test_case::{ManualTestCaseStep, TestCase, TestCaseAttribute, TestType};
use crate::entities::version::{ProductVersion, DEFAULT_VERSION};

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn timestamp(raw: &Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref().and_then(parse_timestamp)
}

/// Result in any spelling; unknown or missing values are Pending
fn stored_result(raw: Option<&str>) -> StoredResult {
    match raw {
        Some(raw) => StoredResult::parse(raw)
            .unwrap_or_else(|| CaseResult::parse_lenient(raw).into()),
        None => StoredResult::Pending,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product {
            created_at: timestamp(&record.created_at),
            id: record.id,
            name: record.name,
            description: record.description,
            is_active: record.is_active.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub product_id: String,
    pub version: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<VersionRecord> for ProductVersion {
    /// The ID is re-derived so older ID schemes converge
    fn from(record: VersionRecord) -> Self {
        let product = normalize_product_id(&record.product_id).to_string();
        ProductVersion {
            id: generate_version_id(&product, &record.version),
            created_at: timestamp(&record.created_at),
            product_id: product,
            version: record.version,
            is_active: record.is_active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub version: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub attributes: Option<Vec<ModuleAttribute>>,
}

impl From<ModuleRecord> for ProductModule {
    fn from(record: ModuleRecord) -> Self {
        ProductModule {
            created_at: timestamp(&record.created_at),
            id: record.id,
            product_id: record.product_id,
            version: record.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            name: record.name,
            description: record.description,
            is_active: record.is_active.unwrap_or(true),
            attributes: record.attributes.unwrap_or_default(),
        }
    }
}

/// Step list in either of its historical shapes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StepsField {
    /// One free-text procedure
    Text(String),
    /// Structured steps, ids possibly missing
    List(Vec<StepRecord>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub expected_result: String,
}

impl StepsField {
    /// Convert to structured steps
    ///
    /// `expected` is the legacy case-level expected text; it becomes the
    /// expected result of a single text step.
    pub fn into_steps(self, expected: Option<String>) -> Vec<ManualTestCaseStep> {
        match self {
            StepsField::Text(text) => {
                let expected = expected.unwrap_or_default();
                if text.trim().is_empty() && expected.trim().is_empty() {
                    return Vec::new();
                }
                vec![ManualTestCaseStep {
                    id: 1,
                    steps: text,
                    expected_result: expected,
                }]
            }
            StepsField::List(records) => {
                let mut next = records.iter().filter_map(|s| s.id).max().unwrap_or(0);
                records
                    .into_iter()
                    .map(|record| {
                        let id = record.id.unwrap_or_else(|| {
                            next += 1;
                            next
                        });
                        ManualTestCaseStep {
                            id,
                            steps: record.steps,
                            expected_result: record.expected_result,
                        }
                    })
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRecord {
    pub id: String,
    pub module_id: String,
    #[serde(default)]
    pub version: Option<String>,
    pub test_case_id: String,
    #[serde(default)]
    pub use_case: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub test_tool: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub steps: Option<StepsField>,
    /// Case-level expected text from the single-string step era
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub attributes: Option<Vec<TestCaseAttribute>>,
    #[serde(default)]
    pub uploads: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<TestCaseRecord> for TestCase {
    fn from(record: TestCaseRecord) -> Self {
        let steps = match record.steps {
            Some(field) => field.into_steps(record.expected),
            None => StepsField::Text(String::new()).into_steps(record.expected),
        };
        TestCase {
            created_at: timestamp(&record.created_at),
            updated_at: timestamp(&record.updated_at),
            result: stored_result(record.result.as_deref()),
            test_type: record
                .test_type
                .and_then(|t| t.parse::<TestType>().ok())
                .unwrap_or_default(),
            id: record.id,
            module_id: record.module_id,
            version: record.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            test_case_id: record.test_case_id,
            use_case: record.use_case,
            scenario: record.scenario,
            test_tool: record.test_tool,
            actual: record.actual.unwrap_or_default(),
            remarks: record.remarks.unwrap_or_default(),
            steps,
            attributes: record.attributes.unwrap_or_default(),
            uploads: record.uploads.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRecord {
    pub id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCaseRef>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl SuiteRecord {
    /// Convert, taking a missing product from the first ref whose module is known
    pub fn adapt(self, modules: &[ProductModule]) -> TestSuite {
        let product_id = self.product_id.unwrap_or_else(|| {
            self.test_cases
                .iter()
                .find_map(|r| modules.iter().find(|m| m.id == r.module_id))
                .map(|m| m.product_id.clone())
                .unwrap_or_default()
        });
        let created_at = timestamp(&self.created_at).unwrap_or_else(Utc::now);
        TestSuite {
            id: self.id,
            product_id,
            name: self.name,
            description: self.description,
            test_cases: self.test_cases,
            updated_at: timestamp(&self.updated_at).unwrap_or(created_at),
            created_at,
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRecord {
    pub id: String,
    pub result: String,
}

impl From<OverlayRecord> for OverlayEntry {
    fn from(record: OverlayRecord) -> Self {
        let result = match StoredResult::parse(&record.result) {
            Some(stored) => stored.normalize().to_run(),
            None => RunResult::Pending,
        };
        OverlayEntry {
            id: record.id,
            result,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRefRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub test_cases: Option<Vec<OverlayRecord>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub test_suites: Vec<SuiteRefRecord>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl RunRecord {
    /// Convert, taking a missing product from the first suite found in `suites`
    pub fn adapt(self, suites: &[TestSuite]) -> TestRun {
        let product_id = self.product_id.unwrap_or_else(|| {
            self.test_suites
                .iter()
                .find_map(|r| suites.iter().find(|s| s.id == r.id))
                .map(|s| s.product_id.clone())
                .unwrap_or_default()
        });
        let created_at = timestamp(&self.created_at).unwrap_or_else(Utc::now);
        TestRun {
            id: self.id,
            product_id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            test_suites: self
                .test_suites
                .into_iter()
                .map(|r| TestSuiteRef {
                    id: r.id,
                    name: r.name,
                    test_cases: r
                        .test_cases
                        .unwrap_or_default()
                        .into_iter()
                        .map(OverlayEntry::from)
                        .collect(),
                })
                .collect(),
            status: self
                .status
                .and_then(|s| s.parse::<RunStatus>().ok())
                .unwrap_or_default(),
            updated_at: timestamp(&self.updated_at).unwrap_or(created_at),
            created_at,
            created_by: self
                .created_by
                .unwrap_or_else(|| DEFAULT_CREATED_BY.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_steps_become_one_step() {
        let record: TestCaseRecord = serde_json::from_str(
            r#"{
                "id": "1", "slNo": 1, "moduleId": "mod1", "version": "v1.0",
                "testCaseId": "TC101", "useCase": "Login", "scenario": "valid",
                "steps": "1. Enter username\n2. Click login",
                "expected": "Dashboard shown",
                "result": "Pending"
            }"#,
        )
        .unwrap();
        let case = TestCase::from(record);

        assert_eq!(case.steps.len(), 1);
        assert_eq!(case.steps[0].id, 1);
        assert_eq!(case.steps[0].expected_result, "Dashboard shown");
        assert!(case.uploads.is_empty());
        assert_eq!(case.actual, "");
        assert_eq!(case.test_type, TestType::Manual);
    }

    #[test]
    fn test_step_list_renumbers_missing_ids() {
        let record: TestCaseRecord = serde_json::from_str(
            r#"{
                "id": "2", "moduleId": "mod1", "testCaseId": "TC102",
                "steps": [
                    {"id": 4, "steps": "open", "expectedResult": "opened"},
                    {"steps": "close", "expectedResult": "closed"}
                ]
            }"#,
        )
        .unwrap();
        let case = TestCase::from(record);

        assert_eq!(case.version, DEFAULT_VERSION);
        let ids: Vec<u32> = case.steps.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_result_tolerates_any_spelling() {
        assert_eq!(stored_result(Some("Skipped")), StoredResult::Skipped);
        assert_eq!(stored_result(Some("pass")), StoredResult::Pass);
        assert_eq!(stored_result(Some("nonsense")), StoredResult::Pending);
        assert_eq!(stored_result(None), StoredResult::Pending);
    }

    #[test]
    fn test_parse_timestamp_accepts_dates() {
        assert!(parse_timestamp("2025-01-15").is_some());
        assert!(parse_timestamp("2025-01-15T10:00:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_version_id_rederived() {
        let record: VersionRecord =
            serde_json::from_str(r#"{"productId": "p2", "version": "v1.1"}"#).unwrap();
        let version = ProductVersion::from(record);
        assert_eq!(version.product_id, "2");
        assert_eq!(version.id, "ver_2_v1_1");
    }

    #[test]
    fn test_suite_without_product_uses_module() {
        let modules = vec![ProductModule {
            id: "mod1".into(),
            ..ProductModule::new("Login", "1", "v1.0")
        }];
        let record: SuiteRecord = serde_json::from_str(
            r#"{
                "id": "suite1", "name": "Login suite",
                "testCases": [{"testCaseId": "TC101", "moduleId": "mod1", "version": "v1.0"}],
                "createdAt": "2025-01-15"
            }"#,
        )
        .unwrap();
        let suite = record.adapt(&modules);

        assert_eq!(suite.product_id, "1");
        assert!(suite.is_active);
        assert_eq!(suite.updated_at, suite.created_at);
    }

    #[test]
    fn test_run_without_product_or_overlay() {
        let suites = vec![TestSuite {
            id: "suite1".into(),
            ..TestSuite::new("Login suite", "1", None)
        }];
        let record: RunRecord = serde_json::from_str(
            r#"{
                "id": "run1", "name": "Login run", "description": "regression",
                "testSuites": [{"id": "suite1", "name": "Login suite"}],
                "status": "Completed",
                "createdBy": "admin@test.com"
            }"#,
        )
        .unwrap();
        let run = record.adapt(&suites);

        assert_eq!(run.product_id, "1");
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.test_suites[0].test_cases.is_empty());
    }

    #[test]
    fn test_overlay_accepts_ui_vocabulary() {
        let entry = OverlayEntry::from(OverlayRecord {
            id: "1".into(),
            result: "Blocked".into(),
        });
        assert_eq!(entry.result, RunResult::Skipped);
    }
}
