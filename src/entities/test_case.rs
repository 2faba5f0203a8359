//! Test case entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};
use crate::core::result::StoredResult;

/// How a test case is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum TestType {
    #[default]
    Manual,
    Automation,
    #[serde(rename = "WebAPI")]
    WebApi,
    Database,
    Performance,
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestType::Manual => write!(f, "Manual"),
            TestType::Automation => write!(f, "Automation"),
            TestType::WebApi => write!(f, "WebAPI"),
            TestType::Database => write!(f, "Database"),
            TestType::Performance => write!(f, "Performance"),
        }
    }
}

impl std::str::FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(TestType::Manual),
            "automation" => Ok(TestType::Automation),
            "webapi" => Ok(TestType::WebApi),
            "database" => Ok(TestType::Database),
            "performance" => Ok(TestType::Performance),
            _ => Err(format!("Unknown test type: {}", s)),
        }
    }
}

/// A manual procedure step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTestCaseStep {
    /// Unique within the owning case
    pub id: u32,

    /// Action to perform
    pub steps: String,

    /// Expected outcome
    #[serde(default)]
    pub expected_result: String,
}

/// A custom attribute value on a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseAttribute {
    pub key: String,
    pub value: String,
}

/// A test case within one module and one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    /// Internal unique identifier
    pub id: String,

    pub module_id: String,

    pub version: String,

    /// Business key (`TC1001`), unique per module
    pub test_case_id: String,

    pub use_case: String,

    pub scenario: String,

    #[serde(default)]
    pub test_type: TestType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_tool: Option<String>,

    /// Canonical result
    #[serde(default)]
    pub result: StoredResult,

    /// Observed behaviour
    #[serde(default)]
    pub actual: String,

    #[serde(default)]
    pub remarks: String,

    #[serde(default)]
    pub steps: Vec<ManualTestCaseStep>,

    #[serde(default)]
    pub attributes: Vec<TestCaseAttribute>,

    /// Evidence references (file paths or URLs)
    #[serde(default)]
    pub uploads: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for TestCase {
    const KIND: EntityKind = EntityKind::TestCase;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.use_case
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl TestCase {
    /// Value of a custom attribute, if set
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Next free step ID
    pub fn next_step_id(&self) -> u32 {
        self.steps.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    /// Get the number of procedure steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// A test case before it is stored (no internal ID yet)
///
/// Optional fields left empty are filled with defaults on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTestCase {
    pub module_id: String,
    pub version: String,
    /// Generated when absent
    pub test_case_id: Option<String>,
    pub use_case: String,
    pub scenario: String,
    pub test_type: TestType,
    pub test_tool: Option<String>,
    pub result: Option<StoredResult>,
    pub actual: Option<String>,
    pub remarks: Option<String>,
    pub steps: Vec<ManualTestCaseStep>,
    pub attributes: Vec<TestCaseAttribute>,
    pub uploads: Vec<String>,
}

impl NewTestCase {
    /// Start a case for the given module and version
    pub fn new(module_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_test_case_id(mut self, id: impl Into<String>) -> Self {
        self.test_case_id = Some(id.into());
        self
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_case = use_case.into();
        self
    }

    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = scenario.into();
        self
    }

    pub fn with_step(mut self, steps: impl Into<String>, expected: impl Into<String>) -> Self {
        let id = self.steps.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        self.steps.push(ManualTestCaseStep {
            id,
            steps: steps.into(),
            expected_result: expected.into(),
        });
        self
    }

    /// Materialize into a stored case with the given IDs
    pub fn into_case(self, id: String, test_case_id: String) -> TestCase {
        let now = Utc::now();
        TestCase {
            id,
            module_id: self.module_id,
            version: self.version,
            test_case_id,
            use_case: self.use_case,
            scenario: self.scenario,
            test_type: self.test_type,
            test_tool: self.test_tool,
            result: self.result.unwrap_or_default(),
            actual: self.actual.unwrap_or_default(),
            remarks: self.remarks.unwrap_or_default(),
            steps: self.steps,
            attributes: self.attributes,
            uploads: self.uploads,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_case_fills_defaults() {
        let case = NewTestCase::new("mod1", "v1.0")
            .with_use_case("Login")
            .into_case("CASE-1".to_string(), "TC1001".to_string());

        assert_eq!(case.result, StoredResult::Pending);
        assert_eq!(case.actual, "");
        assert_eq!(case.remarks, "");
        assert!(case.uploads.is_empty());
        assert!(case.attributes.is_empty());
        assert!(case.created_at.is_some());
    }

    #[test]
    fn test_test_type_serializes_webapi() {
        let json = serde_json::to_string(&TestType::WebApi).unwrap();
        assert_eq!(json, "\"WebAPI\"");
        assert_eq!("webapi".parse::<TestType>().unwrap(), TestType::WebApi);
    }

    #[test]
    fn test_step_ids_increment() {
        let draft = NewTestCase::new("mod1", "v1.0")
            .with_step("Open page", "Page loads")
            .with_step("Click login", "Dashboard shown");
        assert_eq!(draft.steps[0].id, 1);
        assert_eq!(draft.steps[1].id, 2);

        let case = draft.into_case("CASE-1".into(), "TC1".into());
        assert_eq!(case.next_step_id(), 3);
        assert_eq!(case.step_count(), 2);
    }

    #[test]
    fn test_attribute_lookup() {
        let mut case = NewTestCase::new("mod1", "v1.0").into_case("c".into(), "TC1".into());
        case.attributes.push(TestCaseAttribute {
            key: "browser".into(),
            value: "Chrome".into(),
        });
        assert_eq!(case.attribute("browser"), Some("Chrome"));
        assert_eq!(case.attribute("os"), None);
    }
}
