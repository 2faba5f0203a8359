//! Test suite entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};
use crate::core::identity::{new_id, IdPrefix};
use crate::entities::product::default_active;
use crate::entities::test_case::TestCase;

/// Lightweight pointer to a test case, resolved at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRef {
    /// Internal case ID, absent in legacy refs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Business ID
    pub test_case_id: String,

    pub module_id: String,

    pub version: String,
}

impl TestCaseRef {
    /// Whether this ref points at the given case
    pub fn matches(&self, case: &TestCase) -> bool {
        self.test_case_id == case.test_case_id && self.module_id == case.module_id
    }

    /// Whether two refs denote the same membership
    pub fn same_target(&self, other: &TestCaseRef) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) if a == b => true,
            _ => self.test_case_id == other.test_case_id && self.module_id == other.module_id,
        }
    }
}

impl From<&TestCase> for TestCaseRef {
    fn from(case: &TestCase) -> Self {
        Self {
            id: Some(case.id.clone()),
            test_case_id: case.test_case_id.clone(),
            module_id: case.module_id.clone(),
            version: case.version.clone(),
        }
    }
}

/// A named, ordered set of case references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub id: String,

    pub product_id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub test_cases: Vec<TestCaseRef>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Entity for TestSuite {
    const KIND: EntityKind = EntityKind::Suite;

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

impl TestSuite {
    pub fn new(name: &str, product_id: &str, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(IdPrefix::Suite),
            product_id: product_id.to_string(),
            name: name.to_string(),
            description,
            test_cases: Vec::new(),
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    /// Get the number of case references
    pub fn case_count(&self) -> usize {
        self.test_cases.len()
    }
}

/// Merge-patch for a suite
#[derive(Debug, Clone, Default)]
pub struct SuitePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub test_cases: Option<Vec<TestCaseRef>>,
}
