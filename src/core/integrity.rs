//! Read-only consistency scan over a workspace

use serde::Serialize;
use tracing::{error, warn};

use crate::core::workspace::Workspace;

/// A case whose `(product, version)` is not registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionReference {
    pub case_id: String,
    pub product_id: String,
    pub version: String,
}

/// A suite ref that no longer resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenRef {
    pub suite_id: String,
    pub test_case_id: String,
}

/// An attribute key a case carries that its module's schema does not declare
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndeclaredAttribute {
    pub case_id: String,
    pub module_id: String,
    pub key: String,
}

/// Findings of [`scan`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// Cases whose module does not exist
    pub orphaned_cases: Vec<String>,
    /// Modules without any case
    pub empty_modules: Vec<String>,
    pub invalid_versions: Vec<VersionReference>,
    /// Modules whose product does not exist
    pub ownerless_modules: Vec<String>,
    pub broken_suite_refs: Vec<BrokenRef>,
    pub undeclared_attributes: Vec<UndeclaredAttribute>,
}

impl IntegrityReport {
    pub fn issue_count(&self) -> usize {
        self.orphaned_cases.len()
            + self.empty_modules.len()
            + self.invalid_versions.len()
            + self.ownerless_modules.len()
            + self.broken_suite_refs.len()
            + self.undeclared_attributes.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    /// Emit one event per finding
    pub fn log(&self) {
        for case in &self.orphaned_cases {
            error!(case = %case, "orphaned test case: module does not exist");
        }
        for module in &self.empty_modules {
            warn!(module = %module, "module has no test cases");
        }
        for r in &self.invalid_versions {
            warn!(
                case = %r.case_id,
                product = %r.product_id,
                version = %r.version,
                "test case references an unregistered version"
            );
        }
        for module in &self.ownerless_modules {
            warn!(module = %module, "module belongs to a missing product");
        }
        for r in &self.broken_suite_refs {
            warn!(suite = %r.suite_id, case = %r.test_case_id, "suite references a missing test case");
        }
        for a in &self.undeclared_attributes {
            warn!(case = %a.case_id, module = %a.module_id, key = %a.key, "attribute not declared by module");
        }
    }
}

/// Scan a workspace for dangling references; never mutates
pub fn scan(workspace: &Workspace) -> IntegrityReport {
    let modules = workspace.modules();
    let cases = workspace.cases();
    let mut report = IntegrityReport::default();

    for case in cases.all() {
        let Some(module) = modules.get(&case.module_id) else {
            report.orphaned_cases.push(case.id.clone());
            continue;
        };
        if !workspace
            .versions()
            .has_version(&module.product_id, &case.version)
        {
            report.invalid_versions.push(VersionReference {
                case_id: case.id.clone(),
                product_id: module.product_id.clone(),
                version: case.version.clone(),
            });
        }
        if module.has_schema() {
            for attribute in &case.attributes {
                if !module.declares(&attribute.key) {
                    report.undeclared_attributes.push(UndeclaredAttribute {
                        case_id: case.id.clone(),
                        module_id: module.id.clone(),
                        key: attribute.key.clone(),
                    });
                }
            }
        }
    }

    for module in modules.all() {
        if cases.by_module(&module.id).is_empty() {
            report.empty_modules.push(module.id.clone());
        }
        if workspace.products().get(&module.product_id).is_none() {
            report.ownerless_modules.push(module.id.clone());
        }
    }

    report.broken_suite_refs = workspace
        .suites()
        .broken_refs(cases)
        .into_iter()
        .map(|(suite_id, test_case_id)| BrokenRef {
            suite_id,
            test_case_id,
        })
        .collect();

    report
}
