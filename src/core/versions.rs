//! Version registry - the set of (product, version) pairs

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::error::{LedgerError, LedgerResult};
use crate::core::identity::{normalize_product_id, same_product};
use crate::core::workspace::Workspace;
use crate::entities::version::{compare_versions, is_valid_version, ProductVersion, DEFAULT_VERSION};

/// Registry of versions known for each product
#[derive(Debug, Clone, Default)]
pub struct VersionRegistry {
    versions: Vec<ProductVersion>,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(versions: Vec<ProductVersion>) -> Self {
        let mut registry = Self::new();
        for record in versions {
            let product = normalize_product_id(&record.product_id).to_string();
            if !registry.has_version(&product, &record.version) {
                registry.versions.push(ProductVersion {
                    product_id: product,
                    ..record
                });
            }
        }
        registry
    }

    /// All version records
    pub fn all(&self) -> &[ProductVersion] {
        &self.versions
    }

    /// Register a version for a product; re-adding an existing pair returns it
    pub fn add(&mut self, product_id: &str, version: &str) -> LedgerResult<&ProductVersion> {
        if !is_valid_version(version) {
            return Err(LedgerError::InvalidVersion(version.to_string()));
        }
        let product = normalize_product_id(product_id);

        let index = match self
            .versions
            .iter()
            .position(|v| v.product_id == product && v.version == version)
        {
            Some(existing) => existing,
            None => {
                debug!(product, version, "registering version");
                self.versions.push(ProductVersion::new(product, version));
                self.versions.len() - 1
            }
        };
        Ok(&self.versions[index])
    }

    /// Remove a version record only; see [`Workspace::remove_version`] for reassignment
    pub fn remove(&mut self, product_id: &str, version: &str) -> bool {
        let product = normalize_product_id(product_id);
        let before = self.versions.len();
        self.versions
            .retain(|v| !(v.product_id == product && v.version == version));
        self.versions.len() != before
    }

    /// Version strings of a product in numeric-aware order
    pub fn list_by_product(&self, product_id: &str) -> Vec<String> {
        let product = normalize_product_id(product_id);
        let mut versions: Vec<String> = self
            .versions
            .iter()
            .filter(|v| normalize_product_id(&v.product_id) == product)
            .map(|v| v.version.clone())
            .collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }

    /// Latest known version of a product
    pub fn latest(&self, product_id: &str) -> Option<String> {
        self.list_by_product(product_id).pop()
    }

    pub fn has_version(&self, product_id: &str, version: &str) -> bool {
        let product = normalize_product_id(product_id);
        self.versions
            .iter()
            .any(|v| normalize_product_id(&v.product_id) == product && v.version == version)
    }

    /// Products that have at least one version
    fn products(&self) -> BTreeSet<&str> {
        self.versions
            .iter()
            .map(|v| normalize_product_id(&v.product_id))
            .collect()
    }
}

impl Workspace {
    /// Remove a version and move everything pinned to it onto a fallback
    ///
    /// Modules and cases of the product on the removed version move to the
    /// latest remaining version, or to `v1.0` when none remain. The fallback
    /// is registered so nothing points at a missing version.
    pub fn remove_version(&mut self, product_id: &str, version: &str) -> bool {
        if !self.versions.remove(product_id, version) {
            return false;
        }

        let fallback = self
            .versions
            .latest(product_id)
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let affected_modules: Vec<String> = self
            .modules
            .list_by_product(product_id)
            .into_iter()
            .map(|m| m.id.clone())
            .collect();

        let mut reassigned = 0usize;
        for module in self.modules.iter_mut() {
            if same_product(&module.product_id, product_id) && module.version == version {
                module.version = fallback.clone();
                reassigned += 1;
            }
        }
        for case in self.cases.iter_mut() {
            if affected_modules.contains(&case.module_id) && case.version == version {
                case.version = fallback.clone();
                reassigned += 1;
            }
        }

        if reassigned > 0 || !affected_modules.is_empty() {
            // fallback is either already registered or the valid default
            let _ = self.versions.add(product_id, &fallback);
        }

        debug!(
            product = product_id,
            removed = version,
            fallback = %fallback,
            reassigned,
            "removed version"
        );
        true
    }

    /// Make sure every product with modules has at least one version
    pub fn ensure_default_versions(&mut self) {
        let versioned: BTreeSet<String> = self
            .versions
            .products()
            .into_iter()
            .map(String::from)
            .collect();
        let missing: BTreeSet<String> = self
            .modules
            .all()
            .iter()
            .map(|m| normalize_product_id(&m.product_id).to_string())
            .filter(|p| !versioned.contains(p))
            .collect();

        for product in missing {
            debug!(product = %product, "synthesizing default version");
            let _ = self.versions.add(&product, DEFAULT_VERSION);
        }
    }

    /// Register every version referenced by modules and test cases
    ///
    /// Additive: versions added explicitly are never dropped here. Malformed
    /// legacy version strings are left for the integrity scan to report.
    pub fn recompute_versions(&mut self) {
        let mut pairs: Vec<(String, String)> = self
            .modules
            .all()
            .iter()
            .map(|m| (m.product_id.clone(), m.version.clone()))
            .collect();
        for case in self.cases.all() {
            if let Some(module) = self.modules.get(&case.module_id) {
                pairs.push((module.product_id.clone(), case.version.clone()));
            }
        }

        for (product, version) in pairs {
            if is_valid_version(&version) {
                let _ = self.versions.add(&product, &version);
            }
        }
        self.ensure_default_versions();
    }

    /// Distinct case versions inside a module, numeric-aware order
    pub fn versions_by_module(&self, module_id: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .cases
            .by_module(module_id)
            .into_iter()
            .map(|c| c.version.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = VersionRegistry::new();
        registry.add("1", "v1.0").unwrap();
        registry.add("1", "v1.0").unwrap();
        assert_eq!(registry.all().len(), 1);
    }

    #[test]
    fn test_add_rejects_bad_format() {
        let mut registry = VersionRegistry::new();
        let err = registry.add("1", "1.0").unwrap_err();
        assert_eq!(err, LedgerError::InvalidVersion("1.0".to_string()));
        assert!(registry.all().is_empty());
    }

    #[test]
    fn test_normalization_symmetry() {
        let mut registry = VersionRegistry::new();
        registry.add("p5", "v1.0").unwrap();
        registry.add("5", "v2.0").unwrap();
        assert_eq!(registry.list_by_product("5"), registry.list_by_product("p5"));
        assert_eq!(registry.list_by_product("5"), vec!["v1.0", "v2.0"]);
        assert_eq!(registry.all()[0].product_id, "5");
    }

    #[test]
    fn test_list_sorted_numerically() {
        let mut registry = VersionRegistry::new();
        for v in ["v1.10", "v1.9", "v1.2", "v2.0"] {
            registry.add("1", v).unwrap();
        }
        assert_eq!(
            registry.list_by_product("1"),
            vec!["v1.2", "v1.9", "v1.10", "v2.0"]
        );
        assert_eq!(registry.latest("1").as_deref(), Some("v2.0"));
    }

    #[test]
    fn test_remove() {
        let mut registry = VersionRegistry::new();
        registry.add("1", "v1.0").unwrap();
        assert!(registry.remove("p1", "v1.0"));
        assert!(!registry.remove("1", "v1.0"));
        assert!(registry.latest("1").is_none());
    }

    #[test]
    fn test_from_records_normalizes_and_dedupes() {
        let registry = VersionRegistry::from_records(vec![
            ProductVersion::new("p1", "v1.0"),
            ProductVersion::new("1", "v1.0"),
        ]);
        assert_eq!(registry.all().len(), 1);
        assert!(registry.has_version("1", "v1.0"));
    }
}
