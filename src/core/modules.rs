//! Module directory - the modules of each product

use tracing::debug;

use crate::core::entity::{find_by_id, find_by_id_mut, remove_by_id, EntityKind};
use crate::core::error::{LedgerError, LedgerResult};
use crate::core::identity::{new_id, same_product, IdPrefix};
use crate::core::workspace::Workspace;
use crate::entities::module::{ModuleAttribute, ModulePatch, NewAttribute, ProductModule};
use crate::entities::test_case::NewTestCase;
use crate::entities::version::{is_valid_version, DEFAULT_VERSION};

/// Placeholder text of the case seeded into every new module
pub const SEED_USE_CASE: &str = "Initial test case for new module";
pub const SEED_VERSION_USE_CASE: &str = "Initial test case for new version";
pub const SEED_SCENARIO: &str = "Initial scenario";
pub const SEED_STEPS: &str = "Initial steps";
pub const SEED_EXPECTED: &str = "Initial expectation";

/// Directory of product modules
#[derive(Debug, Clone, Default)]
pub struct ModuleDirectory {
    modules: Vec<ProductModule>,
}

impl ModuleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(modules: Vec<ProductModule>) -> Self {
        Self { modules }
    }

    pub fn all(&self) -> &[ProductModule] {
        &self.modules
    }

    pub fn get(&self, id: &str) -> Option<&ProductModule> {
        find_by_id(&self.modules, id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ProductModule> {
        self.modules.iter_mut()
    }

    pub(crate) fn insert(&mut self, module: ProductModule) {
        self.modules.push(module);
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        remove_by_id(&mut self.modules, id)
    }

    /// Modules of a product (legacy `p` prefix tolerated)
    pub fn list_by_product(&self, product_id: &str) -> Vec<&ProductModule> {
        self.modules
            .iter()
            .filter(|m| same_product(&m.product_id, product_id))
            .collect()
    }

    /// Active modules of a product
    pub fn list_active_by_product(&self, product_id: &str) -> Vec<&ProductModule> {
        self.list_by_product(product_id)
            .into_iter()
            .filter(|m| m.is_active)
            .collect()
    }

    /// Modules of a product whose default version is `version`
    pub fn list_by_product_and_version(
        &self,
        product_id: &str,
        version: &str,
    ) -> Vec<&ProductModule> {
        self.list_by_product(product_id)
            .into_iter()
            .filter(|m| m.version == version)
            .collect()
    }

    /// Add a custom-field definition to a module
    pub fn add_attribute(
        &mut self,
        module_id: &str,
        attribute: NewAttribute,
    ) -> LedgerResult<&ModuleAttribute> {
        let key = attribute.key.trim().to_string();
        if key.is_empty() {
            return Err(LedgerError::validation("Attribute key is required"));
        }
        let module = find_by_id_mut(&mut self.modules, module_id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Module, module_id))?;
        if module.declares(&key) {
            return Err(LedgerError::validation(format!(
                "Attribute '{}' already exists on module {}",
                key, module_id
            )));
        }

        let name = if attribute.name.trim().is_empty() {
            key.clone()
        } else {
            attribute.name.trim().to_string()
        };
        module.attributes.push(ModuleAttribute {
            id: new_id(IdPrefix::Attribute),
            module_id: module_id.to_string(),
            key,
            name,
            attr_type: attribute.attr_type,
            is_required: attribute.is_required,
            options: attribute.options,
        });
        let index = module.attributes.len() - 1;
        Ok(&module.attributes[index])
    }

    /// Remove a custom-field definition by ID or key
    pub fn remove_attribute(&mut self, module_id: &str, attribute: &str) -> bool {
        let Some(module) = find_by_id_mut(&mut self.modules, module_id) else {
            return false;
        };
        let before = module.attributes.len();
        module
            .attributes
            .retain(|a| a.id != attribute && a.key != attribute);
        module.attributes.len() != before
    }
}

impl Workspace {
    /// Create a module under a product and seed it with one placeholder case
    ///
    /// Returns the new module's ID.
    pub fn add_module(
        &mut self,
        name: &str,
        product_id: &str,
        version: Option<&str>,
    ) -> LedgerResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Module name is required"));
        }
        if product_id.trim().is_empty() {
            return Err(LedgerError::validation("Product ID is required"));
        }
        let product = self
            .products
            .get(product_id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Product, product_id))?
            .id
            .clone();

        let version = match version {
            Some(v) => v.to_string(),
            None => self
                .versions
                .latest(&product)
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        };
        self.versions.add(&product, &version)?;

        let module = ProductModule::new(name, &product, &version);
        let module_id = module.id.clone();
        debug!(module = %module_id, name, product = %product, version = %version, "adding module");
        self.modules.insert(module);

        let seed = NewTestCase::new(&module_id, &version)
            .with_use_case(SEED_USE_CASE)
            .with_scenario(SEED_SCENARIO)
            .with_step(SEED_STEPS, SEED_EXPECTED);
        self.add_case(seed)?;

        Ok(module_id)
    }

    /// Merge-patch a module; `Ok(false)` when it does not exist
    pub fn update_module(&mut self, id: &str, patch: ModulePatch) -> LedgerResult<bool> {
        if let Some(version) = &patch.version {
            if !is_valid_version(version) {
                return Err(LedgerError::InvalidVersion(version.clone()));
            }
        }
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(LedgerError::validation("Module name is required"));
            }
        }

        let Some(module) = self.modules.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        if let Some(name) = patch.name {
            module.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            module.description = Some(description);
        }
        if let Some(active) = patch.is_active {
            module.is_active = active;
        }
        if let Some(version) = patch.version {
            module.version = version;
        }
        let (product, version) = (module.product_id.clone(), module.version.clone());
        self.versions.add(&product, &version)?;
        Ok(true)
    }

    /// Delete a module together with all of its test cases
    pub fn delete_module(&mut self, id: &str) -> bool {
        if !self.modules.remove(id) {
            return false;
        }
        let removed = self.cases.remove_by_module(id);
        debug!(module = id, cases = removed, "deleted module");
        self.recompute_versions();
        true
    }

    /// Register a version on a module's product and seed a case for it
    pub fn add_version_to_module(
        &mut self,
        module_id: &str,
        version: &str,
    ) -> LedgerResult<crate::entities::test_case::TestCase> {
        let product = self
            .modules
            .get(module_id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Module, module_id))?
            .product_id
            .clone();
        self.versions.add(&product, version)?;

        let seed = NewTestCase::new(module_id, version)
            .with_use_case(SEED_VERSION_USE_CASE)
            .with_scenario(SEED_SCENARIO)
            .with_step(SEED_STEPS, SEED_EXPECTED);
        self.add_case(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::module::AttributeType;

    fn directory() -> ModuleDirectory {
        ModuleDirectory::from_records(vec![
            ProductModule::new("Login", "1", "v1.0"),
            ProductModule::new("Reports", "p1", "v1.1"),
            ProductModule::new("Cart", "2", "v1.0"),
        ])
    }

    #[test]
    fn test_list_by_product_normalizes() {
        let dir = directory();
        assert_eq!(dir.list_by_product("1").len(), 2);
        assert_eq!(dir.list_by_product("p1").len(), 2);
        assert_eq!(dir.list_by_product("2").len(), 1);
    }

    #[test]
    fn test_list_active_filters_inactive() {
        let mut dir = directory();
        dir.iter_mut().next().unwrap().is_active = false;
        assert_eq!(dir.list_active_by_product("1").len(), 1);
    }

    #[test]
    fn test_list_by_product_and_version() {
        let dir = directory();
        let modules = dir.list_by_product_and_version("1", "v1.1");
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "Reports");
    }

    #[test]
    fn test_attribute_keys_unique() {
        let mut dir = directory();
        let id = dir.all()[0].id.clone();
        let attr = NewAttribute {
            key: "browser".into(),
            name: "Browser".into(),
            attr_type: AttributeType::Select,
            is_required: true,
            options: Some(vec!["Chrome".into()]),
        };
        dir.add_attribute(&id, attr.clone()).unwrap();
        assert!(matches!(
            dir.add_attribute(&id, attr),
            Err(LedgerError::Validation(_))
        ));
        assert!(dir.get(&id).unwrap().declares("browser"));

        assert!(dir.remove_attribute(&id, "browser"));
        assert!(!dir.remove_attribute(&id, "browser"));
    }

    #[test]
    fn test_attribute_on_missing_module() {
        let mut dir = directory();
        let err = dir
            .add_attribute(
                "nope",
                NewAttribute {
                    key: "os".into(),
                    ..NewAttribute::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, LedgerError::not_found(EntityKind::Module, "nope"));
    }
}
