//! Product catalog

use tracing::debug;

use crate::core::error::{LedgerError, LedgerResult};
use crate::core::identity::same_product;
use crate::entities::product::Product;

/// Catalog of top-level products
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// Look a product up; `"p3"` and `"3"` name the same product
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| same_product(&p.id, id))
    }

    pub fn add(&mut self, name: &str, description: Option<&str>) -> LedgerResult<Product> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("Product name is required"));
        }
        let mut product = Product::new(name);
        product.description = description.map(String::from);
        debug!(product = %product.id, name, "adding product");
        self.products.push(product.clone());
        Ok(product)
    }

    /// Replace a product by ID; the stored ID form is kept
    pub fn update(&mut self, product: Product) -> bool {
        match self
            .products
            .iter_mut()
            .find(|p| same_product(&p.id, &product.id))
        {
            Some(existing) => {
                let id = std::mem::take(&mut existing.id);
                *existing = Product { id, ..product };
                true
            }
            None => false,
        }
    }

    /// Remove a product; its modules, suites and runs are left in place
    pub fn delete(&mut self, id: &str) -> bool {
        match self.products.iter().position(|p| same_product(&p.id, id)) {
            Some(index) => {
                self.products.remove(index);
                debug!(product = id, "deleted product");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get_normalized() {
        let mut catalog = ProductCatalog::from_records(vec![Product {
            id: "3".into(),
            ..Product::new("Billing")
        }]);
        assert!(catalog.get("p3").is_some());
        assert!(catalog.get("3").is_some());

        let added = catalog.add("  Portal ", Some("web")).unwrap();
        assert_eq!(added.name, "Portal");
        assert_eq!(catalog.list().len(), 2);
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let mut catalog = ProductCatalog::new();
        assert!(matches!(catalog.add(" ", None), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_update_and_delete() {
        let mut catalog = ProductCatalog::new();
        let mut product = catalog.add("Portal", None).unwrap();
        product.is_active = false;
        assert!(catalog.update(product.clone()));
        assert!(!catalog.list()[0].is_active);

        assert!(catalog.delete(&product.id));
        assert!(!catalog.delete(&product.id));
        assert!(!catalog.update(product));
    }

    #[test]
    fn test_update_and_delete_accept_prefixed_id() {
        let mut catalog = ProductCatalog::from_records(vec![Product {
            id: "1".into(),
            ..Product::new("Qualis SPC")
        }]);

        let mut renamed = catalog.get("p1").unwrap().clone();
        renamed.id = "p1".into();
        renamed.name = "Qualis".into();
        assert!(catalog.update(renamed));
        assert_eq!(catalog.list()[0].id, "1");
        assert_eq!(catalog.list()[0].name, "Qualis");

        assert!(catalog.delete("p1"));
        assert!(catalog.get("1").is_none());
        assert!(!catalog.delete("1"));
    }
}
