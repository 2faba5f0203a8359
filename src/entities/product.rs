//! Product entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};
use crate::core::identity::{new_id, IdPrefix};

/// A top-level product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Whether the product is active
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_active() -> bool {
    true
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl Product {
    /// Create a new active product with a fresh ID
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(IdPrefix::Product),
            name: name.into(),
            description: None,
            created_at: Some(Utc::now()),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_creation() {
        let product = Product::new("Qualis SPC");
        assert!(product.id.starts_with("PRD-"));
        assert!(product.is_active);
        assert_eq!(product.title(), "Qualis SPC");
    }

    #[test]
    fn test_product_missing_active_defaults_true() {
        let product: Product = serde_json::from_str(r#"{"id":"1","name":"MSA"}"#).unwrap();
        assert!(product.is_active);
        assert!(product.created_at.is_none());
    }
}
