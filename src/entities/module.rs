//! Product module entity type and its custom-field schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};
use crate::core::identity::{new_id, IdPrefix};
use crate::entities::product::default_active;

/// Value type of a custom module attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum AttributeType {
    #[default]
    Text,
    Number,
    Boolean,
    Select,
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::Text => write!(f, "text"),
            AttributeType::Number => write!(f, "number"),
            AttributeType::Boolean => write!(f, "boolean"),
            AttributeType::Select => write!(f, "select"),
        }
    }
}

impl std::str::FromStr for AttributeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(AttributeType::Text),
            "number" => Ok(AttributeType::Number),
            "boolean" => Ok(AttributeType::Boolean),
            "select" => Ok(AttributeType::Select),
            _ => Err(format!("Unknown attribute type: {}", s)),
        }
    }
}

/// Definition of a custom field carried by a module's test cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAttribute {
    pub id: String,

    pub module_id: String,

    /// Key matched against `TestCaseAttribute::key`
    pub key: String,

    /// Display name
    #[serde(alias = "attributeName")]
    pub name: String,

    #[serde(rename = "type", default)]
    pub attr_type: AttributeType,

    #[serde(default)]
    pub is_required: bool,

    /// Choices for `select` attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Input for a new module attribute
#[derive(Debug, Clone, Default)]
pub struct NewAttribute {
    pub key: String,
    pub name: String,
    pub attr_type: AttributeType,
    pub is_required: bool,
    pub options: Option<Vec<String>>,
}

/// A functional area of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductModule {
    pub id: String,

    /// Owning product (may carry the legacy `p` prefix)
    pub product_id: String,

    /// Default version context for new test cases
    pub version: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Custom-field schema
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ModuleAttribute>,
}

impl Entity for ProductModule {
    const KIND: EntityKind = EntityKind::Module;

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

impl ProductModule {
    /// Create a new active module with a fresh ID
    pub fn new(name: &str, product_id: &str, version: &str) -> Self {
        Self {
            id: new_id(IdPrefix::Module),
            product_id: product_id.to_string(),
            version: version.to_string(),
            name: name.to_string(),
            description: None,
            created_at: Some(Utc::now()),
            is_active: true,
            attributes: Vec::new(),
        }
    }

    /// Whether the module declares a custom-field schema
    pub fn has_schema(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Check whether an attribute key is declared
    pub fn declares(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a.key == key)
    }
}

/// Merge-patch for a module; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct ModulePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_creation() {
        let module = ProductModule::new("Login", "1", "v1.0");
        assert!(module.id.starts_with("MOD-"));
        assert!(module.is_active);
        assert!(!module.has_schema());
    }

    #[test]
    fn test_attribute_name_alias() {
        let json = r#"{"id":"a1","moduleId":"mod1","key":"browser","attributeName":"Browser","type":"select","isRequired":true,"options":["Chrome","Firefox"]}"#;
        let attr: ModuleAttribute = serde_json::from_str(json).unwrap();
        assert_eq!(attr.name, "Browser");
        assert_eq!(attr.attr_type, AttributeType::Select);
        assert_eq!(attr.options.as_ref().map(|o| o.len()), Some(2));
    }

    #[test]
    fn test_legacy_module_without_active_flag() {
        let json = r#"{"id":"mod1","productId":"1","version":"v1.0","name":"Login Module"}"#;
        let module: ProductModule = serde_json::from_str(json).unwrap();
        assert!(module.is_active);
        assert!(module.attributes.is_empty());
    }
}
