//! Entity trait - common interface for all entity types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Kinds of entity held by a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Product,
    Version,
    Module,
    Attribute,
    TestCase,
    Step,
    Suite,
    Run,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Product => write!(f, "product"),
            EntityKind::Version => write!(f, "version"),
            EntityKind::Module => write!(f, "module"),
            EntityKind::Attribute => write!(f, "attribute"),
            EntityKind::TestCase => write!(f, "test case"),
            EntityKind::Step => write!(f, "step"),
            EntityKind::Suite => write!(f, "test suite"),
            EntityKind::Run => write!(f, "test run"),
        }
    }
}

/// Common trait for all stored entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity kind
    const KIND: EntityKind;

    /// Get the entity's unique ID
    fn id(&self) -> &str;

    /// Get the entity's display title
    fn title(&self) -> &str;

    /// Get the creation timestamp, if recorded
    fn created(&self) -> Option<DateTime<Utc>>;
}

/// Find an entity by ID in a slice
pub fn find_by_id<'a, T: Entity>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// Find an entity by ID in a mutable slice
pub fn find_by_id_mut<'a, T: Entity>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

/// Remove an entity by ID, returning whether anything was removed
pub fn remove_by_id<T: Entity>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}
