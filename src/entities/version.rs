//! Product version entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Entity, EntityKind};
use crate::core::identity::generate_version_id;

/// Version tag every product falls back to
pub const DEFAULT_VERSION: &str = "v1.0";

/// A (product, version) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVersion {
    /// Derived from product and version, see [`generate_version_id`]
    pub id: String,

    /// Normalized product ID
    pub product_id: String,

    /// Version string, e.g. `v1.2`
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Entity for ProductVersion {
    const KIND: EntityKind = EntityKind::Version;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.version
    }

    fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl ProductVersion {
    /// Create a version record; `product_id` must already be normalized
    pub fn new(product_id: &str, version: &str) -> Self {
        Self {
            id: generate_version_id(product_id, version),
            product_id: product_id.to_string(),
            version: version.to_string(),
            created_at: Some(Utc::now()),
            is_active: Some(true),
        }
    }
}

/// Check a version string against `^v\d+(\.\d+)*$`
pub fn is_valid_version(version: &str) -> bool {
    let Some(rest) = version.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty()
        && rest
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Numeric-aware comparison of version strings (`v1.9` < `v1.10`)
pub fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return std::cmp::Ordering::Equal,
            (None, Some(_)) => return std::cmp::Ordering::Less,
            (Some(_), None) => return std::cmp::Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(ln), Ok(rn)) => ln.cmp(&rn),
                    _ => l.cmp(r),
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Split into alternating runs of digits and non-digits
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_valid_versions() {
        assert!(is_valid_version("v1"));
        assert!(is_valid_version("v1.0"));
        assert!(is_valid_version("v10.2.33"));
    }

    #[test]
    fn test_invalid_versions() {
        assert!(!is_valid_version("1.0"));
        assert!(!is_valid_version("v"));
        assert!(!is_valid_version("v1."));
        assert!(!is_valid_version("v1..2"));
        assert!(!is_valid_version("v1.a"));
        assert!(!is_valid_version("V1.0"));
        assert!(!is_valid_version(""));
    }

    #[test]
    fn test_compare_versions_numeric() {
        assert_eq!(compare_versions("v1.9", "v1.10"), Ordering::Less);
        assert_eq!(compare_versions("v2.0", "v1.10"), Ordering::Greater);
        assert_eq!(compare_versions("v1.0", "v1.0"), Ordering::Equal);
        assert_eq!(compare_versions("v1", "v1.0"), Ordering::Less);
    }

    #[test]
    fn test_version_record_id_is_deterministic() {
        let a = ProductVersion::new("1", "v1.0");
        let b = ProductVersion::new("1", "v1.0");
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "ver_1_v1_0");
    }
}
