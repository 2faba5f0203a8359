//! Identifier generation and normalization
//!
//! Internal IDs are `PREFIX-ULID` strings (timestamp + random suffix). Legacy
//! records carry arbitrary opaque IDs (`mod1`, `suite1`), so IDs are stored as
//! plain strings rather than a parsed type.

use rand::Rng;
use ulid::Ulid;

/// Prefix for internally generated identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    Product,
    Module,
    Attribute,
    TestCase,
    Suite,
    Run,
}

impl IdPrefix {
    /// The string prefix used in generated IDs
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Product => "PRD",
            IdPrefix::Module => "MOD",
            IdPrefix::Attribute => "ATTR",
            IdPrefix::TestCase => "CASE",
            IdPrefix::Suite => "SUITE",
            IdPrefix::Run => "RUN",
        }
    }
}

impl std::fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generate a fresh unique ID for the given prefix
pub fn new_id(prefix: IdPrefix) -> String {
    format!("{}-{}", prefix.as_str(), Ulid::new())
}

/// Strip a single legacy leading `p` from a product ID
///
/// Both `"1"` and `"p1"` refer to the same product.
pub fn normalize_product_id(product_id: &str) -> &str {
    product_id.strip_prefix('p').unwrap_or(product_id)
}

/// Check whether two product IDs refer to the same product
pub fn same_product(a: &str, b: &str) -> bool {
    normalize_product_id(a) == normalize_product_id(b)
}

/// Deterministic ID for a (product, version) pair
pub fn generate_version_id(product_id: &str, version: &str) -> String {
    format!("ver_{}_{}", product_id, version)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Generate a `TC####` business ID not rejected by `taken`
///
/// Falls back to a ULID-suffixed ID if the four-digit space is exhausted.
pub fn generate_business_id(taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::rng();
    for _ in 0..64 {
        let candidate = format!("TC{}", rng.random_range(1000..10000));
        if !taken(&candidate) {
            return candidate;
        }
    }
    format!("TC{}", Ulid::new())
}
