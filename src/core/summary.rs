//! Module × version coverage for one product

use serde::Serialize;

use crate::core::workspace::Workspace;

/// One module's case counts, one cell per version column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRow {
    pub module_id: String,
    pub module_name: String,
    pub counts: Vec<usize>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMatrix {
    pub product_id: String,
    /// Column headers in version order
    pub versions: Vec<String>,
    pub rows: Vec<CoverageRow>,
    /// Per-version totals, aligned with `versions`
    pub totals: Vec<usize>,
}

impl CoverageMatrix {
    pub fn grand_total(&self) -> usize {
        self.totals.iter().sum()
    }
}

impl Workspace {
    /// Count the cases of each module at each registered version of a product
    pub fn coverage_matrix(&self, product_id: &str) -> CoverageMatrix {
        let versions = self.versions.list_by_product(product_id);

        let rows: Vec<CoverageRow> = self
            .modules
            .list_by_product(product_id)
            .into_iter()
            .map(|module| {
                let counts: Vec<usize> = versions
                    .iter()
                    .map(|v| self.cases.by_module_and_version(&module.id, v).len())
                    .collect();
                CoverageRow {
                    module_id: module.id.clone(),
                    module_name: module.name.clone(),
                    total: counts.iter().sum(),
                    counts,
                }
            })
            .collect();

        let totals = (0..versions.len())
            .map(|i| rows.iter().map(|r| r.counts[i]).sum())
            .collect();

        CoverageMatrix {
            product_id: product_id.to_string(),
            versions,
            rows,
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::test_case::NewTestCase;

    #[test]
    fn test_matrix_counts_per_version() {
        let mut ws = Workspace::new();
        let product = ws.products_mut().add("Portal", None).unwrap();
        let login = ws.add_module("Login", &product.id, None).unwrap();
        let cart = ws.add_module("Cart", &product.id, None).unwrap();
        ws.add_case(NewTestCase::new(&login, "v1.1")).unwrap();
        ws.add_case(NewTestCase::new(&login, "v1.1")).unwrap();

        let matrix = ws.coverage_matrix(&product.id);
        assert_eq!(matrix.versions, vec!["v1.0", "v1.1"]);
        assert_eq!(matrix.rows.len(), 2);

        let login_row = matrix.rows.iter().find(|r| r.module_id == login).unwrap();
        assert_eq!(login_row.counts, vec![1, 2]);
        let cart_row = matrix.rows.iter().find(|r| r.module_id == cart).unwrap();
        assert_eq!(cart_row.counts, vec![1, 0]);

        assert_eq!(matrix.totals, vec![2, 2]);
        assert_eq!(matrix.grand_total(), 4);
    }

    #[test]
    fn test_matrix_for_unknown_product_is_empty() {
        let ws = Workspace::new();
        let matrix = ws.coverage_matrix("42");
        assert!(matrix.versions.is_empty());
        assert!(matrix.rows.is_empty());
        assert_eq!(matrix.grand_total(), 0);
    }
}
