//! `tledger import` command - Bulk-load test cases from a CSV sheet
//!
//! The first row is the header. Columns are matched to case fields by field
//! name or label, case-insensitively; `--map field=Column` overrides that.
//! With `--attributes`, every column left over becomes a custom attribute.

use std::path::{Path, PathBuf};

use console::style;
use miette::{IntoDiagnostic, Result};
use tracing::debug;

use super::{not_found, Session};
use crate::cli::helpers::parse_key_value;
use crate::cli::output::emit_structured;
use crate::cli::GlobalOpts;
use crate::core::EntityKind;
use crate::entities::version::DEFAULT_VERSION;
use crate::entities::{NewTestCase, TestCaseAttribute};

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["module", "product"])))]
pub struct ImportArgs {
    /// CSV file with a header row
    pub file: PathBuf,

    /// Add the cases to this module
    #[arg(long, short = 'm')]
    pub module: Option<String>,

    /// Create a module named after the file under this product
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Map a field to a column header (field=Column), repeatable
    #[arg(long = "map", value_parser = parse_key_value)]
    pub maps: Vec<(String, String)>,

    /// Import unmapped columns as custom attributes
    #[arg(long)]
    pub attributes: bool,
}

/// Case fields a column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    SlNo,
    TestCaseId,
    UseCase,
    Scenario,
    Steps,
    Expected,
    Version,
}

/// `(field, name, label)`
const FIELDS: [(Field, &str, &str); 7] = [
    (Field::SlNo, "slNo", "Sl.No"),
    (Field::TestCaseId, "testCaseId", "Test Case ID"),
    (Field::UseCase, "useCase", "Use Case"),
    (Field::Scenario, "scenario", "Scenario"),
    (Field::Steps, "steps", "Steps"),
    (Field::Expected, "expected", "Expected"),
    (Field::Version, "version", "Version"),
];

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Header positions for each mapped field and attribute
#[derive(Debug, Default, PartialEq, Eq)]
struct ColumnMap {
    fields: Vec<(Field, usize)>,
    attributes: Vec<(String, usize)>,
}

impl ColumnMap {
    fn build(headers: &[String], overrides: &[(String, String)], attributes: bool) -> Result<Self> {
        let position = |column: &str| headers.iter().position(|h| same_name(h, column));

        let mut fields: Vec<(Field, usize)> = FIELDS
            .iter()
            .filter_map(|(field, name, label)| {
                position(label)
                    .or_else(|| position(name))
                    .map(|col| (*field, col))
            })
            .collect();

        for (name, column) in overrides {
            let field = FIELDS
                .iter()
                .find(|(_, n, l)| same_name(n, name) || same_name(l, name))
                .map(|(f, _, _)| *f)
                .ok_or_else(|| miette::miette!("Unknown field '{}' in --map", name))?;
            let col = position(column)
                .ok_or_else(|| miette::miette!("Column '{}' not found in the header", column))?;
            fields.retain(|(f, _)| *f != field);
            fields.push((field, col));
        }

        let attributes = if attributes {
            headers
                .iter()
                .enumerate()
                .filter(|(i, h)| !h.trim().is_empty() && !fields.iter().any(|(_, c)| c == i))
                .map(|(i, h)| (h.trim().to_string(), i))
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self { fields, attributes })
    }

    fn cell<'a>(&self, row: &'a csv::StringRecord, field: Field) -> &'a str {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, col)| row.get(*col))
            .map(str::trim)
            .unwrap_or("")
    }

    /// Turn one data row (0-based `index`) into a draft
    fn draft(&self, module_id: &str, row: &csv::StringRecord, index: usize) -> NewTestCase {
        let or = |value: &str, fallback: String| {
            if value.is_empty() {
                fallback
            } else {
                value.to_string()
            }
        };

        let version = or(self.cell(row, Field::Version), DEFAULT_VERSION.to_string());
        let mut draft = NewTestCase::new(module_id, version)
            .with_test_case_id(or(self.cell(row, Field::TestCaseId), format!("TC{}", index + 1)))
            .with_use_case(self.cell(row, Field::UseCase))
            .with_scenario(self.cell(row, Field::Scenario));

        let (steps, expected) = (self.cell(row, Field::Steps), self.cell(row, Field::Expected));
        if !steps.is_empty() || !expected.is_empty() {
            draft = draft.with_step(steps, expected);
        }

        draft.attributes = self
            .attributes
            .iter()
            .filter_map(|(key, col)| {
                let value = row.get(*col)?.trim();
                (!value.is_empty()).then(|| TestCaseAttribute {
                    key: key.clone(),
                    value: value.to_string(),
                })
            })
            .collect();
        draft
    }
}

/// Module name derived from a sheet file name: `login_flow-v2.csv` -> `Login Flow V2`
fn module_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");
    if name.is_empty() {
        "Imported".to_string()
    } else {
        name
    }
}

fn read_drafts(path: &Path, args: &ImportArgs, module_id: &str) -> Result<Vec<NewTestCase>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .into_diagnostic()?;
    let headers: Vec<String> = reader
        .headers()
        .into_diagnostic()?
        .iter()
        .map(String::from)
        .collect();
    let map = ColumnMap::build(&headers, &args.maps, args.attributes)?;
    debug!(?map, "column mapping");

    let mut drafts = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.into_diagnostic()?;
        drafts.push(map.draft(module_id, &record, index));
    }
    Ok(drafts)
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let module_id = match (&args.module, &args.product) {
        (Some(module), _) => {
            if !session.workspace.modules().exists(module) {
                return Err(not_found(EntityKind::Module, module));
            }
            module.clone()
        }
        (None, Some(product)) => {
            let name = module_name_from_path(&args.file);
            session.workspace.add_module(&name, product, None)?
        }
        (None, None) => return Err(miette::miette!("Either --module or --product is required")),
    };

    let drafts = read_drafts(&args.file, &args, &module_id)?;
    let outcome = session.workspace.bulk_add_cases(drafts);
    session.save()?;

    if emit_structured(&outcome, global.format)? {
        return Ok(());
    }
    println!(
        "{} Imported {} test case(s) into {}",
        style("✓").green(),
        style(outcome.success).cyan(),
        style(&module_id).cyan()
    );
    if outcome.errors > 0 {
        println!(
            "  {} {} row(s) failed",
            style("!").yellow(),
            style(outcome.errors).red()
        );
    }
    Ok(())
}
