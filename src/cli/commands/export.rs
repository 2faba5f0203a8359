//! `tledger export` command - Write test cases out as CSV

use std::io::Write;
use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use super::{not_found, Session};
use crate::cli::GlobalOpts;
use crate::core::{EntityKind, Workspace};
use crate::entities::TestCase;

const CASE_COLUMNS: [&str; 8] = [
    "Test Case ID",
    "Module",
    "Version",
    "Use Case",
    "Scenario",
    "Steps",
    "Expected",
    "Result",
];

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["product", "suite", "run"])))]
pub struct ExportArgs {
    /// Every case of a product
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// The cases of a suite
    #[arg(long, short = 's')]
    pub suite: Option<String>,

    /// The cases of a run, with the results recorded in it
    #[arg(long, short = 'r')]
    pub run: Option<String>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

/// Columns describing one case; the result cell is supplied by the caller
fn case_cells(ws: &Workspace, case: &TestCase, result: &str) -> Vec<String> {
    let module = ws
        .modules()
        .get(&case.module_id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| case.module_id.clone());
    let steps: Vec<&str> = case.steps.iter().map(|s| s.steps.as_str()).collect();
    let expected: Vec<&str> = case
        .steps
        .iter()
        .map(|s| s.expected_result.as_str())
        .collect();
    vec![
        case.test_case_id.clone(),
        module,
        case.version.clone(),
        case.use_case.clone(),
        case.scenario.clone(),
        steps.join("\n"),
        expected.join("\n"),
        result.to_string(),
    ]
}

/// Header and rows for the chosen source
fn collect(ws: &Workspace, args: &ExportArgs) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let headers: Vec<String> = CASE_COLUMNS.iter().map(|c| c.to_string()).collect();

    if let Some(product) = &args.product {
        if ws.products().get(product).is_none() {
            return Err(not_found(EntityKind::Product, product));
        }
        let rows = ws
            .cases_by_product(product)
            .iter()
            .map(|c| case_cells(ws, c, c.result.as_str()))
            .collect();
        return Ok((headers, rows));
    }

    if let Some(suite) = &args.suite {
        if ws.suites().get(suite).is_none() {
            return Err(not_found(EntityKind::Suite, suite));
        }
        let rows = ws
            .suite_cases(suite)
            .iter()
            .map(|c| case_cells(ws, c, c.result.as_str()))
            .collect();
        return Ok((headers, rows));
    }

    if let Some(run) = &args.run {
        let run = ws.runs().get(run).ok_or_else(|| not_found(EntityKind::Run, run))?;
        let mut headers = headers;
        headers.insert(0, "Suite".to_string());
        let rows = ws
            .resolve_run(&run.id)
            .into_iter()
            .map(|(suite_id, resolved)| {
                let suite_name = run
                    .suite(&suite_id)
                    .map(|s| s.name.clone())
                    .unwrap_or(suite_id);
                let mut cells = vec![suite_name];
                cells.extend(case_cells(ws, &resolved.case, &resolved.result.to_string()));
                cells
            })
            .collect();
        return Ok((headers, rows));
    }

    Err(miette::miette!("One of --product, --suite or --run is required"))
}

fn write_csv<W: Write>(out: W, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(headers).into_diagnostic()?;
    for row in rows {
        writer.write_record(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let (headers, rows) = collect(&session.workspace, &args)?;

    match &args.out {
        Some(path) => {
            let file = std::fs::File::create(path).into_diagnostic()?;
            write_csv(file, &headers, &rows)?;
            eprintln!(
                "{} Exported {} test case(s) to {}",
                style("✓").green(),
                style(rows.len()).cyan(),
                style(path.display()).cyan()
            );
        }
        None => write_csv(std::io::stdout().lock(), &headers, &rows)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ExportArgs {
        ExportArgs {
            product: None,
            suite: None,
            run: None,
            out: None,
        }
    }

    #[test]
    fn test_suite_export_uses_module_names() {
        let ws = Workspace::seeded().unwrap();
        let (headers, rows) = collect(
            &ws,
            &ExportArgs {
                suite: Some("suite1".into()),
                ..args()
            },
        )
        .unwrap();

        assert_eq!(headers.len(), CASE_COLUMNS.len());
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r[1] != "mod1"));
    }

    #[test]
    fn test_unknown_product_fails() {
        let ws = Workspace::seeded().unwrap();
        let result = collect(
            &ws,
            &ExportArgs {
                product: Some("nope".into()),
                ..args()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_write_csv_quotes_multiline_cells() {
        let mut out = Vec::new();
        write_csv(
            &mut out,
            &["A".to_string(), "B".to_string()],
            &[vec!["one".into(), "two\nlines".into()]],
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A,B\none,\"two\nlines\"\n");
    }
}
