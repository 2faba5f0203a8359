//! `tledger summary` command - Coverage of a product's modules across versions

use console::style;
use miette::Result;

use super::{not_found, Session};
use crate::cli::output::{effective_format, emit_structured};
use crate::cli::table::Listing;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CaseResult, EntityKind};

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Product ID
    pub product: String,
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;
    let product = ws
        .products()
        .get(&args.product)
        .ok_or_else(|| not_found(EntityKind::Product, &args.product))?;
    let matrix = ws.coverage_matrix(&product.id);

    let format = effective_format(global.format, true);
    if emit_structured(&matrix, format)? {
        return Ok(());
    }

    println!(
        "{} {} ({})",
        style("Coverage for").bold(),
        style(&product.name).yellow(),
        product.id
    );
    println!();

    if matrix.rows.is_empty() {
        println!("No modules found.");
        return Ok(());
    }

    let mut headers = vec!["MODULE"];
    headers.extend(matrix.versions.iter().map(String::as_str));
    headers.push("TOTAL");

    let mut listing = Listing::new(&headers);
    for row in &matrix.rows {
        let mut cells = vec![row.module_name.clone()];
        cells.extend(row.counts.iter().map(|c| c.to_string()));
        cells.push(row.total.to_string());
        listing.row(cells);
    }
    let mut totals = vec!["TOTAL".to_string()];
    totals.extend(matrix.totals.iter().map(|c| c.to_string()));
    totals.push(matrix.grand_total().to_string());
    listing.row(totals);

    match format {
        OutputFormat::Table => println!("{}", listing.render_table()),
        _ => print!("{}", listing.render_tsv()),
    }

    let cases = ws.cases_by_product(&product.id);
    let count = |wanted: CaseResult| cases.iter().filter(|c| c.result.normalize() == wanted).count();
    println!();
    println!(
        "{} cases: {} pass, {} fail, {} blocked, {} pending",
        style(cases.len()).cyan(),
        style(count(CaseResult::Pass)).green(),
        style(count(CaseResult::Fail)).red(),
        style(count(CaseResult::Blocked)).yellow(),
        count(CaseResult::Pending)
    );
    Ok(())
}
