//! `tledger check` command - Integrity scan of the stored workspace

use console::style;
use miette::Result;

use super::Session;
use crate::cli::output::emit_structured;
use crate::cli::GlobalOpts;
use crate::core::{scan, IntegrityReport};

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Show summary only, don't list individual findings
    #[arg(long)]
    pub summary: bool,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let report = scan(&session.workspace);

    if emit_structured(&report, global.format)? {
        return finish(&report, args.strict);
    }

    println!(
        "{} Checking {} ...\n",
        style("→").blue(),
        session.store_path().display()
    );

    if !args.summary {
        print_findings(&report);
    }

    let warnings = report.issue_count() - report.orphaned_cases.len();
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Integrity Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "  Modules:        {}",
        style(session.workspace.modules().all().len()).cyan()
    );
    println!(
        "  Test cases:     {}",
        style(session.workspace.cases().len()).cyan()
    );
    println!(
        "  Errors:         {}",
        style(report.orphaned_cases.len()).red()
    );
    if warnings > 0 {
        println!("  Warnings:       {}", style(warnings).yellow());
    }
    println!();

    let result = finish(&report, args.strict);
    if result.is_ok() {
        println!("{} Workspace is consistent", style("✓").green().bold());
    }
    result
}

fn print_findings(report: &IntegrityReport) {
    let error = style("✗").red();
    let warn = style("!").yellow();

    for case in &report.orphaned_cases {
        println!("{} test case {} belongs to a missing module", error, case);
    }
    for module in &report.empty_modules {
        println!("{} module {} has no test cases", warn, module);
    }
    for r in &report.invalid_versions {
        println!(
            "{} test case {} uses {} which product {} does not register",
            warn, r.case_id, r.version, r.product_id
        );
    }
    for module in &report.ownerless_modules {
        println!("{} module {} belongs to a missing product", warn, module);
    }
    for r in &report.broken_suite_refs {
        println!(
            "{} suite {} references missing test case {}",
            warn, r.suite_id, r.test_case_id
        );
    }
    for a in &report.undeclared_attributes {
        println!(
            "{} test case {} sets attribute '{}' not declared by module {}",
            warn, a.case_id, a.key, a.module_id
        );
    }
}

fn finish(report: &IntegrityReport, strict: bool) -> Result<()> {
    let errors = report.orphaned_cases.len();
    if errors > 0 {
        return Err(miette::miette!(
            "Integrity check failed: {} orphaned test case(s)",
            errors
        ));
    }
    if strict && !report.is_clean() {
        return Err(miette::miette!(
            "Integrity check failed: {} warning(s) in strict mode",
            report.issue_count()
        ));
    }
    Ok(())
}
