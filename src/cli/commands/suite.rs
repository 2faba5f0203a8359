//! `tledger suite` command - Test suite management

use clap::Subcommand;
use console::style;
use miette::Result;

use super::{not_found, Session};
use crate::cli::commands::case::styled_result;
use crate::cli::helpers::{truncate_str, yes_no};
use crate::cli::output::{effective_format, emit_structured};
use crate::cli::table::Listing;
use crate::cli::GlobalOpts;
use crate::core::EntityKind;
use crate::entities::{SuitePatch, TestSuite};

#[derive(Subcommand, Debug)]
pub enum SuiteCommands {
    /// List suites
    List(ListArgs),

    /// Show a suite and its resolved cases
    Show(ShowArgs),

    /// Create a suite
    Add(AddArgs),

    /// Rename, describe or (de)activate a suite
    Update(UpdateArgs),

    /// Add a stored case to a suite
    AddCase(AddCaseArgs),

    /// Remove a case from a suite by business ID
    RemoveCase(RemoveCaseArgs),

    /// Delete a suite
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 'p')]
    pub product: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    pub name: String,

    #[arg(long, short = 'p')]
    pub product: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(clap::Args, Debug)]
pub struct AddCaseArgs {
    /// Suite ID
    pub suite: String,

    /// Internal case ID
    pub case: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoveCaseArgs {
    pub suite: String,

    /// Business ID (e.g. TC101)
    pub test_case_id: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub id: String,
}

/// Run a suite subcommand
pub fn run(cmd: SuiteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SuiteCommands::List(args) => run_list(args, global),
        SuiteCommands::Show(args) => run_show(args, global),
        SuiteCommands::Add(args) => run_add(args, global),
        SuiteCommands::Update(args) => run_update(args, global),
        SuiteCommands::AddCase(args) => run_add_case(args, global),
        SuiteCommands::RemoveCase(args) => run_remove_case(args, global),
        SuiteCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let suites: Vec<&TestSuite> = session.workspace.suites().list(args.product.as_deref());

    let format = effective_format(global.format, true);
    if emit_structured(&suites, format)? {
        return Ok(());
    }

    if suites.is_empty() {
        println!("No suites found.");
        return Ok(());
    }

    let mut listing = Listing::new(&["ID", "NAME", "PRODUCT", "CASES", "ACTIVE", "UPDATED"]);
    for suite in suites {
        listing.row(vec![
            suite.id.clone(),
            truncate_str(&suite.name, 40),
            suite.product_id.clone(),
            suite.case_count().to_string(),
            yes_no(suite.is_active).to_string(),
            suite.updated_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    listing.print(format, "suite");
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;
    let suite = ws
        .suites()
        .get(&args.id)
        .ok_or_else(|| not_found(EntityKind::Suite, &args.id))?;

    if emit_structured(suite, global.format)? {
        return Ok(());
    }

    let cases = ws.suite_cases(&suite.id);
    let broken = suite.case_count().saturating_sub(cases.len());

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&suite.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&suite.name).yellow());
    println!("{}: {}", style("Product").bold(), suite.product_id);
    if let Some(description) = &suite.description {
        println!("{}: {}", style("Description").bold(), description);
    }
    println!("{}: {}", style("Active").bold(), yes_no(suite.is_active));
    println!("{}", style("─".repeat(60)).dim());

    println!();
    println!("{} ({}):", style("Test Cases").bold(), cases.len());
    for case in &cases {
        println!(
            "  • {} {} [{}] {}",
            style(&case.test_case_id).cyan(),
            truncate_str(&case.use_case, 40),
            case.version,
            styled_result(case.result)
        );
    }
    if broken > 0 {
        println!(
            "  {} {} reference(s) no longer resolve",
            style("!").yellow(),
            broken
        );
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let suite = session.workspace.suites_mut().add(
        &args.name,
        &args.product,
        args.description.as_deref(),
    )?;
    session.save()?;

    if emit_structured(&suite, global.format)? {
        return Ok(());
    }
    println!(
        "{} Created suite {} {}",
        style("✓").green(),
        style(&suite.id).cyan(),
        style(&suite.name).yellow()
    );
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let patch = SuitePatch {
        name: args.name,
        description: args.description,
        is_active: args.active,
        test_cases: None,
    };
    let suite = session
        .workspace
        .suites_mut()
        .update(&args.id, patch)
        .ok_or_else(|| not_found(EntityKind::Suite, &args.id))?;
    session.save()?;

    println!(
        "{} Updated suite {} {}",
        style("✓").green(),
        style(&suite.id).cyan(),
        style(&suite.name).yellow()
    );
    Ok(())
}

fn run_add_case(args: AddCaseArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session.workspace.add_case_to_suite(&args.suite, &args.case)? {
        println!(
            "{} Test case {} is already in suite {}",
            style("!").yellow(),
            style(&args.case).cyan(),
            style(&args.suite).cyan()
        );
        return Ok(());
    }
    session.save()?;

    println!(
        "{} Added test case {} to suite {}",
        style("✓").green(),
        style(&args.case).cyan(),
        style(&args.suite).cyan()
    );
    Ok(())
}

fn run_remove_case(args: RemoveCaseArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session
        .workspace
        .suites_mut()
        .remove_case_ref(&args.suite, &args.test_case_id)
    {
        return Err(miette::miette!(
            "Suite {} has no test case {}",
            args.suite,
            args.test_case_id
        ));
    }
    session.save()?;

    println!(
        "{} Removed {} from suite {}",
        style("✓").green(),
        style(&args.test_case_id).cyan(),
        style(&args.suite).cyan()
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session.workspace.suites_mut().delete(&args.id) {
        return Err(not_found(EntityKind::Suite, &args.id));
    }
    session.save()?;

    println!(
        "{} Removed suite {}",
        style("✓").green(),
        style(&args.id).cyan()
    );
    Ok(())
}
