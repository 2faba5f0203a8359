//! `tledger run` command - Test runs and result recording

use clap::Subcommand;
use console::style;
use miette::Result;

use super::{not_found, Session};
use crate::cli::filters::ResultFilter;
use crate::cli::helpers::truncate_str;
use crate::cli::output::{effective_format, emit_structured};
use crate::cli::table::Listing;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CaseResult, EntityKind, ResolvedCase, ResultSource};
use crate::entities::{RunPatch, RunStatus, TestRun, TestSuite};

#[derive(Subcommand, Debug)]
pub enum RunCommands {
    /// List runs
    List(ListArgs),

    /// Create a run over one or more suites
    New(NewArgs),

    /// Show a run with the result of every case
    Show(ShowArgs),

    /// Record a result for a case in a run
    Record(RecordArgs),

    /// Pass/fail figures and completion per suite
    Stats(StatsArgs),

    /// Rename a run, replace its suites or force its status
    Update(UpdateArgs),

    /// Delete a run
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 'p')]
    pub product: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    pub name: String,

    /// Suite ID, repeatable; the first suite decides the product
    #[arg(long = "suite", short = 's', required = true)]
    pub suites: Vec<String>,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Defaults to the configured author
    #[arg(long)]
    pub created_by: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    pub id: String,

    /// Only cases whose resolved result matches
    #[arg(long, short = 'r', default_value = "all")]
    pub result: ResultFilter,
}

#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    /// Run ID
    pub run: String,

    /// Internal case ID
    pub case: String,

    /// Pass, Fail, Pending or Blocked (Passed/Failed/Skipped also accepted)
    pub result: String,
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Replace the suites (drops recorded results), repeatable
    #[arg(long = "suite", short = 's')]
    pub suites: Vec<String>,

    /// "Not Started", "In Progress", "Completed" or "Blocked"
    #[arg(long)]
    pub status: Option<RunStatus>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub id: String,
}

/// Run a run subcommand
pub fn run(cmd: RunCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RunCommands::List(args) => run_list(args, global),
        RunCommands::New(args) => run_new(args, global),
        RunCommands::Show(args) => run_show(args, global),
        RunCommands::Record(args) => run_record(args, global),
        RunCommands::Stats(args) => run_stats(args, global),
        RunCommands::Update(args) => run_update(args, global),
        RunCommands::Remove(args) => run_remove(args, global),
    }
}

fn styled_status(status: RunStatus) -> String {
    match status {
        RunStatus::Completed => style(status).green().to_string(),
        RunStatus::InProgress => style(status).yellow().to_string(),
        RunStatus::Blocked => style(status).red().to_string(),
        RunStatus::NotStarted => style(status).dim().to_string(),
    }
}

fn styled_case_result(result: CaseResult) -> String {
    match result {
        CaseResult::Pass => style(result).green().to_string(),
        CaseResult::Fail => style(result).red().to_string(),
        CaseResult::Blocked => style(result).yellow().to_string(),
        CaseResult::Pending => style(result).dim().to_string(),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let runs: Vec<&TestRun> = session.workspace.runs().list(args.product.as_deref());

    let format = effective_format(global.format, true);
    if emit_structured(&runs, format)? {
        return Ok(());
    }

    if runs.is_empty() {
        println!("No runs found.");
        return Ok(());
    }

    let mut listing = Listing::new(&[
        "ID", "NAME", "PRODUCT", "STATUS", "SUITES", "CREATED BY", "CREATED",
    ]);
    for run in runs {
        listing.row(vec![
            run.id.clone(),
            truncate_str(&run.name, 40),
            run.product_id.clone(),
            run.status.to_string(),
            run.test_suites.len().to_string(),
            run.created_by.clone(),
            run.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    listing.print(format, "run");
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let created_by = args
        .created_by
        .unwrap_or_else(|| session.config.author().to_string());
    let suite_ids: Vec<&str> = args.suites.iter().map(String::as_str).collect();

    let run = session.workspace.create_run(
        &args.name,
        &args.description,
        &suite_ids,
        Some(&created_by),
    )?;
    session.save()?;

    if emit_structured(&run, global.format)? {
        return Ok(());
    }
    println!(
        "{} Created run {} {}",
        style("✓").green(),
        style(&run.id).cyan(),
        style(&run.name).yellow()
    );
    println!(
        "   Product: {} | Suites: {}",
        style(&run.product_id).cyan(),
        run.test_suites.len()
    );
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;
    let run = ws
        .runs()
        .get(&args.id)
        .ok_or_else(|| not_found(EntityKind::Run, &args.id))?;

    let resolved: Vec<_> = ws
        .resolve_run(&run.id)
        .into_iter()
        .filter(|(_, r)| args.result.matches(r.result))
        .collect();

    let format = global.format;
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        #[derive(serde::Serialize)]
        struct RunView<'a> {
            run: &'a TestRun,
            cases: Vec<&'a ResolvedCase>,
        }
        let view = RunView {
            run,
            cases: resolved.iter().map(|(_, r)| r).collect(),
        };
        emit_structured(&view, format)?;
        return Ok(());
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&run.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&run.name).yellow());
    println!("{}: {}", style("Product").bold(), run.product_id);
    println!("{}: {}", style("Status").bold(), styled_status(run.status));
    println!("{}: {}", style("Created By").bold(), run.created_by);
    if !run.description.is_empty() {
        println!("{}: {}", style("Description").bold(), run.description);
    }
    println!("{}", style("─".repeat(60)).dim());

    for snapshot in &run.test_suites {
        let cases: Vec<_> = resolved
            .iter()
            .filter(|(suite, _)| suite == &snapshot.id)
            .map(|(_, r)| r)
            .collect();
        println!();
        println!(
            "{} {} ({}):",
            style(&snapshot.name).bold(),
            style(&snapshot.id).dim(),
            cases.len()
        );
        for r in cases {
            let marker = match r.source {
                ResultSource::Overlay => "",
                ResultSource::Canonical => " (case)",
            };
            println!(
                "  • {:<8} {:<12} {:<40} {}{}",
                r.case.test_case_id,
                r.case.id,
                truncate_str(&r.case.use_case, 40),
                styled_case_result(r.result),
                style(marker).dim()
            );
        }
    }
    Ok(())
}

fn run_record(args: RecordArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let result = session
        .workspace
        .record_result(&args.run, &args.case, &args.result)?;
    session.save()?;

    let status = session
        .workspace
        .runs()
        .get(&args.run)
        .map(|r| r.status)
        .unwrap_or_default();
    println!(
        "{} Recorded {} for {} in run {}",
        style("✓").green(),
        styled_case_result(result.to_case()),
        style(&args.case).cyan(),
        style(&args.run).cyan()
    );
    println!("   Run status: {}", styled_status(status));
    Ok(())
}

fn run_stats(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let stats = session
        .workspace
        .run_statistics(&args.id)
        .ok_or_else(|| not_found(EntityKind::Run, &args.id))?;

    let format = effective_format(global.format, true);
    if emit_structured(&stats, format)? {
        return Ok(());
    }

    let mut listing = Listing::new(&[
        "SUITE", "NAME", "TOTAL", "PASS", "FAIL", "BLOCKED", "PENDING", "DONE%",
    ]);
    for s in &stats.suites {
        listing.row(vec![
            s.suite_id.clone(),
            truncate_str(&s.suite_name, 30),
            s.total.to_string(),
            s.passed.to_string(),
            s.failed.to_string(),
            s.blocked.to_string(),
            s.pending.to_string(),
            s.completion.to_string(),
        ]);
    }
    match format {
        OutputFormat::Table => println!("{}", listing.render_table()),
        _ => print!("{}", listing.render_tsv()),
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{} cases: {} passed, {} failed, {} blocked, {} pending",
        style(stats.total).cyan(),
        style(stats.passed).green(),
        style(stats.failed).red(),
        style(stats.blocked).yellow(),
        stats.pending
    );
    println!("Completion: {}%", style(stats.completion).bold());
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let test_suites = if args.suites.is_empty() {
        None
    } else {
        let suites = args
            .suites
            .iter()
            .map(|id| {
                session
                    .workspace
                    .suites()
                    .get(id)
                    .cloned()
                    .ok_or_else(|| not_found(EntityKind::Suite, id))
            })
            .collect::<Result<Vec<TestSuite>>>()?;
        Some(suites)
    };
    let suites_replaced = test_suites.is_some() && args.status.is_none();
    let patch = RunPatch {
        name: args.name,
        description: args.description,
        test_suites,
        status: args.status,
    };

    let run = session
        .workspace
        .runs_mut()
        .update(&args.id, patch)
        .ok_or_else(|| not_found(EntityKind::Run, &args.id))?;
    if suites_replaced {
        session.workspace.refresh_run_status(&run.id);
    }
    session.save()?;

    println!(
        "{} Updated run {} {}",
        style("✓").green(),
        style(&run.id).cyan(),
        style(&run.name).yellow()
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session.workspace.runs_mut().delete(&args.id) {
        return Err(not_found(EntityKind::Run, &args.id));
    }
    session.save()?;

    println!(
        "{} Removed run {}",
        style("✓").green(),
        style(&args.id).cyan()
    );
    Ok(())
}
