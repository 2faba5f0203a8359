//! `tledger case` command - Test case and step management

use clap::Subcommand;
use console::style;
use miette::Result;

use super::{not_found, Session};
use crate::cli::filters::ResultFilter;
use crate::cli::helpers::{parse_key_value, truncate_str};
use crate::cli::output::{effective_format, emit_structured};
use crate::cli::table::Listing;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CaseFilter, CaseResult, EntityKind, LedgerError, StoredResult, Workspace};
use crate::entities::{NewTestCase, TestCase, TestCaseAttribute, TestType};

#[derive(Subcommand, Debug)]
pub enum CaseCommands {
    /// List test cases with filtering
    List(ListArgs),

    /// Show a test case's details
    Show(ShowArgs),

    /// Create a test case
    Add(AddArgs),

    /// Change fields of a test case
    Set(SetArgs),

    /// Delete a test case
    Remove(RemoveArgs),

    /// Count cases per stored result
    Counts(CountsArgs),

    /// Append a procedure step
    StepAdd(StepAddArgs),

    /// Edit a procedure step
    StepUpdate(StepUpdateArgs),

    /// Delete a procedure step
    StepRemove(StepRemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 'm', conflicts_with = "product")]
    pub module: Option<String>,

    #[arg(long, short = 'p')]
    pub product: Option<String>,

    #[arg(long)]
    pub version: Option<String>,

    /// Substring of the business ID (case-insensitive)
    #[arg(long)]
    pub id: Option<String>,

    /// Substring of the use case (case-insensitive)
    #[arg(long)]
    pub use_case: Option<String>,

    #[arg(long, short = 'r', default_value = "all")]
    pub result: ResultFilter,

    /// Attribute filter as key=value (value is a substring)
    #[arg(long, value_parser = parse_key_value)]
    pub attr: Option<(String, String)>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Internal case ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long, short = 'm')]
    pub module: String,

    /// Defaults to the module's version
    #[arg(long)]
    pub version: Option<String>,

    /// Business ID; generated as TC#### when omitted
    #[arg(long = "test-case-id")]
    pub test_case_id: Option<String>,

    #[arg(long, short = 'u', default_value = "")]
    pub use_case: String,

    #[arg(long, short = 's', default_value = "")]
    pub scenario: String,

    /// Manual, Automation, WebAPI, Database or Performance
    #[arg(long = "type", default_value = "Manual")]
    pub test_type: TestType,

    #[arg(long)]
    pub tool: Option<String>,

    #[arg(long)]
    pub result: Option<CaseResult>,

    /// Step action, repeatable; paired with --expected by position
    #[arg(long = "step")]
    pub steps: Vec<String>,

    #[arg(long)]
    pub expected: Vec<String>,

    /// Custom attribute as key=value, repeatable
    #[arg(long = "attr", value_parser = parse_key_value)]
    pub attrs: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    pub id: String,

    #[arg(long)]
    pub version: Option<String>,

    #[arg(long, short = 'u')]
    pub use_case: Option<String>,

    #[arg(long, short = 's')]
    pub scenario: Option<String>,

    #[arg(long = "type")]
    pub test_type: Option<TestType>,

    #[arg(long)]
    pub tool: Option<String>,

    #[arg(long, short = 'r')]
    pub result: Option<CaseResult>,

    #[arg(long)]
    pub actual: Option<String>,

    #[arg(long)]
    pub remarks: Option<String>,

    /// Set a custom attribute (key=value), repeatable
    #[arg(long = "attr", value_parser = parse_key_value)]
    pub attrs: Vec<(String, String)>,

    /// Attach an evidence reference (path or URL), repeatable
    #[arg(long = "upload")]
    pub uploads: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct CountsArgs {
    #[arg(long, short = 'm')]
    pub module: Option<String>,

    #[arg(long)]
    pub version: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StepAddArgs {
    /// Case ID
    pub case: String,

    /// Action to perform
    pub action: String,

    #[arg(long, short = 'e', default_value = "")]
    pub expected: String,
}

#[derive(clap::Args, Debug)]
pub struct StepUpdateArgs {
    pub case: String,

    pub step: u32,

    #[arg(long, short = 'a')]
    pub action: Option<String>,

    #[arg(long, short = 'e')]
    pub expected: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StepRemoveArgs {
    pub case: String,

    pub step: u32,
}

/// Run a case subcommand
pub fn run(cmd: CaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CaseCommands::List(args) => run_list(args, global),
        CaseCommands::Show(args) => run_show(args, global),
        CaseCommands::Add(args) => run_add(args, global),
        CaseCommands::Set(args) => run_set(args, global),
        CaseCommands::Remove(args) => run_remove(args, global),
        CaseCommands::Counts(args) => run_counts(args, global),
        CaseCommands::StepAdd(args) => run_step_add(args, global),
        CaseCommands::StepUpdate(args) => run_step_update(args, global),
        CaseCommands::StepRemove(args) => run_step_remove(args, global),
    }
}

/// Cases in scope of the module/product/version options, sorted by business ID
fn scoped<'a>(
    ws: &'a Workspace,
    module: Option<&str>,
    product: Option<&str>,
    version: Option<&str>,
) -> Vec<&'a TestCase> {
    match (module, product, version) {
        (Some(m), _, Some(v)) => ws.cases().by_module_and_version(m, v),
        (Some(m), _, None) => ws.cases().by_module(m),
        (None, Some(p), Some(v)) => ws.cases_by_product_and_version(p, v),
        (None, Some(p), None) => ws.cases_by_product(p),
        (None, None, version) => {
            let mut all: Vec<&TestCase> = ws
                .cases()
                .all()
                .iter()
                .filter(|c| version.map_or(true, |v| c.version == v))
                .collect();
            all.sort_by(|a, b| a.test_case_id.cmp(&b.test_case_id));
            all
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;

    let filter = CaseFilter {
        test_case_id: args.id,
        use_case: args.use_case,
        result: args.result.as_result(),
        attribute: args.attr,
    };
    let cases: Vec<&TestCase> = scoped(
        ws,
        args.module.as_deref(),
        args.product.as_deref(),
        args.version.as_deref(),
    )
    .into_iter()
    .filter(|c| filter.matches(c))
    .collect();

    if args.count {
        println!("{}", cases.len());
        return Ok(());
    }

    let format = effective_format(global.format, true);
    if emit_structured(&cases, format)? {
        return Ok(());
    }

    if cases.is_empty() {
        println!("No test cases found.");
        return Ok(());
    }

    let mut listing = Listing::new(&[
        "ID", "TEST CASE", "MODULE", "VERSION", "USE CASE", "TYPE", "RESULT",
    ]);
    for case in cases {
        listing.row(vec![
            case.id.clone(),
            case.test_case_id.clone(),
            case.module_id.clone(),
            case.version.clone(),
            truncate_str(&case.use_case, 40),
            case.test_type.to_string(),
            case.result.to_string(),
        ]);
    }
    listing.print(format, "test case");
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;
    let case = ws
        .cases()
        .get(&args.id)
        .ok_or_else(|| not_found(EntityKind::TestCase, &args.id))?;

    if emit_structured(case, global.format)? {
        return Ok(());
    }

    let module_name = ws
        .modules()
        .get(&case.module_id)
        .map(|m| m.name.as_str())
        .unwrap_or("(missing module)");

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&case.id).cyan());
    println!(
        "{}: {}",
        style("Test Case").bold(),
        style(&case.test_case_id).yellow()
    );
    println!(
        "{}: {} ({})",
        style("Module").bold(),
        module_name,
        case.module_id
    );
    println!("{}: {}", style("Version").bold(), case.version);
    println!("{}: {}", style("Type").bold(), case.test_type);
    if let Some(tool) = &case.test_tool {
        println!("{}: {}", style("Tool").bold(), tool);
    }
    println!("{}: {}", style("Result").bold(), styled_result(case.result));
    println!("{}", style("─".repeat(60)).dim());

    println!();
    println!("{}: {}", style("Use Case").bold(), case.use_case);
    println!("{}: {}", style("Scenario").bold(), case.scenario);

    if !case.steps.is_empty() {
        println!();
        println!("{} ({}):", style("Steps").bold(), case.step_count());
        for step in &case.steps {
            println!("  {}. {}", step.id, step.steps);
            if !step.expected_result.is_empty() {
                println!("     {} {}", style("→").dim(), step.expected_result);
            }
        }
    }

    if !case.actual.is_empty() {
        println!();
        println!("{}: {}", style("Actual").bold(), case.actual);
    }
    if !case.remarks.is_empty() {
        println!("{}: {}", style("Remarks").bold(), case.remarks);
    }

    if !case.attributes.is_empty() {
        println!();
        println!("{}:", style("Attributes").bold());
        for attr in &case.attributes {
            println!("  {} = {}", attr.key, attr.value);
        }
    }

    if !case.uploads.is_empty() {
        println!();
        println!("{} ({}):", style("Uploads").bold(), case.uploads.len());
        for upload in &case.uploads {
            println!("  • {}", upload);
        }
    }

    Ok(())
}

pub(crate) fn styled_result(result: StoredResult) -> String {
    match result.normalize() {
        CaseResult::Pass => style(result).green().to_string(),
        CaseResult::Fail => style(result).red().to_string(),
        CaseResult::Blocked => style(result).yellow().to_string(),
        CaseResult::Pending => style(result).dim().to_string(),
    }
}

fn set_attribute(attributes: &mut Vec<TestCaseAttribute>, key: String, value: String) {
    match attributes.iter_mut().find(|a| a.key == key) {
        Some(existing) => existing.value = value,
        None => attributes.push(TestCaseAttribute { key, value }),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let version = match args.version {
        Some(v) => v,
        None => session
            .workspace
            .modules()
            .get(&args.module)
            .map(|m| m.version.clone())
            .ok_or_else(|| LedgerError::InvalidModule(args.module.clone()))?,
    };

    let mut draft = NewTestCase::new(&args.module, version)
        .with_use_case(args.use_case)
        .with_scenario(args.scenario);
    draft.test_case_id = args.test_case_id;
    draft.test_type = args.test_type;
    draft.test_tool = args.tool;
    draft.result = args.result.map(StoredResult::from);
    for (index, action) in args.steps.into_iter().enumerate() {
        let expected = args.expected.get(index).cloned().unwrap_or_default();
        draft = draft.with_step(action, expected);
    }
    for (key, value) in args.attrs {
        set_attribute(&mut draft.attributes, key, value);
    }

    let case = session.workspace.add_case(draft)?;
    session.save()?;

    if emit_structured(&case, global.format)? {
        return Ok(());
    }
    println!(
        "{} Created test case {} {}",
        style("✓").green(),
        style(&case.id).cyan(),
        style(&case.test_case_id).yellow()
    );
    println!(
        "   Module: {} | Version: {}",
        style(&case.module_id).cyan(),
        style(&case.version).yellow()
    );
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let mut case = session
        .workspace
        .cases()
        .get(&args.id)
        .cloned()
        .ok_or_else(|| not_found(EntityKind::TestCase, &args.id))?;

    if let Some(version) = args.version {
        case.version = version;
    }
    if let Some(use_case) = args.use_case {
        case.use_case = use_case;
    }
    if let Some(scenario) = args.scenario {
        case.scenario = scenario;
    }
    if let Some(test_type) = args.test_type {
        case.test_type = test_type;
    }
    if let Some(tool) = args.tool {
        case.test_tool = Some(tool);
    }
    if let Some(result) = args.result {
        case.result = result.into();
    }
    if let Some(actual) = args.actual {
        case.actual = actual;
    }
    if let Some(remarks) = args.remarks {
        case.remarks = remarks;
    }
    for (key, value) in args.attrs {
        set_attribute(&mut case.attributes, key, value);
    }
    case.uploads.extend(args.uploads);

    let case = session.workspace.update_case(case)?;
    session.save()?;

    if emit_structured(&case, global.format)? {
        return Ok(());
    }
    println!(
        "{} Updated test case {} ({})",
        style("✓").green(),
        style(&case.id).cyan(),
        styled_result(case.result)
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session.workspace.cases_mut().delete(&args.id) {
        return Err(not_found(EntityKind::TestCase, &args.id));
    }
    session.save()?;

    println!(
        "{} Removed test case {}",
        style("✓").green(),
        style(&args.id).cyan()
    );
    Ok(())
}

fn run_counts(args: CountsArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let counts = session
        .workspace
        .cases()
        .count_by_status(args.module.as_deref(), args.version.as_deref());

    let format = effective_format(global.format, true);
    if emit_structured(&counts, format)? {
        return Ok(());
    }

    let mut listing = Listing::new(&["RESULT", "COUNT"]);
    for (result, count) in counts.iter() {
        listing.row(vec![result.to_string(), count.to_string()]);
    }
    match format {
        OutputFormat::Table => println!("{}", listing.render_table()),
        _ => print!("{}", listing.render_tsv()),
    }
    println!();
    println!(
        "{} pass, {} fail, {} blocked, {} pending ({} total)",
        style(counts.normalized(CaseResult::Pass)).green(),
        style(counts.normalized(CaseResult::Fail)).red(),
        style(counts.normalized(CaseResult::Blocked)).yellow(),
        counts.normalized(CaseResult::Pending),
        style(counts.total()).cyan()
    );
    Ok(())
}

fn run_step_add(args: StepAddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let step = session
        .workspace
        .cases_mut()
        .add_step(&args.case, &args.action, &args.expected)?;
    session.save()?;

    println!(
        "{} Added step {} to test case {}",
        style("✓").green(),
        style(step).yellow(),
        style(&args.case).cyan()
    );
    Ok(())
}

fn run_step_update(args: StepUpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let updated = session.workspace.cases_mut().update_step(
        &args.case,
        args.step,
        args.action.as_deref(),
        args.expected.as_deref(),
    )?;
    if !updated {
        return Err(not_found(EntityKind::Step, &args.step.to_string()));
    }
    session.save()?;

    print_step_change("Updated", args.step, &args.case);
    Ok(())
}

fn run_step_remove(args: StepRemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session
        .workspace
        .cases_mut()
        .remove_step(&args.case, args.step)?
    {
        return Err(not_found(EntityKind::Step, &args.step.to_string()));
    }
    session.save()?;

    print_step_change("Removed", args.step, &args.case);
    Ok(())
}

fn print_step_change(verb: &str, step: u32, case: &str) {
    println!(
        "{} {} step {} of test case {}",
        style("✓").green(),
        verb,
        style(step).yellow(),
        style(case).cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_replaces_existing_key() {
        let mut attrs = vec![TestCaseAttribute {
            key: "browser".into(),
            value: "firefox".into(),
        }];
        set_attribute(&mut attrs, "browser".into(), "chrome".into());
        set_attribute(&mut attrs, "os".into(), "linux".into());

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].value, "chrome");
        assert_eq!(attrs[1].key, "os");
    }

    #[test]
    fn test_scoped_without_filters_is_sorted() {
        let ws = Workspace::seeded().unwrap();
        let cases = scoped(&ws, None, None, None);
        assert_eq!(cases.len(), ws.cases().len());
        assert!(cases
            .windows(2)
            .all(|w| w[0].test_case_id <= w[1].test_case_id));
    }

    #[test]
    fn test_scoped_by_module_and_version() {
        let ws = Workspace::seeded().unwrap();
        let cases = scoped(&ws, Some("mod1"), None, Some("v1.1"));
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].test_case_id, "TC102");
    }
}
