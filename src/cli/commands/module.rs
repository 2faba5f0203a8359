//! `tledger module` command - Module and attribute management

use clap::Subcommand;
use console::style;
use miette::Result;

use super::{not_found, Session};
use crate::cli::filters::ActiveFilter;
use crate::cli::helpers::yes_no;
use crate::cli::output::{effective_format, emit_structured};
use crate::cli::table::Listing;
use crate::cli::GlobalOpts;
use crate::core::EntityKind;
use crate::entities::{AttributeType, ModulePatch, NewAttribute, ProductModule};

#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    /// List modules
    List(ListArgs),

    /// Create a module (seeded with one placeholder case)
    Add(AddArgs),

    /// Patch a module's fields
    Update(UpdateArgs),

    /// Delete a module and all of its test cases
    Remove(RemoveArgs),

    /// Versions used by a module's test cases
    Versions(VersionsArgs),

    /// Declare a custom attribute on a module
    AttrAdd(AttrAddArgs),

    /// Remove a custom attribute by ID or key
    AttrRemove(AttrRemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Only modules whose default version is this one (needs --product)
    #[arg(long, requires = "product")]
    pub version: Option<String>,

    #[arg(long, default_value = "all")]
    pub active: ActiveFilter,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Module name
    pub name: String,

    #[arg(long, short = 'p')]
    pub product: String,

    /// Defaults to the product's latest version, or v1.0
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub version: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct VersionsArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct AttrAddArgs {
    /// Module ID
    pub module: String,

    /// Attribute key, matched against case attribute keys
    pub key: String,

    /// Display name (defaults to the key)
    #[arg(long)]
    pub name: Option<String>,

    /// text, number, boolean or select
    #[arg(long = "type", short = 't', default_value = "text")]
    pub attr_type: AttributeType,

    #[arg(long)]
    pub required: bool,

    /// Choices for select attributes
    #[arg(long, value_delimiter = ',')]
    pub options: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AttrRemoveArgs {
    pub module: String,

    /// Attribute ID or key
    pub attribute: String,
}

/// Run a module subcommand
pub fn run(cmd: ModuleCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ModuleCommands::List(args) => run_list(args, global),
        ModuleCommands::Add(args) => run_add(args, global),
        ModuleCommands::Update(args) => run_update(args, global),
        ModuleCommands::Remove(args) => run_remove(args, global),
        ModuleCommands::Versions(args) => run_versions(args, global),
        ModuleCommands::AttrAdd(args) => run_attr_add(args, global),
        ModuleCommands::AttrRemove(args) => run_attr_remove(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;

    let modules: Vec<&ProductModule> = match (&args.product, &args.version) {
        (Some(product), Some(version)) => {
            ws.modules().list_by_product_and_version(product, version)
        }
        (Some(product), None) => ws.modules().list_by_product(product),
        _ => ws.modules().all().iter().collect(),
    };
    let modules: Vec<&ProductModule> = modules
        .into_iter()
        .filter(|m| args.active.matches(m.is_active))
        .collect();

    let format = effective_format(global.format, true);
    if emit_structured(&modules, format)? {
        return Ok(());
    }

    if modules.is_empty() {
        println!("No modules found.");
        return Ok(());
    }

    let mut listing = Listing::new(&[
        "ID", "NAME", "PRODUCT", "VERSION", "CASES", "ATTRS", "ACTIVE",
    ]);
    for module in modules {
        listing.row(vec![
            module.id.clone(),
            module.name.clone(),
            module.product_id.clone(),
            module.version.clone(),
            ws.cases().by_module(&module.id).len().to_string(),
            module.attributes.len().to_string(),
            yes_no(module.is_active).to_string(),
        ]);
    }
    listing.print(format, "module");
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session
        .workspace
        .add_module(&args.name, &args.product, args.version.as_deref())?;
    session.save()?;

    if let Some(module) = session.workspace.modules().get(&id) {
        if emit_structured(module, global.format)? {
            return Ok(());
        }
        println!(
            "{} Created module {} {}",
            style("✓").green(),
            style(&module.id).cyan(),
            style(&module.name).yellow()
        );
        println!("   Version: {}", style(&module.version).yellow());
    }
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let patch = ModulePatch {
        name: args.name,
        description: args.description,
        version: args.version,
        is_active: args.active,
    };
    if !session.workspace.update_module(&args.id, patch)? {
        return Err(not_found(EntityKind::Module, &args.id));
    }
    session.save()?;

    println!(
        "{} Updated module {}",
        style("✓").green(),
        style(&args.id).cyan()
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let cases = session.workspace.cases().by_module(&args.id).len();
    if !session.workspace.delete_module(&args.id) {
        return Err(not_found(EntityKind::Module, &args.id));
    }
    session.save()?;

    println!(
        "{} Removed module {} and {} test case(s)",
        style("✓").green(),
        style(&args.id).cyan(),
        cases
    );
    Ok(())
}

fn run_versions(args: VersionsArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    if !session.workspace.modules().exists(&args.id) {
        return Err(not_found(EntityKind::Module, &args.id));
    }
    let versions = session.workspace.versions_by_module(&args.id);

    let format = effective_format(global.format, true);
    if emit_structured(&versions, format)? {
        return Ok(());
    }
    for version in &versions {
        println!("{}", version);
    }
    Ok(())
}

fn run_attr_add(args: AttrAddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let attribute = NewAttribute {
        key: args.key,
        name: args.name.unwrap_or_default(),
        attr_type: args.attr_type,
        is_required: args.required,
        options: (!args.options.is_empty()).then_some(args.options),
    };
    let (id, key) = {
        let added = session
            .workspace
            .modules_mut()
            .add_attribute(&args.module, attribute)?;
        (added.id.clone(), added.key.clone())
    };
    session.save()?;

    println!(
        "{} Added attribute {} ({}) to module {}",
        style("✓").green(),
        style(&key).yellow(),
        id,
        style(&args.module).cyan()
    );
    Ok(())
}

fn run_attr_remove(args: AttrRemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session
        .workspace
        .modules_mut()
        .remove_attribute(&args.module, &args.attribute)
    {
        return Err(not_found(EntityKind::Attribute, &args.attribute));
    }
    session.save()?;

    println!(
        "{} Removed attribute {} from module {}",
        style("✓").green(),
        style(&args.attribute).yellow(),
        style(&args.module).cyan()
    );
    Ok(())
}
