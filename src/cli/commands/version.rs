//! `tledger version` command - Product version management

use clap::Subcommand;
use console::style;
use miette::Result;

use super::{not_found, Session};
use crate::cli::output::{effective_format, emit_structured};
use crate::cli::table::Listing;
use crate::cli::GlobalOpts;
use crate::core::{same_product, EntityKind};
use crate::entities::ProductVersion;

#[derive(Subcommand, Debug)]
pub enum VersionCommands {
    /// List registered versions
    List(ListArgs),

    /// Register a version on a product, or on a module's product
    Add(AddArgs),

    /// Remove a version, moving its modules and cases to the latest remaining one
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only versions of this product
    #[arg(long, short = 'p')]
    pub product: Option<String>,
}

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("owner").required(true).args(["product", "module"])))]
pub struct AddArgs {
    /// Version tag, e.g. v1.2
    pub version: String,

    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Register on this module's product and seed a placeholder case
    #[arg(long, short = 'm')]
    pub module: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub version: String,

    #[arg(long, short = 'p')]
    pub product: String,
}

/// Run a version subcommand
pub fn run(cmd: VersionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        VersionCommands::List(args) => run_list(args, global),
        VersionCommands::Add(args) => run_add(args, global),
        VersionCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;

    let versions: Vec<&ProductVersion> = match &args.product {
        Some(product) => {
            let ordered = ws.versions().list_by_product(product);
            ordered
                .iter()
                .filter_map(|v| {
                    ws.versions().all().iter().find(|pv| {
                        same_product(&pv.product_id, product) && &pv.version == v
                    })
                })
                .collect()
        }
        None => ws.versions().all().iter().collect(),
    };

    let format = effective_format(global.format, true);
    if emit_structured(&versions, format)? {
        return Ok(());
    }

    if versions.is_empty() {
        println!("No versions found.");
        return Ok(());
    }

    let mut listing = Listing::new(&["PRODUCT", "VERSION", "ID"]);
    for v in versions {
        listing.row(vec![v.product_id.clone(), v.version.clone(), v.id.clone()]);
    }
    listing.print(format, "version");
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    if let Some(module) = &args.module {
        let case = session
            .workspace
            .add_version_to_module(module, &args.version)?;
        session.save()?;
        println!(
            "{} Added version {} to module {}",
            style("✓").green(),
            style(&args.version).yellow(),
            style(module).cyan()
        );
        println!("  Seeded case {}", style(&case.test_case_id).cyan());
        return Ok(());
    }

    let product = args.product.unwrap_or_default();
    let product_id = session
        .workspace
        .products()
        .get(&product)
        .map(|p| p.id.clone())
        .ok_or_else(|| not_found(EntityKind::Product, &product))?;
    session
        .workspace
        .versions_mut()
        .add(&product_id, &args.version)?;
    session.save()?;

    println!(
        "{} Added version {} to product {}",
        style("✓").green(),
        style(&args.version).yellow(),
        style(&product_id).cyan()
    );
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session
        .workspace
        .remove_version(&args.product, &args.version)
    {
        return Err(miette::miette!(
            "Version {} is not registered for product {}",
            args.version,
            args.product
        ));
    }
    session.save()?;

    let fallback = session
        .workspace
        .versions()
        .latest(&args.product)
        .unwrap_or_default();
    println!(
        "{} Removed version {} from product {}",
        style("✓").green(),
        style(&args.version).yellow(),
        style(&args.product).cyan()
    );
    if !fallback.is_empty() {
        println!("  Latest version is now {}", style(fallback).yellow());
    }
    Ok(())
}
