//! `tledger product` command - Product management

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
use crate::entities::Product;

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products
    List(ListArgs),

    /// Create a product
    Add(AddArgs),

    /// Change a product's name, description or active flag
    Update(UpdateArgs),

    /// Delete a product (its modules are kept)
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by active flag
    #[arg(long, default_value = "all")]
    pub active: ActiveFilter,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Product name
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Product ID (`1` and `p1` are the same product)
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Set the active flag
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub id: String,
}

/// Run a product subcommand
pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::Add(args) => run_add(args, global),
        ProductCommands::Update(args) => run_update(args, global),
        ProductCommands::Remove(args) => run_remove(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workspace;

    let products: Vec<&Product> = ws
        .products()
        .list()
        .iter()
        .filter(|p| args.active.matches(p.is_active))
        .collect();

    let format = effective_format(global.format, true);
    if emit_structured(&products, format)? {
        return Ok(());
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    let mut listing = Listing::new(&["ID", "NAME", "ACTIVE", "MODULES", "VERSIONS", "CREATED"]);
    for product in products {
        listing.row(vec![
            product.id.clone(),
            product.name.clone(),
            yes_no(product.is_active).to_string(),
            ws.modules().list_by_product(&product.id).len().to_string(),
            ws.versions().list_by_product(&product.id).join(","),
            product
                .created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]);
    }
    listing.print(format, "product");
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let product = session
        .workspace
        .products_mut()
        .add(&args.name, args.description.as_deref())?;
    session.save()?;

    if emit_structured(&product, global.format)? {
        return Ok(());
    }
    println!(
        "{} Created product {} {}",
        style("✓").green(),
        style(&product.id).cyan(),
        style(&product.name).yellow()
    );
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let mut product = session
        .workspace
        .products()
        .get(&args.id)
        .cloned()
        .ok_or_else(|| not_found(EntityKind::Product, &args.id))?;

    if let Some(name) = args.name {
        product.name = name;
    }
    if let Some(description) = args.description {
        product.description = Some(description);
    }
    if let Some(active) = args.active {
        product.is_active = active;
    }

    let id = product.id.clone();
    session.workspace.products_mut().update(product);
    session.save()?;

    println!("{} Updated product {}", style("✓").green(), style(&id).cyan());
    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if !session.workspace.products_mut().delete(&args.id) {
        return Err(not_found(EntityKind::Product, &args.id));
    }
    let remaining = session.workspace.modules().list_by_product(&args.id).len();
    session.save()?;

    println!(
        "{} Removed product {}",
        style("✓").green(),
        style(&args.id).cyan()
    );
    if remaining > 0 {
        println!(
            "  {} {} module(s) still reference this product",
            style("!").yellow(),
            remaining
        );
    }
    Ok(())
}
