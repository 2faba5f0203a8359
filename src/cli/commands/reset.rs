//! `tledger reset` command - Replace the store with the sample dataset

use console::style;
use dialoguer::Confirm;
use miette::{IntoDiagnostic, Result};
use tracing::info;

use super::load_config;
use crate::cli::GlobalOpts;
use crate::core::Workspace;
use crate::storage::{JsonFileStore, KeyValueStore};

#[derive(clap::Args, Debug)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ResetArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let path = config.store_path();

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Discard everything in {} and restore the sample data?",
                path.display()
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    let mut store = JsonFileStore::open(&path)?;
    store.clear()?;
    let workspace = Workspace::seeded()?;
    workspace.save(&mut store)?;
    info!(path = %path.display(), "store reset to sample data");

    println!(
        "{} Restored sample data ({} products, {} modules, {} test cases)",
        style("✓").green(),
        style(workspace.products().list().len()).cyan(),
        style(workspace.modules().all().len()).cyan(),
        style(workspace.cases().len()).cyan()
    );
    Ok(())
}
