//! Top-level argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    case::CaseCommands, check::CheckArgs, completions::CompletionsArgs, export::ExportArgs,
    import::ImportArgs, module::ModuleCommands, product::ProductCommands, reset::ResetArgs,
    run::RunCommands, suite::SuiteCommands, summary::SummaryArgs, version::VersionCommands,
};

#[derive(Parser, Debug)]
#[command(name = "tledger")]
#[command(author, version, about = "Products, versioned modules, test cases, suites and runs")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Snapshot file (overrides config and TLEDGER_STORE)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// TSV for lists, readable text for single records
    #[default]
    Auto,
    /// Boxed table
    Table,
    /// Tab-separated with a header row
    Tsv,
    Json,
    Yaml,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage products
    #[command(subcommand)]
    Product(ProductCommands),

    /// Manage product versions
    #[command(subcommand)]
    Version(VersionCommands),

    /// Manage modules and their custom attributes
    #[command(subcommand)]
    Module(ModuleCommands),

    /// Manage test cases and their steps
    #[command(subcommand)]
    Case(CaseCommands),

    /// Manage test suites
    #[command(subcommand)]
    Suite(SuiteCommands),

    /// Create runs and record results
    #[command(subcommand)]
    Run(RunCommands),

    /// Module x version coverage for a product
    Summary(SummaryArgs),

    /// Scan the workspace for dangling references
    Check(CheckArgs),

    /// Import test cases from a CSV file
    Import(ImportArgs),

    /// Export test cases to CSV
    Export(ExportArgs),

    /// Replace the stored workspace with the built-in sample data
    Reset(ResetArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
