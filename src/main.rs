use clap::Parser;
use miette::Result;
use testledger::cli::commands;
use testledger::cli::{Cli, Commands};
use testledger::core::Config;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    // A broken config file is reported by the command itself
    let config = commands::load_config(&cli.global).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter(cli.global.verbose))
        .with_writer(std::io::stderr)
        .init();

    let global = &cli.global;
    match cli.command {
        Commands::Product(cmd) => commands::product::run(cmd, global),
        Commands::Version(cmd) => commands::version::run(cmd, global),
        Commands::Module(cmd) => commands::module::run(cmd, global),
        Commands::Case(cmd) => commands::case::run(cmd, global),
        Commands::Suite(cmd) => commands::suite::run(cmd, global),
        Commands::Run(cmd) => commands::run::run(cmd, global),
        Commands::Summary(args) => commands::summary::run(args, global),
        Commands::Check(args) => commands::check::run(args, global),
        Commands::Import(args) => commands::import::run(args, global),
        Commands::Export(args) => commands::export::run(args, global),
        Commands::Reset(args) => commands::reset::run(args, global),
        Commands::Completions(args) => commands::completions::run(args, global),
    }
}
