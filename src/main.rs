mod cli;
mod error;
mod export;
mod fmt;
mod importer;
mod models;
mod reports;
mod settings;
mod vendors;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, VendorsCommands};

const TROUBLESHOOTING: &str = "\
Troubleshooting tips:
  - Verify all files are tab-separated (open in a text editor to check for tabs).
  - Ensure all files have the same columns: Date, Amount, Commission, Vat, Vid, Channel Type.
  - The first line of each file is skipped; the second line must be the header row.
  - Spreadsheet files must be exported as tab-separated text first.";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summary { input } => cli::summary::run(&input),
        Commands::Report {
            input,
            format,
            output,
        } => cli::report::run(&input, &format, output),
        Commands::Data { input, output } => cli::data::run(&input, output),
        Commands::Daily { input } => cli::daily::run(&input),
        Commands::Inspect { file } => cli::inspect::run(&file),
        Commands::Vendors { command } => match command {
            VendorsCommands::List => cli::vendors::list(),
            VendorsCommands::Set { mapping } => cli::vendors::set(&mapping),
            VendorsCommands::Reset => cli::vendors::reset(),
        },
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("{} {e}", "Error:".red().bold());
        eprintln!("{TROUBLESHOOTING}");
        std::process::exit(1);
    }
}
