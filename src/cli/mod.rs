pub mod daily;
pub mod data;
pub mod inspect;
pub mod report;
pub mod summary;
pub mod vendors;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::error::Result;
use crate::importer::load_paths;
use crate::models::{FilterSelection, TransactionSet};
use crate::settings::load_settings;
use crate::vendors::{ResolvedVendors, VendorMap};

#[derive(Parser)]
#[command(
    name = "remit",
    version,
    about = "Analyze sales exports and compute the amount to be remitted."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Files plus the filters and vendor mapping applied to them.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Tab-separated export files (title line, then header row)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Channel types for the report view and series (default: all)
    #[arg(long = "channel", value_delimiter = ',')]
    pub channels: Vec<String>,
    /// Vendor IDs applied to every view (default: all)
    #[arg(long = "vid", value_delimiter = ',')]
    pub vids: Vec<i64>,
    /// Vendor mapping as JSON, e.g. '{"254499": "Vendlite"}'
    #[arg(long)]
    pub vendors: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show key metrics and the amount to be remitted.
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Write the financial report (CSV or Excel).
    Report {
        #[command(flatten)]
        input: InputArgs,
        /// Report format: csv or xlsx
        #[arg(long, default_value = "csv")]
        format: String,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
    /// Write the filtered transaction rows as CSV.
    Data {
        #[command(flatten)]
        input: InputArgs,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
    /// Show daily and cumulative revenue plus revenue by vendor.
    Daily {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print a previously exported CSV report.
    Inspect {
        /// Path to the report CSV
        file: String,
    },
    /// Manage the vendor ID to name mapping.
    Vendors {
        #[command(subcommand)]
        command: VendorsCommands,
    },
}

#[derive(Subcommand)]
pub enum VendorsCommands {
    /// Show the mapping in effect.
    List,
    /// Save a mapping, e.g. '{"254499": "Vendlite", "254754": "VendorX"}'.
    Set {
        /// JSON object of vendor ID to name
        mapping: String,
    },
    /// Remove the saved mapping and go back to the default.
    Reset,
}

/// Inputs for one computation cycle, captured up front.
pub(crate) struct Inputs {
    pub set: TransactionSet,
    pub vendors: VendorMap,
    pub filters: FilterSelection,
}

/// Mapping precedence: `--vendors`, then the saved mapping, then the default.
pub(crate) fn resolve_vendors(flag: Option<&str>) -> ResolvedVendors {
    if flag.is_some() {
        return VendorMap::resolve(flag);
    }
    match load_settings().vendor_mapping {
        Some(value) => VendorMap::resolve_value(&value),
        None => VendorMap::resolve(None),
    }
}

pub(crate) fn load_inputs(args: &InputArgs) -> Result<Inputs> {
    let set = load_paths(&args.files)?;
    let resolved = resolve_vendors(args.vendors.as_deref());
    if let Some(warning) = &resolved.warning {
        eprintln!("{} {warning}", "Warning:".yellow().bold());
    }
    if set.coerced_cells > 0 {
        eprintln!(
            "{} {} cell(s) could not be parsed and were left empty",
            "Note:".yellow(),
            set.coerced_cells
        );
    }
    Ok(Inputs {
        vendors: resolved.map,
        filters: FilterSelection::from_data(
            &set,
            args.channels.iter().cloned(),
            args.vids.iter().copied(),
        ),
        set,
    })
}

pub(crate) fn write_output(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

pub(crate) const EMPTY_NOTICE: &str =
    "No data available after applying filters. Adjust filters to view charts.";
