use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::resolve_vendors;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};
use crate::vendors::VendorMap;

pub fn list() -> Result<()> {
    let resolved = resolve_vendors(None);
    if let Some(warning) = &resolved.warning {
        eprintln!("{} {warning}", "Warning:".yellow().bold());
    }

    if resolved.map.is_empty() {
        println!("Vendor mapping is empty.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Vid", "Vendor Name"]);
    for (id, name) in resolved.map.iter() {
        table.add_row(vec![Cell::new(id), Cell::new(name)]);
    }
    let source = if load_settings().vendor_mapping.is_some() {
        "saved"
    } else {
        "default"
    };
    println!("Vendor Mapping ({source})\n{table}");
    println!("Unmapped vendor IDs are shown as their numeric ID.");
    Ok(())
}

pub fn set(mapping: &str) -> Result<()> {
    let map = VendorMap::parse(mapping)?;
    let mut settings = load_settings();
    settings.vendor_mapping = Some(map.to_value());
    save_settings(&settings)?;
    println!("Saved {} vendor mapping(s)", map.len());
    Ok(())
}

pub fn reset() -> Result<()> {
    let mut settings = load_settings();
    settings.vendor_mapping = None;
    save_settings(&settings)?;
    println!("Vendor mapping reset to default");
    Ok(())
}
