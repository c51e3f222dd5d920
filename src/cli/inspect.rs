use std::path::Path;

use colored::Colorize;

use crate::cli::report::print_report;
use crate::error::Result;
use crate::export::parse_report_csv;

pub fn run(file: &str) -> Result<()> {
    let reader = std::fs::File::open(Path::new(file))?;
    let report = parse_report_csv(std::io::BufReader::new(reader))?;
    print_report(&report);
    if let Some(remit) = report.get("Amount to be Remitted") {
        println!("Amount to be Remitted: {}", remit.bold());
    }
    Ok(())
}
