use std::path::PathBuf;

use comfy_table::{Cell, Table};

use crate::cli::{load_inputs, write_output, InputArgs};
use crate::error::Result;
use crate::export::{FinancialReport, ReportFormat, METRIC_HEADER};
use crate::reports::compute;
use crate::settings::{get_export_dir, load_settings};

pub(crate) fn print_report(report: &FinancialReport) {
    let mut table = Table::new();
    table.set_header(vec![METRIC_HEADER.to_string(), report.value_header()]);
    for (label, value) in &report.rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("Financial Report\n{table}");
}

pub fn run(input: &InputArgs, format: &str, output: Option<String>) -> Result<()> {
    let format = ReportFormat::parse(format)?;
    let inputs = load_inputs(input)?;
    let analysis = compute(&inputs.set, &inputs.vendors, &inputs.filters);

    let settings = load_settings();
    let report = FinancialReport::build(
        &analysis,
        &inputs.set.file_names,
        chrono::Local::now().naive_local(),
        &settings.currency,
    );
    let bytes = report.to_bytes(format)?;

    let path = output.map(PathBuf::from).unwrap_or_else(|| {
        get_export_dir().join(format!("sales_financial_report.{}", format.extension()))
    });
    write_output(&bytes, &path)?;

    print_report(&report);
    println!("Wrote {}", path.display());
    Ok(())
}
