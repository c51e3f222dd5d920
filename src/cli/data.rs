use std::path::PathBuf;

use crate::cli::{load_inputs, write_output, InputArgs, EMPTY_NOTICE};
use crate::error::Result;
use crate::export::write_filtered_data;
use crate::reports::report_view;
use crate::settings::get_export_dir;

pub fn run(input: &InputArgs, output: Option<String>) -> Result<()> {
    let inputs = load_inputs(input)?;
    let rows = report_view(&inputs.set, &inputs.filters);

    let mut buf = Vec::new();
    write_filtered_data(&mut buf, &rows, &inputs.set.extra_columns, &inputs.vendors)?;

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| get_export_dir().join("filtered_sales_data.csv"));
    write_output(&buf, &path)?;

    if rows.is_empty() {
        println!("{EMPTY_NOTICE}");
    }
    println!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
