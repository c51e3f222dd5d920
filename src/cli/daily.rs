use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::{load_inputs, InputArgs, EMPTY_NOTICE};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::compute;

pub fn run(input: &InputArgs) -> Result<()> {
    let inputs = load_inputs(input)?;
    let analysis = compute(&inputs.set, &inputs.vendors, &inputs.filters);

    if analysis.is_report_empty() {
        println!("{EMPTY_NOTICE}");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Daily Revenue", "Cumulative"]);
    for day in &analysis.daily {
        table.add_row(vec![
            Cell::new(day.date.format("%Y-%m-%d")),
            Cell::new(money(day.amount)),
            Cell::new(money(day.cumulative)),
        ]);
    }
    println!("Daily Revenue\n{table}");

    if !analysis.vendors.is_empty() {
        let total: Decimal = analysis.vendors.iter().map(|v| v.amount).sum();
        let mut vtable = Table::new();
        vtable.set_header(vec!["Vendor", "Revenue", "%"]);
        for v in &analysis.vendors {
            let pct = if total.is_zero() {
                Decimal::ZERO
            } else {
                v.amount / total * Decimal::ONE_HUNDRED
            };
            vtable.add_row(vec![
                Cell::new(&v.vendor),
                Cell::new(money(v.amount)),
                Cell::new(format!("{:.1}%", pct.round_dp(1))),
            ]);
        }
        println!("\nRevenue by Vendor (C2B Only)\n{vtable}");
    }
    Ok(())
}
