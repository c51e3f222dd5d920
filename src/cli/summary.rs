use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::{load_inputs, InputArgs, EMPTY_NOTICE};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::{compute, MetricsSnapshot};
use crate::settings::load_settings;

fn metric_rows(m: &MetricsSnapshot) -> Vec<(&'static str, Decimal)> {
    vec![
        ("Total Revenue", m.total_revenue),
        ("Avg Daily Revenue", m.avg_daily_revenue),
        ("Ipay Commissions", m.ipay_commission),
        ("Total VAT", m.total_vat),
        ("Total Refunds", m.total_refunds),
        ("Bank Transfer Charges", m.bank_transfer_charges),
        ("VAT on Bank Transfer", m.vat_bank_transfer),
        ("Nayax Commission", m.nayax_commission),
        ("BCK Commission", m.bck_commission),
    ]
}

pub fn run(input: &InputArgs) -> Result<()> {
    let inputs = load_inputs(input)?;
    let analysis = compute(&inputs.set, &inputs.vendors, &inputs.filters);
    let currency = load_settings().currency;

    println!("Files:       {}", inputs.set.file_names.join(", "));
    println!("Rows:        {}", inputs.set.rows.len());
    println!(
        "Channels:    {}",
        inputs.set.channel_types().into_iter().collect::<Vec<_>>().join(", ")
    );
    println!(
        "Vendor IDs:  {}",
        inputs
            .set
            .vendor_ids()
            .iter()
            .map(|id| format!("{id} ({})", inputs.vendors.name_for(Some(*id))))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Date range:  {}", analysis.date_range);
    println!("Filters:     {}", analysis.filters);
    println!();

    let mut table = Table::new();
    table.set_header(vec![
        "Metric".to_string(),
        format!("Key Metrics ({currency})"),
        format!("Report View ({currency})"),
    ]);
    let key = metric_rows(&analysis.metrics);
    let report = metric_rows(&analysis.report);
    for ((label, k), (_, r)) in key.into_iter().zip(report) {
        table.add_row(vec![Cell::new(label), Cell::new(money(k)), Cell::new(money(r))]);
    }
    table.add_row(vec![
        Cell::new("Rows in View"),
        Cell::new(analysis.metrics.row_count),
        Cell::new(analysis.report.row_count),
    ]);
    table.add_row(vec![
        Cell::new("Total C2B Transactions"),
        Cell::new(analysis.metrics.c2b_transactions),
        Cell::new(analysis.report.c2b_transactions),
    ]);

    let remit_label = |v: Decimal| {
        if v >= Decimal::ZERO {
            money(v).green().bold()
        } else {
            money(v).red().bold()
        }
    };
    table.add_row(vec![
        Cell::new("Amount to be Remitted".bold()),
        Cell::new(remit_label(analysis.metrics.amount_to_remit)),
        Cell::new(remit_label(analysis.report.amount_to_remit)),
    ]);

    println!("Key Metrics\n{table}");
    println!(
        "Key metrics use the vendor filter only; the report view also applies the channel filter."
    );
    if analysis.is_report_empty() {
        println!("\n{EMPTY_NOTICE}");
    }
    Ok(())
}
