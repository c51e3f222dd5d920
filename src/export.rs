use std::io::{Read, Write};

use chrono::NaiveDateTime;

use crate::error::{RemitError, Result};
use crate::fmt::amount;
use crate::models::TransactionRow;
use crate::reports::Analysis;
use crate::vendors::VendorMap;

pub const REPORT_SHEET_NAME: &str = "Financial Report";
pub const METRIC_HEADER: &str = "Metric";

pub const REPORT_LABELS: [&str; 13] = [
    "Generated On",
    "Uploaded Files",
    "Date Range",
    "Filters Applied",
    "Total Revenue",
    "Total Refunds",
    "Ipay Commissions",
    "Bank Transfer Charges",
    "VAT on Bank Transfer (16%)",
    "Nayax Commission (1% of C2B)",
    "BCK Commission (0.5% of C2B)",
    "Total VAT",
    "Amount to be Remitted",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    #[cfg(feature = "xlsx")]
    Xlsx,
}

impl ReportFormat {
    pub fn parse(key: &str) -> Result<Self> {
        match key.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            #[cfg(feature = "xlsx")]
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => Err(RemitError::UnknownFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            #[cfg(feature = "xlsx")]
            Self::Xlsx => "xlsx",
        }
    }
}

// ---------------------------------------------------------------------------
// Financial report
// ---------------------------------------------------------------------------

/// The 13-row summary export, computed from the report view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialReport {
    pub currency: String,
    pub rows: Vec<(String, String)>,
}

impl FinancialReport {
    pub fn build(
        analysis: &Analysis<'_>,
        file_names: &[String],
        generated_on: NaiveDateTime,
        currency: &str,
    ) -> Self {
        let m = &analysis.report;
        let values = [
            generated_on.format("%Y-%m-%d %H:%M:%S").to_string(),
            file_names.join(", "),
            analysis.date_range.clone(),
            analysis.filters.clone(),
            amount(m.total_revenue),
            amount(m.total_refunds),
            amount(m.ipay_commission),
            amount(m.bank_transfer_charges),
            amount(m.vat_bank_transfer),
            amount(m.nayax_commission),
            amount(m.bck_commission),
            amount(m.total_vat),
            amount(m.amount_to_remit),
        ];
        let rows = REPORT_LABELS
            .iter()
            .zip(values)
            .map(|(label, value)| (label.to_string(), value))
            .collect();
        Self {
            currency: currency.to_string(),
            rows,
        }
    }

    pub fn value_header(&self) -> String {
        format!("Amount ({})", self.currency)
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([METRIC_HEADER, self.value_header().as_str()])?;
        for (label, value) in &self.rows {
            wtr.write_record([label, value])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| RemitError::Other(e.to_string()))
    }

    #[cfg(feature = "xlsx")]
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(REPORT_SHEET_NAME)?;
        sheet.write_string(0, 0, METRIC_HEADER)?;
        sheet.write_string(0, 1, self.value_header())?;
        for (i, (label, value)) in self.rows.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, label)?;
            sheet.write_string(row, 1, value)?;
        }
        sheet.set_column_width(0, 32)?;
        sheet.set_column_width(1, 48)?;
        Ok(workbook.save_to_buffer()?)
    }

    pub fn to_bytes(&self, format: ReportFormat) -> Result<Vec<u8>> {
        match format {
            ReportFormat::Csv => Ok(self.to_csv_string()?.into_bytes()),
            #[cfg(feature = "xlsx")]
            ReportFormat::Xlsx => self.to_xlsx_bytes(),
        }
    }
}

/// Read a delimited report back into its labeled rows.
pub fn parse_report_csv<R: Read>(reader: R) -> Result<FinancialReport> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.get(0) != Some(METRIC_HEADER) {
        return Err(RemitError::Other(format!(
            "not a financial report: first column is {:?}",
            headers.get(0).unwrap_or("")
        )));
    }
    let currency = headers
        .get(1)
        .and_then(|h| h.strip_prefix("Amount ("))
        .and_then(|h| h.strip_suffix(')'))
        .unwrap_or_default()
        .to_string();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let label = record.get(0).unwrap_or_default().to_string();
        let value = record.get(1).unwrap_or_default().to_string();
        rows.push((label, value));
    }
    Ok(FinancialReport { currency, rows })
}

// ---------------------------------------------------------------------------
// Filtered raw data
// ---------------------------------------------------------------------------

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

/// Write the report-view rows as CSV. Null cells are left blank.
pub fn write_filtered_data<W: Write>(
    writer: W,
    rows: &[&TransactionRow],
    extra_columns: &[String],
    vendors: &VendorMap,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec![
        "Date",
        "Amount",
        "Commission",
        "Vat",
        "Vid",
        "Channel Type",
        "Running Balance",
        "Code",
    ];
    header.extend(extra_columns.iter().map(String::as_str));
    header.extend(["Source File", "Date Only", "Vendor Name"]);
    wtr.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            opt(&row.amount),
            opt(&row.commission),
            opt(&row.vat),
            opt(&row.vendor_id),
            row.channel_type.clone(),
            opt(&row.running_balance),
            row.code.clone().unwrap_or_default(),
        ];
        record.extend(
            extra_columns
                .iter()
                .map(|c| row.extra.get(c).cloned().unwrap_or_default()),
        );
        record.push(row.source_file.clone());
        record.push(
            row.date_only()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        );
        record.push(vendors.name_for(row.vendor_id));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
