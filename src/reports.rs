use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    FilterSelection, TransactionRow, TransactionSet, CHANNEL_BANKCOST, CHANNEL_C2B, CHANNEL_REFUND,
};
use crate::vendors::VendorMap;

/// Flat bank transfer fee charged once per uploaded file.
pub const BANK_TRANSFER_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
pub const BANK_TRANSFER_VAT_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);
pub const NAYAX_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
pub const BCK_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

pub const NO_DATE_RANGE: &str = "N/A";

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Which projection a snapshot is computed over. The two differ only in how
/// bank transfer charges are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Vendor filter only; bank charges always apply.
    Metrics,
    /// Vendor and channel filters; bank charges apply only with a BANKCOST row.
    Report,
}

pub fn metrics_view<'a>(set: &'a TransactionSet, filters: &FilterSelection) -> Vec<&'a TransactionRow> {
    set.rows.iter().filter(|r| filters.accepts_vendor(r)).collect()
}

pub fn report_view<'a>(set: &'a TransactionSet, filters: &FilterSelection) -> Vec<&'a TransactionRow> {
    set.rows
        .iter()
        .filter(|r| filters.accepts_vendor(r) && filters.accepts_channel(r))
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_revenue: Decimal,
    pub total_refunds: Decimal,
    pub bank_transfer_charges: Decimal,
    pub vat_bank_transfer: Decimal,
    pub nayax_commission: Decimal,
    pub bck_commission: Decimal,
    pub ipay_commission: Decimal,
    pub total_vat: Decimal,
    pub amount_to_remit: Decimal,
    pub avg_daily_revenue: Decimal,
    pub c2b_transactions: usize,
    pub row_count: usize,
}

/// Sums without panicking; totals pin at the `Decimal` bounds instead of
/// overflowing.
fn total(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

fn sum_amount<'a>(rows: impl Iterator<Item = &'a TransactionRow>) -> Decimal {
    total(rows.filter_map(|r| r.amount))
}

pub fn compute_snapshot(rows: &[&TransactionRow], file_count: usize, view: View) -> MetricsSnapshot {
    let c2b: Vec<&TransactionRow> = rows.iter().copied().filter(|r| r.is_channel(CHANNEL_C2B)).collect();

    let total_revenue = sum_amount(c2b.iter().copied());
    let total_refunds =
        sum_amount(rows.iter().copied().filter(|r| r.is_channel(CHANNEL_REFUND))).abs();

    let charge_banks = match view {
        View::Metrics => true,
        View::Report => rows.iter().any(|r| r.is_channel(CHANNEL_BANKCOST)),
    };
    let bank_transfer_charges = if charge_banks {
        BANK_TRANSFER_FEE.saturating_mul(Decimal::from(file_count))
    } else {
        Decimal::ZERO
    };
    let vat_bank_transfer = bank_transfer_charges * BANK_TRANSFER_VAT_RATE;
    let nayax_commission = total_revenue * NAYAX_RATE;
    let bck_commission = total_revenue * BCK_RATE;
    let ipay_commission = total(rows.iter().filter_map(|r| r.commission));
    let total_vat = total(rows.iter().filter_map(|r| r.vat));

    let deductions = total(
        [
            total_refunds,
            ipay_commission,
            bank_transfer_charges,
            vat_bank_transfer,
            nayax_commission,
            bck_commission,
            total_vat,
        ]
        .into_iter(),
    );
    let amount_to_remit = total_revenue.saturating_sub(deductions);

    let daily = daily_totals(&c2b);
    let avg_daily_revenue = if daily.is_empty() {
        Decimal::ZERO
    } else {
        total(daily.values().copied()) / Decimal::from(daily.len())
    };

    MetricsSnapshot {
        total_revenue,
        total_refunds,
        bank_transfer_charges,
        vat_bank_transfer,
        nayax_commission,
        bck_commission,
        ipay_commission,
        total_vat,
        amount_to_remit,
        avg_daily_revenue,
        c2b_transactions: c2b.len(),
        row_count: rows.len(),
    }
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

fn daily_totals(rows: &[&TransactionRow]) -> BTreeMap<NaiveDate, Decimal> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for row in rows {
        let Some(day) = row.date_only() else { continue };
        let slot = by_day.entry(day).or_default();
        *slot = slot.saturating_add(row.amount.unwrap_or_default());
    }
    by_day
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub cumulative: Decimal,
}

/// Per-day totals across every channel in the view, oldest first, with a
/// running cumulative sum. Undated rows are left out.
pub fn get_daily_revenue(rows: &[&TransactionRow]) -> Vec<DailyRevenue> {
    let mut running = Decimal::ZERO;
    daily_totals(rows)
        .into_iter()
        .map(|(date, amount)| {
            running = running.saturating_add(amount);
            DailyRevenue {
                date,
                amount,
                cumulative: running,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorRevenue {
    pub vendor: String,
    pub amount: Decimal,
}

/// C2B revenue per resolved vendor name, largest first.
pub fn get_vendor_breakdown(rows: &[&TransactionRow], vendors: &VendorMap) -> Vec<VendorRevenue> {
    let mut by_vendor: HashMap<String, Decimal> = HashMap::new();
    for row in rows.iter().filter(|r| r.is_channel(CHANNEL_C2B)) {
        let slot = by_vendor.entry(vendors.name_for(row.vendor_id)).or_default();
        *slot = slot.saturating_add(row.amount.unwrap_or_default());
    }
    let mut items: Vec<VendorRevenue> = by_vendor
        .into_iter()
        .map(|(vendor, amount)| VendorRevenue { vendor, amount })
        .collect();
    items.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.vendor.cmp(&b.vendor)));
    items
}

pub fn date_range(rows: &[&TransactionRow]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = rows.iter().filter_map(|r| r.date_only());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

pub fn date_range_label(rows: &[&TransactionRow]) -> String {
    match date_range(rows) {
        Some((from, to)) => format!("{} to {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d")),
        None => NO_DATE_RANGE.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Everything one computation cycle produces from a fixed set of inputs.
pub struct Analysis<'a> {
    pub metrics: MetricsSnapshot,
    pub report: MetricsSnapshot,
    pub daily: Vec<DailyRevenue>,
    pub vendors: Vec<VendorRevenue>,
    pub date_range: String,
    pub filters: String,
    pub report_rows: Vec<&'a TransactionRow>,
}

impl Analysis<'_> {
    pub fn is_report_empty(&self) -> bool {
        self.report_rows.is_empty()
    }
}

pub fn compute<'a>(
    set: &'a TransactionSet,
    vendors: &VendorMap,
    filters: &FilterSelection,
) -> Analysis<'a> {
    let metrics_rows = metrics_view(set, filters);
    let report_rows = report_view(set, filters);

    let metrics = compute_snapshot(&metrics_rows, set.file_count(), View::Metrics);
    let report = compute_snapshot(&report_rows, set.file_count(), View::Report);
    tracing::debug!(
        metrics_rows = metrics_rows.len(),
        report_rows = report_rows.len(),
        "computed snapshots"
    );

    Analysis {
        metrics,
        report,
        daily: get_daily_revenue(&report_rows),
        vendors: get_vendor_breakdown(&report_rows, vendors),
        date_range: date_range_label(&report_rows),
        filters: filters.describe(),
        report_rows,
    }
}
