use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

pub const CHANNEL_C2B: &str = "C2B";
pub const CHANNEL_REFUND: &str = "REFUND";
pub const CHANNEL_BANKCOST: &str = "BANKCOST";

/// One uploaded record. Cells that failed to parse are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub date: Option<NaiveDateTime>,
    pub amount: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub vat: Option<Decimal>,
    pub vendor_id: Option<i64>,
    pub channel_type: String,
    pub running_balance: Option<Decimal>,
    pub code: Option<String>,
    pub source_file: String,
    /// Columns outside the known schema, carried through for the raw export.
    pub extra: BTreeMap<String, String>,
}

impl TransactionRow {
    pub fn date_only(&self) -> Option<NaiveDate> {
        self.date.map(|d| d.date())
    }

    pub fn is_channel(&self, channel: &str) -> bool {
        self.channel_type == channel
    }
}

/// All rows from one upload batch, in file order.
#[derive(Debug, Clone, Default)]
pub struct TransactionSet {
    pub rows: Vec<TransactionRow>,
    pub file_names: Vec<String>,
    pub extra_columns: Vec<String>,
    pub coerced_cells: usize,
}

impl TransactionSet {
    pub fn file_count(&self) -> usize {
        self.file_names.len()
    }

    pub fn channel_types(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter(|r| !r.channel_type.is_empty())
            .map(|r| r.channel_type.clone())
            .collect()
    }

    pub fn vendor_ids(&self) -> BTreeSet<i64> {
        self.rows.iter().filter_map(|r| r.vendor_id).collect()
    }
}

/// Channel and vendor selections. An empty set selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub channel_types: BTreeSet<String>,
    pub vendor_ids: BTreeSet<i64>,
}

impl FilterSelection {
    pub fn new<C, V>(channel_types: C, vendor_ids: V) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        V: IntoIterator<Item = i64>,
    {
        Self {
            channel_types: channel_types.into_iter().map(Into::into).collect(),
            vendor_ids: vendor_ids.into_iter().collect(),
        }
    }

    /// Selection used when a dimension is not chosen explicitly: every
    /// channel type and vendor ID present in the data. Rows whose value is
    /// blank or null are therefore left out, except that a set with no vendor
    /// IDs at all keeps the select-everything vendor filter.
    pub fn from_data<C, V>(set: &TransactionSet, channel_types: C, vendor_ids: V) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        V: IntoIterator<Item = i64>,
    {
        let mut selection = Self::new(channel_types, vendor_ids);
        if selection.channel_types.is_empty() {
            selection.channel_types = set.channel_types();
        }
        if selection.vendor_ids.is_empty() {
            selection.vendor_ids = set.vendor_ids();
        }
        selection
    }

    pub fn accepts_vendor(&self, row: &TransactionRow) -> bool {
        self.vendor_ids.is_empty()
            || row.vendor_id.is_some_and(|id| self.vendor_ids.contains(&id))
    }

    pub fn accepts_channel(&self, row: &TransactionRow) -> bool {
        self.channel_types.is_empty() || self.channel_types.contains(&row.channel_type)
    }

    /// Human-readable summary used in the report's "Filters Applied" row.
    pub fn describe(&self) -> String {
        let channels = if self.channel_types.is_empty() {
            "All".to_string()
        } else {
            self.channel_types.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        let vids = if self.vendor_ids.is_empty() {
            "All".to_string()
        } else {
            self.vendor_ids
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("Channel Types: {channels}, Vendor IDs: {vids}")
    }
}
