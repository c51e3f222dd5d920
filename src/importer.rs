use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{RemitError, Result};
use crate::models::{TransactionRow, TransactionSet};

pub const REQUIRED_COLUMNS: [&str; 6] = ["Date", "Amount", "Commission", "Vat", "Vid", "Channel Type"];

const COL_RUNNING_BALANCE: &str = "Running Balance";
const COL_CODE: &str = "Code";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Largest magnitude a money cell may hold (10^15). Anything beyond is treated
/// as unparsable so that totals over any realistic row count stay in range.
pub const MAX_CELL_MAGNITUDE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim().replace(',', "");
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
        .filter(|d| d.abs() <= MAX_CELL_MAGNITUDE)
}

pub fn parse_vid(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(id) = s.parse::<i64>() {
        return Some(id);
    }
    let d = parse_decimal(s)?;
    if d.fract().is_zero() {
        d.to_i64()
    } else {
        None
    }
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn strip_code(raw: &str) -> String {
    raw.trim_matches('\'').to_string()
}

/// Tracks cells that held something but failed to parse.
#[derive(Default)]
struct Coercion {
    failed: usize,
}

impl Coercion {
    fn apply<T>(&mut self, raw: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let value = parse(raw);
        if value.is_none() && !raw.trim().is_empty() {
            self.failed += 1;
        }
        value
    }
}

// ---------------------------------------------------------------------------
// Source files
// ---------------------------------------------------------------------------

/// An uploaded file held in memory for one computation cycle.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(name, String::from_utf8_lossy(&bytes)))
    }
}

pub struct ParsedFile {
    pub rows: Vec<TransactionRow>,
    pub extra_columns: Vec<String>,
    pub coerced_cells: usize,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn schema_mismatch(file: &str) -> RemitError {
    RemitError::SchemaMismatch {
        file: file.to_string(),
        expected: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
    }
}

fn cell_value<'a>(record: &'a csv::StringRecord, index: &HashMap<&str, usize>, name: &str) -> &'a str {
    index.get(name).and_then(|&i| record.get(i)).unwrap_or("")
}

/// Parse one tab-separated export. The first line is a title line and is
/// discarded; the second line is the header row.
pub fn parse_file(file: &SourceFile) -> Result<ParsedFile> {
    let content = file.content.trim_start_matches('\u{feff}');
    let body = match content.split_once('\n') {
        Some((_, rest)) => rest,
        None => return Err(schema_mismatch(&file.name)),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, h) in headers.iter().enumerate() {
        index.entry(h.as_str()).or_insert(i);
    }
    if !REQUIRED_COLUMNS.iter().all(|c| index.contains_key(c)) {
        return Err(schema_mismatch(&file.name));
    }

    let known: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain([COL_RUNNING_BALANCE, COL_CODE])
        .collect();
    let extra_columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !h.is_empty() && !known.contains(&h.as_str()) && index[h.as_str()] == *i)
        .map(|(_, h)| h.clone())
        .collect();

    let mut coercion = Coercion::default();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let cell = |name: &str| cell_value(&record, &index, name);

        let extra: BTreeMap<String, String> = extra_columns
            .iter()
            .map(|c| (c.clone(), cell(c.as_str()).to_string()))
            .collect();

        rows.push(TransactionRow {
            date: coercion.apply(cell("Date"), parse_datetime),
            amount: coercion.apply(cell("Amount"), parse_decimal),
            commission: coercion.apply(cell("Commission"), parse_decimal),
            vat: coercion.apply(cell("Vat"), parse_decimal),
            vendor_id: coercion.apply(cell("Vid"), parse_vid),
            channel_type: cell("Channel Type").trim().to_string(),
            running_balance: coercion.apply(cell(COL_RUNNING_BALANCE), parse_decimal),
            code: index.get(COL_CODE).map(|_| strip_code(cell(COL_CODE))),
            source_file: file.name.clone(),
            extra,
        });
    }

    tracing::debug!(file = %file.name, rows = rows.len(), "parsed file");
    if coercion.failed > 0 {
        tracing::warn!(
            file = %file.name,
            cells = coercion.failed,
            "unparseable cells were treated as empty"
        );
    }

    Ok(ParsedFile {
        rows,
        extra_columns,
        coerced_cells: coercion.failed,
    })
}

/// Validate and concatenate a batch. Any schema failure rejects the batch.
pub fn load_files(files: &[SourceFile]) -> Result<TransactionSet> {
    if files.is_empty() {
        return Err(RemitError::NoFiles);
    }

    let mut parsed = Vec::with_capacity(files.len());
    for file in files {
        parsed.push(parse_file(file)?);
    }

    let mut set = TransactionSet::default();
    for (file, p) in files.iter().zip(parsed) {
        set.file_names.push(file.name.clone());
        for col in p.extra_columns {
            if !set.extra_columns.contains(&col) {
                set.extra_columns.push(col);
            }
        }
        set.coerced_cells += p.coerced_cells;
        set.rows.extend(p.rows);
    }
    tracing::info!(files = set.file_count(), rows = set.rows.len(), "loaded transactions");
    Ok(set)
}

pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> Result<TransactionSet> {
    let files = paths
        .iter()
        .map(|p| SourceFile::from_path(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    load_files(&files)
}
