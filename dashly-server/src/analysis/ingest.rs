//! Table Ingestion & Normalization
//!
//! Turns raw upload bytes into a normalized sequence of [`SalesRecord`]s.
//! The input table is untrusted: column names are matched after trim +
//! lowercase (with a set of common aliases), numeric cells that fail to
//! parse are coerced to zero, and a missing commission column falls back to
//! the configured default rate. Unparseable dates fail the whole file.

use calamine::{Data, DataType, Reader};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Cursor;

use super::error::AnalyzeError;

/// One normalized row of the sales export
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub sku: String,
    pub title: String,
    pub qty: i64,
    pub revenue: Decimal,
    pub commission_pct: Decimal,
}

/// Input format, inferred from the filename extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Xlsx => "xlsx",
        }
    }

    /// Dispatch on the lowercased filename extension
    fn from_filename(filename: &str) -> Result<Self, AnalyzeError> {
        let name = filename.to_lowercase();
        if name.ends_with(".csv") {
            Ok(TableFormat::Csv)
        } else if name.ends_with(".xls") || name.ends_with(".xlsx") {
            Ok(TableFormat::Xlsx)
        } else {
            Err(AnalyzeError::UnsupportedFormat(filename.to_string()))
        }
    }
}

/// Ingested table: normalized records plus the detected source format
#[derive(Debug)]
pub struct IngestedTable {
    pub records: Vec<SalesRecord>,
    pub format: TableFormat,
}

/// Required canonical columns, checked in this order
const REQUIRED_COLUMNS: [&str; 5] = ["date", "sku", "title", "qty", "revenue"];

/// Accepted aliases per canonical column name (matched after trim + lowercase)
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("date", &["order_date", "dt"]),
    ("sku", &["product_sku", "article"]),
    ("title", &["product_name", "name"]),
    ("qty", &["quantity", "count", "amount"]),
    ("revenue", &["total", "sum"]),
    ("commission_pct", &["commission", "commission_rate"]),
];

/// A single table cell, unified across the CSV and spreadsheet readers
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Raw parsed table before column resolution
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Resolved indices of the canonical columns
struct ColumnMap {
    date: usize,
    sku: usize,
    title: usize,
    qty: usize,
    revenue: usize,
    commission_pct: Option<usize>,
}

/// Read and normalize an uploaded table
pub fn read_table(
    content: &[u8],
    filename: &str,
    default_commission: Decimal,
) -> Result<IngestedTable, AnalyzeError> {
    let format = TableFormat::from_filename(filename)?;
    let raw = match format {
        TableFormat::Csv => read_csv(content)?,
        TableFormat::Xlsx => read_spreadsheet(content)?,
    };

    let columns = resolve_columns(&raw.headers)?;
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        records.push(build_record(row, &columns, default_commission)?);
    }

    Ok(IngestedTable { records, format })
}

// ========== CSV Reader ==========

/// Decode CSV bytes: UTF-8 first, cp1251 fallback (legacy marketplace exports)
fn decode_csv_bytes(content: &[u8]) -> String {
    match std::str::from_utf8(content) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1251.decode(content);
            decoded.into_owned()
        }
    }
}

/// Sniff the delimiter from the header line (`;` for marketplace exports,
/// `,` for plain CSV)
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons >= commas { b';' } else { b',' }
}

fn read_csv(content: &[u8]) -> Result<RawTable, AnalyzeError> {
    let text = decode_csv_bytes(content);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AnalyzeError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AnalyzeError::Csv(e.to_string()))?;
        let row = (0..headers.len())
            .map(|i| match record.get(i) {
                Some(value) if !value.trim().is_empty() => Cell::Text(value.to_string()),
                _ => Cell::Empty,
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

// ========== Spreadsheet Reader ==========

fn read_spreadsheet(content: &[u8]) -> Result<RawTable, AnalyzeError> {
    let cursor = Cursor::new(content.to_vec());
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| AnalyzeError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalyzeError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| AnalyzeError::Spreadsheet(e.to_string()))?;

    let mut row_iter = range.rows();
    let headers = row_iter
        .next()
        .ok_or_else(|| AnalyzeError::Spreadsheet("sheet has no header row".to_string()))?
        .iter()
        .map(|cell| cell.as_string().unwrap_or_default())
        .collect::<Vec<_>>();

    let rows = row_iter
        .map(|row| {
            (0..headers.len())
                .map(|i| row.get(i).map(convert_sheet_cell).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn convert_sheet_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // Native date cells: let calamine do the serial-date conversion
        Data::DateTime(_) => data.as_date().map(Cell::Date).unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// ========== Column Resolution ==========

fn aliases_for(target: &str) -> &'static [&'static str] {
    COLUMN_ALIASES
        .iter()
        .find(|(name, _)| *name == target)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// Find the index of a canonical column: exact normalized match wins,
/// then the first alias present
fn find_column(normalized: &[String], target: &str) -> Option<usize> {
    if let Some(idx) = normalized.iter().position(|h| h == target) {
        return Some(idx);
    }
    aliases_for(target)
        .iter()
        .find_map(|alias| normalized.iter().position(|h| h == alias))
}

fn resolve_columns(headers: &[String]) -> Result<ColumnMap, AnalyzeError> {
    let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut resolved = [0usize; 5];
    for (slot, target) in REQUIRED_COLUMNS.into_iter().enumerate() {
        resolved[slot] =
            find_column(&normalized, target).ok_or(AnalyzeError::MissingColumn(target))?;
    }

    Ok(ColumnMap {
        date: resolved[0],
        sku: resolved[1],
        title: resolved[2],
        qty: resolved[3],
        revenue: resolved[4],
        commission_pct: find_column(&normalized, "commission_pct"),
    })
}

// ========== Cell Coercion ==========

/// Date formats accepted in text cells
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

fn coerce_date(cell: &Cell) -> Result<NaiveDate, AnalyzeError> {
    match cell {
        Cell::Date(date) => Ok(*date),
        Cell::Text(s) => parse_date_text(s).ok_or_else(|| AnalyzeError::DateParse(s.clone())),
        Cell::Number(n) => Err(AnalyzeError::DateParse(n.to_string())),
        Cell::Empty => Err(AnalyzeError::DateParse(String::new())),
    }
}

/// Quantity coercion: unparseable or negative values become 0
fn coerce_qty(cell: &Cell) -> i64 {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() && value > 0.0 {
        value as i64
    } else {
        0
    }
}

/// Money coercion: unparseable or negative values become 0
fn coerce_money(cell: &Cell) -> Decimal {
    let value = match cell {
        Cell::Number(n) => Decimal::try_from(*n).unwrap_or_default(),
        Cell::Text(s) => s.trim().parse::<Decimal>().unwrap_or_default(),
        _ => Decimal::ZERO,
    };
    value.max(Decimal::ZERO)
}

/// Commission coercion: absent, blank, unparseable or negative → default rate
fn coerce_commission(cell: Option<&Cell>, default_commission: Decimal) -> Decimal {
    let parsed = match cell {
        Some(Cell::Number(n)) => Decimal::try_from(*n).ok(),
        Some(Cell::Text(s)) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };
    match parsed {
        Some(rate) if rate >= Decimal::ZERO => rate,
        _ => default_commission,
    }
}

fn text_of(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) => {
            // SKUs exported as numeric cells: keep integers free of ".0"
            if n.fract() == 0.0 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Cell::Date(date) => date.to_string(),
        Cell::Empty => String::new(),
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

fn build_record(
    row: &[Cell],
    columns: &ColumnMap,
    default_commission: Decimal,
) -> Result<SalesRecord, AnalyzeError> {
    let cell = |idx: usize| row.get(idx).unwrap_or(&EMPTY_CELL);

    Ok(SalesRecord {
        date: coerce_date(cell(columns.date))?,
        sku: text_of(cell(columns.sku)),
        title: text_of(cell(columns.title)),
        qty: coerce_qty(cell(columns.qty)),
        revenue: coerce_money(cell(columns.revenue)),
        commission_pct: coerce_commission(
            columns.commission_pct.map(|idx| cell(idx)),
            default_commission,
        ),
    })
}
