//! Spreadsheet encoding for store files, exports and uploads.
//!
//! Everything is plain CSV with a header row of the in-app column names, so
//! any spreadsheet program opens the files directly.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::form::{parse_amount_field, RecordForm};
use crate::models::{Column, Currency, LedgerKind, PaymentStatus, Record, Schema, Unit};
use crate::query::{GroupBy, GroupTotal};

pub(crate) const INVOICES_EXPORT: &str = "invoices.csv";
pub(crate) const EXPENSES_EXPORT: &str = "expenses.csv";
pub(crate) const SUMMARY_EXPORT: &str = "summary.csv";

/// How many leading rows an upload may carry before its header row.
const HEADER_SCAN_ROWS: usize = 5;

pub(crate) fn export_file_name(kind: LedgerKind) -> &'static str {
    match kind {
        LedgerKind::Invoices => INVOICES_EXPORT,
        LedgerKind::Expenses => EXPENSES_EXPORT,
    }
}

pub(crate) fn write_records<'a, W, I>(w: W, schema: &Schema, records: I) -> StoreResult<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut wtr = WriterBuilder::new().from_writer(w);
    wtr.write_record(schema.headers())?;
    let mut count = 0;
    for record in records {
        wtr.write_record(schema.row(record))?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

pub(crate) fn encode_records<'a, I>(schema: &Schema, records: I) -> StoreResult<Vec<u8>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buf = Vec::new();
    write_records(&mut buf, schema, records)?;
    Ok(buf)
}

pub(crate) fn encode_summary(
    schema: &Schema,
    group_by: GroupBy,
    totals: &[GroupTotal],
) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut wtr = WriterBuilder::new().from_writer(&mut buf);
        let mut header = group_by.headers(schema.party_label());
        header.push("Total Owed");
        header.push("Rows");
        wtr.write_record(&header)?;
        for total in totals {
            let mut row = total.key.clone();
            row.push(total.total.to_string());
            row.push(total.count.to_string());
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
    }
    Ok(buf)
}

/// Write `records` to `path`, replacing any previous export there.
pub(crate) fn export_records<'a, I>(
    path: &Path,
    schema: &Schema,
    records: I,
) -> StoreResult<usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();
    let bytes = encode_records(schema, records.iter().copied())?;
    let mut file = create_export(path)?;
    file.write_all(&bytes)?;
    let count = records.len();
    tracing::info!(path = %path.display(), count, "exported records");
    Ok(count)
}

pub(crate) fn export_summary(
    path: &Path,
    schema: &Schema,
    group_by: GroupBy,
    totals: &[GroupTotal],
) -> StoreResult<usize> {
    let bytes = encode_summary(schema, group_by, totals)?;
    let mut file = create_export(path)?;
    file.write_all(&bytes)?;
    tracing::info!(path = %path.display(), groups = totals.len(), %group_by, "exported summary");
    Ok(totals.len())
}

fn create_export(path: &Path) -> StoreResult<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}

/// Read an uploaded sheet from disk.
pub(crate) fn import_file(path: &Path, schema: &Schema) -> StoreResult<Vec<Record>> {
    let file = File::open(path)?;
    match decode_records(BufReader::new(file), schema) {
        Ok(records) => {
            tracing::info!(path = %path.display(), count = records.len(), "decoded upload");
            Ok(records)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "rejected upload");
            Err(e)
        }
    }
}

/// Decode an uploaded sheet into records. The header row is located by name
/// within the first few rows, columns may come in any order, cells are read
/// leniently (trimmed, unit aliases, currency symbols) and Total Price is
/// recomputed rather than read.
pub(crate) fn decode_records<R: Read>(r: R, schema: &Schema) -> StoreResult<Vec<Record>> {
    let rows = read_rows(r)?;
    decode_rows(&rows, schema, decode_row)
}

/// Decode a store file written by [`write_records`]. Text cells are taken
/// verbatim so every value survives a save and reload. A file without any
/// rows is an empty store.
pub(crate) fn decode_store<R: Read>(r: R, schema: &Schema) -> StoreResult<Vec<Record>> {
    let rows = read_rows(r)?;
    if rows.iter().all(is_blank) {
        return Ok(Vec::new());
    }
    decode_rows(&rows, schema, decode_stored_row)
}

fn read_rows<R: Read>(r: R) -> StoreResult<Vec<StringRecord>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(r);

    let mut rows: Vec<StringRecord> = Vec::new();
    for result in rdr.records() {
        rows.push(result?);
    }
    Ok(rows)
}

fn is_blank(row: &StringRecord) -> bool {
    row.iter().all(|f| f.trim().is_empty())
}

type RowDecoder = fn(&StringRecord, &ColumnMap, &Schema) -> Result<Record, ValidationError>;

fn decode_rows(
    rows: &[StringRecord],
    schema: &Schema,
    decode: RowDecoder,
) -> StoreResult<Vec<Record>> {
    let (header_at, mapping) = locate_header(rows, schema)?;

    let mut records = Vec::new();
    for (i, row) in rows.iter().enumerate().skip(header_at + 1) {
        if is_blank(row) || mapping.restates_header(row) {
            continue;
        }
        let line = i + 1;
        let record = decode(row, &mapping, schema).map_err(|e| StoreError::Decode {
            row: line,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

struct ColumnMap {
    entries: Vec<(Column, usize)>,
}

impl ColumnMap {
    fn cell<'r>(&self, row: &'r StringRecord, column: Column) -> &'r str {
        self.entries
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, idx)| row.get(*idx))
            .unwrap_or("")
    }

    /// Some uploads repeat the header as their first data row.
    fn restates_header(&self, row: &StringRecord) -> bool {
        self.entries.iter().all(|(column, idx)| {
            row.get(*idx)
                .is_some_and(|cell| normalize_header(cell) == normalize_header(column.header()))
        })
    }
}

fn normalize_header(s: &str) -> String {
    s.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn map_columns(row: &StringRecord, schema: &Schema) -> (ColumnMap, Vec<String>) {
    let names: Vec<String> = row.iter().map(normalize_header).collect();
    let mut entries = Vec::new();
    let mut missing = Vec::new();
    for column in schema.required() {
        let wanted = normalize_header(column.header());
        match names.iter().position(|n| *n == wanted) {
            Some(idx) => entries.push((column, idx)),
            None => missing.push(column.header().to_string()),
        }
    }
    (ColumnMap { entries }, missing)
}

fn locate_header(rows: &[StringRecord], schema: &Schema) -> StoreResult<(usize, ColumnMap)> {
    let mut best: Option<Vec<String>> = None;
    for (i, row) in rows.iter().enumerate().take(HEADER_SCAN_ROWS) {
        let (mapping, missing) = map_columns(row, schema);
        if missing.is_empty() {
            return Ok((i, mapping));
        }
        if best.as_ref().map_or(true, |b| missing.len() < b.len()) {
            best = Some(missing);
        }
    }
    let missing = best.unwrap_or_else(|| {
        schema
            .required()
            .map(|c| c.header().to_string())
            .collect()
    });
    Err(StoreError::MissingColumns(missing))
}

fn decode_row(
    row: &StringRecord,
    mapping: &ColumnMap,
    schema: &Schema,
) -> Result<Record, ValidationError> {
    let date = mapping.cell(row, Column::Date);
    if date.trim().is_empty() {
        return Err(ValidationError::Missing { field: "Date" });
    }
    let company = mapping.cell(row, party_column(schema));
    let form = RecordForm {
        date: date.to_string(),
        company: company.to_string(),
        item_id: mapping.cell(row, Column::ItemId).to_string(),
        item_name: mapping.cell(row, Column::ItemName).to_string(),
        quantity: mapping.cell(row, Column::Quantity).to_string(),
        unit: mapping.cell(row, Column::Unit).to_string(),
        price_per_unit: mapping.cell(row, Column::PricePerUnit).to_string(),
        currency: mapping.cell(row, Column::Currency).to_string(),
        status: mapping.cell(row, Column::Status).to_string(),
    };
    form.validate(schema)
}

fn party_column(schema: &Schema) -> Column {
    if schema.has(Column::Subject) {
        Column::Subject
    } else {
        Column::Company
    }
}

fn decode_stored_row(
    row: &StringRecord,
    mapping: &ColumnMap,
    schema: &Schema,
) -> Result<Record, ValidationError> {
    let cell = |column| mapping.cell(row, column);

    let date = cell(Column::Date);
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
    let currency = cell(Column::Currency);
    let currency = Currency::parse(currency)
        .ok_or_else(|| ValidationError::UnknownCurrency(currency.to_string()))?;
    let status = if schema.has_status() {
        let status = cell(Column::Status);
        Some(
            PaymentStatus::parse(status)
                .ok_or_else(|| ValidationError::UnknownStatus(status.to_string()))?,
        )
    } else {
        None
    };

    Ok(Record {
        date,
        company: cell(party_column(schema)).to_string(),
        item_id: cell(Column::ItemId).to_string(),
        item_name: cell(Column::ItemName).to_string(),
        quantity: parse_amount_field("Quantity", cell(Column::Quantity))?,
        unit: Unit::from_label(cell(Column::Unit)),
        price_per_unit: parse_amount_field("Price per Unit", cell(Column::PricePerUnit))?,
        currency,
        status,
    })
}
