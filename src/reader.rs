use tsc::input::RawTable;
use tsc::{Result, Value};

use std::{fs::File, path::Path};

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};
use csv::{Reader as CsvReader, ReaderBuilder, Trim};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Unsupported input file type: {0}")]
    UnsupportedExtension(String),

    #[error("Workbook has no sheets: {0}")]
    NoSheets(String),

    #[error("Sheet {0} has no header row")]
    EmptySheet(String),
}

/// Reads a workbook sheet or a CSV file into a raw table, picking the format by extension
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, sheet),
        _ => Err(ReadError::UnsupportedExtension(path.display().to_string()).into()),
    }
    .with_context(|| format!("Couldn't read input: {}", path.display()))?;

    log::debug!(
        "Read {} rows with columns {:?} from {path:?}",
        table.len(),
        table.headers()
    );

    return Ok(table);
}

pub fn build_csv_reader(filepath: &Path) -> Result<CsvReader<File>> {
    let reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(filepath)?;

    return Ok(reader);
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut rdr = build_csv_reader(path)?;

    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut table = RawTable::new(headers)?;

    for record in rdr.records() {
        let record = record?;
        table.push_row(record.iter().map(Value::parse_cell).collect())?;
    }

    return Ok(table);
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        Some(sheet) => sheet.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReadError::NoSheets(path.display().to_string()))?,
    };

    log::debug!("Reading sheet {sheet_name:?}");
    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header_row = rows
        .next()
        .ok_or_else(|| ReadError::EmptySheet(sheet_name.clone()))?;

    let headers = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Data::Empty => format!("Unnamed: {idx}"),
            cell => cell.to_string().trim().to_string(),
        })
        .collect();
    let mut table = RawTable::new(headers)?;

    for row in rows {
        table.push_row(row.iter().map(convert_cell).collect())?;
    }

    return Ok(table);
}

fn convert_cell(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(text) => Value::parse_text(text),
        Data::Float(number) => Some(Value::Number(*number)),
        Data::Int(number) => Some(Value::Number(*number as f64)),
        Data::Bool(flag) => Some(Value::Bool(*flag)),
        Data::DateTime(date_time) => match date_time.as_datetime() {
            Some(date_time) => Some(Value::DateTime(date_time)),
            None => Some(Value::Number(date_time.as_f64())),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => Value::parse_text(text),
        Data::Error(err) => {
            log::warn!("Treating spreadsheet error cell as blank: {err:?}");
            None
        }
    }
}
