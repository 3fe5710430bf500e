use tsc::layout::{self, ColumnLayout, MONEY_FORMAT};
use tsc::models::CondensedTable;
use tsc::{Money, Result, Value};

use std::{fs, path::Path};

use anyhow::Context;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use thiserror::Error;

const SHEET_NAME_MAX_LEN: usize = 31;
const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Invalid sheet name {0:?}: {1}")]
    InvalidSheetName(String, &'static str),

    #[error("Summary of {0} rows x {1} columns doesn't fit in one worksheet")]
    TooLarge(usize, usize),
}

/// Writes the table to a single-sheet workbook. The file only appears once it's complete.
pub fn write_workbook(path: &Path, sheet_name: &str, table: &CondensedTable) -> Result {
    validate_sheet_name(sheet_name)?;

    if table.len() + 1 > MAX_ROWS || table.columns().len() > MAX_COLS {
        Err(WriteError::TooLarge(table.len(), table.columns().len()))?
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let layout = layout::plan_layout(table);
    write_sheet(worksheet, table, &layout)?;

    let buffer = workbook.save_to_buffer()?;
    log::debug!("Rendered workbook of {} bytes", buffer.len());

    // write beside the destination, then swap it in
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = Path::new(&partial);

    let placed = fs::write(partial, buffer)
        .with_context(|| format!("Couldn't write output: {}", partial.display()))
        .and_then(|_| {
            fs::rename(partial, path)
                .with_context(|| format!("Couldn't move output into place: {}", path.display()))
        });

    if placed.is_err() && partial.exists() {
        if let Err(err) = fs::remove_file(partial) {
            log::warn!("Couldn't remove {}: {err}", partial.display());
        }
    }

    return placed;
}

fn write_sheet(sheet: &mut Worksheet, table: &CondensedTable, layout: &[ColumnLayout]) -> Result {
    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format(MONEY_FORMAT);

    for (col_idx, column) in layout.iter().enumerate() {
        let col = col_idx as u16;

        sheet.write_string_with_format(0, col, &column.name, &header_format)?;
        sheet.set_column_width(col, column.width as f64)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = (row_idx + 1) as u32;

        for (col_idx, cell) in row.cells.iter().enumerate() {
            let col = col_idx as u16;

            match cell {
                None => {}
                Some(Value::Number(number)) if layout[col_idx].money => {
                    sheet.write_number_with_format(row_num, col, *number, &money_format)?;
                }
                Some(Value::Text(text)) if layout[col_idx].money => match Money::parse(text) {
                    Ok(amount) => {
                        sheet.write_number_with_format(row_num, col, amount.to_f64(), &money_format)?;
                    }
                    Err(_) => {
                        sheet.write_string(row_num, col, text.as_str())?;
                    }
                },
                Some(Value::Number(number)) => {
                    sheet.write_number(row_num, col, *number)?;
                }
                Some(Value::Bool(flag)) => {
                    sheet.write_boolean(row_num, col, *flag)?;
                }
                Some(value) => {
                    sheet.write_string(row_num, col, value.to_string().as_str())?;
                }
            }
        }
    }

    return Ok(());
}

fn validate_sheet_name(name: &str) -> Result {
    if name.trim().is_empty() {
        Err(WriteError::InvalidSheetName(name.to_string(), "empty"))?
    }

    if name.chars().count() > SHEET_NAME_MAX_LEN {
        Err(WriteError::InvalidSheetName(
            name.to_string(),
            "longer than 31 characters",
        ))?
    }

    if name.contains(SHEET_NAME_ILLEGAL) {
        Err(WriteError::InvalidSheetName(
            name.to_string(),
            "contains one of * : ? / \\ [ ]",
        ))?
    }

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    use tsc::ids::AccountId;
    use tsc::models::{Column, CondensedRow};

    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn build_table() -> CondensedTable {
        let mut table = CondensedTable::new(vec![
            Column::general("acct_id"),
            Column::general("row_name"),
            Column::money("total_due"),
        ]);
        table
            .push_row(CondensedRow {
                account_id: AccountId::Numeric(1001),
                cells: vec![
                    Some(Value::Number(1001.0)),
                    Some(Value::Text("A".to_string())),
                    Some(Value::Number(70.0)),
                ],
            })
            .unwrap();

        table
    }

    #[test]
    fn sheet_name_rules() {
        assert!(validate_sheet_name("Summary").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("a/b").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        write_workbook(&path, "Summary", &build_table()).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Summary").unwrap();

        assert_eq!(range.get((0, 2)), Some(&Data::String("total_due".to_string())));
        assert_eq!(range.get((1, 0)), Some(&Data::Float(1001.0)));
        assert_eq!(range.get((1, 1)), Some(&Data::String("A".to_string())));
        assert_eq!(range.get((1, 2)), Some(&Data::Float(70.0)));
        assert!(!dir.path().join("out.xlsx.partial").exists());
    }

    #[test]
    fn currency_text_in_money_column_is_written_as_number() {
        let mut table = CondensedTable::new(vec![
            Column::general("acct_id"),
            Column::money("owed_seat1"),
        ]);
        table
            .push_row(CondensedRow {
                account_id: AccountId::Numeric(1),
                cells: vec![
                    Some(Value::Number(1.0)),
                    Some(Value::Text("$12.50".to_string())),
                ],
            })
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&path, "Summary", &table).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Summary").unwrap();

        assert_eq!(range.get((1, 1)), Some(&Data::Float(12.5)));
    }

    #[test]
    fn failed_move_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory can't be replaced by a file
        let path = dir.path().join("out.xlsx");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(write_workbook(&path, "Summary", &build_table()).is_err());
        assert!(!dir.path().join("out.xlsx.partial").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn fail_on_bad_sheet_name_without_creating_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        assert!(write_workbook(&path, "bad:name", &build_table()).is_err());
        assert!(!path.exists());
    }
}
