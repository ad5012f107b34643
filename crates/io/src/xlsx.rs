// Spreadsheet import (xlsx, xlsm, xls, xlsb, ods)
//
// Read-only. The selected sheet becomes a SourceTable of display strings:
// first non-blank row is the header, fully blank rows are dropped.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::{NaiveDate, TimeDelta};
use prosumer_recon::SourceTable;

use crate::error::FileError;

/// Read one sheet (the first when `sheet` is `None`).
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<SourceTable, FileError> {
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| FileError::parse(path, e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| FileError::SheetNotFound {
                path: path.to_path_buf(),
                sheet: name.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names.first().cloned().ok_or_else(|| FileError::NoSheets {
            path: path.to_path_buf(),
        })?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| FileError::parse(path, format!("sheet '{sheet_name}': {e}")))?;

    let mut table: Option<SourceTable> = None;
    let mut skipped = 0usize;

    for row in range.rows() {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        match table.as_mut() {
            Some(t) => t.push_row(cells),
            None => table = Some(SourceTable::new(trim_trailing_empty(cells))),
        }
    }

    let table = table.ok_or_else(|| FileError::NoHeader {
        path: path.to_path_buf(),
    })?;
    log::debug!(
        "{} [{}]: {} rows x {} columns ({} blank rows skipped)",
        path.display(),
        sheet_name,
        table.len(),
        table.headers().len(),
        skipped
    );
    Ok(table)
}

// The used range can extend past the last header cell when data rows are wider.
fn trim_trailing_empty(mut headers: Vec<String>) -> Vec<String> {
    while headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }
    headers
}

/// Render a cell the way it reads in the spreadsheet.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        // Format nicely: integers without decimals
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        // 1900 date system assumed
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS` when the serial has a time part.
pub fn excel_serial_to_string(serial: f64) -> String {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return serial.to_string();
    };

    let total_seconds = (serial * 86_400.0).round() as i64;
    match TimeDelta::try_seconds(total_seconds).and_then(|d| epoch.checked_add_signed(d)) {
        Some(dt) if total_seconds % 86_400 == 0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}
