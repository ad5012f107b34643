// File I/O operations

use std::path::Path;

use prosumer_recon::SourceTable;

pub mod csv;
pub mod error;
pub mod xlsx;

pub use error::FileError;

/// Extensions read through the spreadsheet reader; anything else is delimited text.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Load an export by extension. `sheet` only applies to spreadsheets.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<SourceTable, FileError> {
    let table = if is_spreadsheet(path) {
        xlsx::read_table(path, sheet)?
    } else {
        if sheet.is_some() {
            log::warn!("{}: --sheet ignored for delimited text", path.display());
        }
        csv::read_table(path)?
    };
    log::debug!("{}: {} data rows", path.display(), table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreadsheet_detection() {
        assert!(is_spreadsheet(Path::new("geradores.xlsx")));
        assert!(is_spreadsheet(Path::new("GERADORES.XLS")));
        assert!(is_spreadsheet(Path::new("dados.ods")));
        assert!(!is_spreadsheet(Path::new("negocios.csv")));
        assert!(!is_spreadsheet(Path::new("negocios.txt")));
        assert!(!is_spreadsheet(Path::new("negocios")));
    }
}
