//! Readers turning a rule sheet on disk into a raw grid of text cells

use crate::error::{Error, Result};
use calamine::{open_workbook_auto, Reader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Extensions read through calamine; everything else is treated as CSV
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read the rule sheet at `path` into rows of text cells.
///
/// Spreadsheets use their first sheet. No header handling happens here; the
/// grid keeps any preamble rows.
pub fn read_rule_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let is_spreadsheet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

    if is_spreadsheet {
        read_spreadsheet(path)
    } else {
        let file = File::open(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        read_csv(BufReader::new(file), path)
    }
}

/// Parse a CSV rule sheet from a string (useful for testing)
pub fn parse_rule_csv_str(content: &str) -> Result<Vec<Vec<String>>> {
    read_csv(content.as_bytes(), Path::new("<string>"))
}

fn read_csv<R: Read>(reader: R, path: &Path) -> Result<Vec<Vec<String>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // preamble rows are narrower than the rule rows
        .from_reader(reader);

    let mut grid = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<Vec<String>>> {
    let spreadsheet_err = |message: String| Error::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| spreadsheet_err("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}
