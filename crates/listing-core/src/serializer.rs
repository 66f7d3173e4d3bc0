//! The quoted, `!#`-delimited export format
//!
//! One row per line, every cell wrapped in double quotes, no header. The
//! delimiter is two bytes long, which rules out the csv crate's reader and
//! writer.

use crate::error::{Error, Result};
use crate::merger::clean;
use crate::table::{Row, Table};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Cell delimiter of the export format
pub const DELIMITER: &str = "!#";

/// Render one row. Each cell is cleaned then quoted.
pub fn serialize_row(row: &Row) -> String {
    row.cells
        .iter()
        .map(|c| format!("\"{}\"", clean(c)))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Render a whole table, one line per row
pub fn serialize(table: &Table) -> String {
    let mut out = String::new();
    for row in &table.rows {
        out.push_str(&serialize_row(row));
        out.push('\n');
    }
    out
}

/// Write a table to any writer
pub fn write_table<W: Write>(writer: &mut W, table: &Table) -> Result<()> {
    for row in &table.rows {
        writeln!(writer, "{}", serialize_row(row))?;
    }
    Ok(())
}

/// Write a table to a file
pub fn write_export<P: AsRef<Path>>(path: P, table: &Table) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_table(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

/// Parse export text back into a table.
///
/// Surrounding quotes are stripped from each cell. The table width is the
/// widest row; shorter rows are padded.
pub fn parse_export_str(content: &str) -> Table {
    let rows: Vec<Row> = content
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            Row::new(
                line.split(DELIMITER)
                    .map(|cell| cell.trim_matches('"').to_string())
                    .collect(),
            )
        })
        .collect();

    let width = rows.iter().map(Row::len).max().unwrap_or(0);
    let mut table = Table::new(width);
    for row in rows {
        table.push(row);
    }
    table
}

/// Read an export file from disk
pub fn read_export<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_export_str(&content))
}
