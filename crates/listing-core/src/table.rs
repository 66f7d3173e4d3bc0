//! In-memory row tables passed between the builder, merger and serializer

use serde::{Deserialize, Serialize};

/// An ordered sequence of fixed-width rows of text cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Declared width; every row built or widened through this table has it
    pub width: usize,
    /// Row data, in source order
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with a fixed width
    pub fn new(width: usize) -> Self {
        Self {
            width,
            rows: Vec::new(),
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row, padding or truncating it to the table width
    pub fn push(&mut self, mut row: Row) {
        row.resize(self.width);
        self.rows.push(row);
    }

    /// Widen the table to `width` columns, padding every row with empty cells.
    ///
    /// Never narrows: rows already at or above `width` are left alone.
    pub fn widen(&mut self, width: usize) {
        if width > self.width {
            self.width = width;
        }
        for row in &mut self.rows {
            if row.len() < self.width {
                row.resize(self.width);
            }
        }
    }
}

/// A row of cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Cell values, unquoted
    pub cells: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Create a row of `width` empty cells
    pub fn blank(width: usize) -> Self {
        Self {
            cells: vec![String::new(); width],
        }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Overwrite a cell; out-of-range indices are ignored
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = value.into();
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn resize(&mut self, width: usize) {
        self.cells.resize(width, String::new());
    }
}

impl From<Vec<String>> for Row {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}
