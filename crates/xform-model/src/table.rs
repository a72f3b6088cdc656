//! Tabular grid of raw cell text, as produced by the table reader.

use serde::{Deserialize, Serialize};

/// Header row plus ordered data rows of raw string cells.
///
/// The grid is fully materialized before validation starts; the engine does
/// no streaming access. Report coordinates address it as follows: `line` is
/// 1-based over data rows (the header row is line 0), `column` is 1-based in
/// header order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of columns declared by the header row.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Cell addressed by report coordinates.
    ///
    /// `line == 0` addresses the header row; data rows start at line 1.
    /// Returns `None` when the coordinate falls outside the grid.
    pub fn cell(&self, line: usize, column: usize) -> Option<&str> {
        if column == 0 {
            return None;
        }
        let col_idx = column - 1;
        if line == 0 {
            return self.headers.get(col_idx).map(String::as_str);
        }
        self.rows
            .get(line - 1)
            .and_then(|row| row.get(col_idx))
            .map(String::as_str)
    }
}
