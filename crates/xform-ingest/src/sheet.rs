//! CSV sheet reading into a raw-text grid.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use xform_model::SheetGrid;

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file into a [`SheetGrid`].
///
/// The first non-blank record is the header row; fully blank records are
/// skipped. Every data row is sized to the header width: short records are
/// padded with empty cells (trailing commas are routinely omitted by
/// spreadsheet exports) and surplus cells beyond the header are dropped.
pub fn read_sheet_grid(path: &Path) -> Result<SheetGrid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(SheetGrid::default());
    }
    let headers: Vec<String> = raw_rows[0].iter().map(|value| normalize_header(value)).collect();
    let mut rows = Vec::with_capacity(raw_rows.len() - 1);
    for record in raw_rows.iter().skip(1) {
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            let value = record.get(idx).map(String::as_str).unwrap_or("");
            row.push(value.to_string());
        }
        rows.push(row);
    }
    tracing::debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "loaded sheet"
    );
    Ok(SheetGrid::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn reads_header_and_rows() {
        let file = write_csv("age,sex\n30,m\n40,f\n");
        let grid = read_sheet_grid(file.path()).expect("grid");
        assert_eq!(grid.headers, vec!["age", "sex"]);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[0], vec!["30", "m"]);
    }

    #[test]
    fn pads_short_records_to_header_width() {
        let file = write_csv("age,sex,weight\n30,m\n");
        let grid = read_sheet_grid(file.path()).expect("grid");
        assert_eq!(grid.rows[0], vec!["30", "m", ""]);
    }

    #[test]
    fn skips_fully_blank_records_and_strips_bom() {
        let file = write_csv("\u{feff}age,sex\n,,\n30, m \n");
        let grid = read_sheet_grid(file.path()).expect("grid");
        assert_eq!(grid.headers, vec!["age", "sex"]);
        assert_eq!(grid.rows.len(), 1);
        assert_eq!(grid.rows[0][1], "m");
    }

    #[test]
    fn empty_file_yields_empty_grid() {
        let file = write_csv("");
        let grid = read_sheet_grid(file.path()).expect("grid");
        assert!(grid.is_empty());
    }
}
