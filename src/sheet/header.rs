use crate::domain::model::{CellValue, SheetGrid};
use crate::utils::error::{CheckError, Result};
use serde::{Deserialize, Serialize};

/// Rows scanned when looking for a header.
pub const HEADER_SCAN_ROWS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMatch {
    #[default]
    Contains,
    Exact,
}

impl KeywordMatch {
    /// Case-insensitive comparison of a trimmed cell against a keyword.
    pub fn matches(&self, cell: &str, keyword: &str) -> bool {
        let cell = cell.trim().to_lowercase();
        let keyword = keyword.trim().to_lowercase();
        match self {
            KeywordMatch::Contains => cell.contains(&keyword),
            KeywordMatch::Exact => cell == keyword,
        }
    }
}

/// First row among the leading [`HEADER_SCAN_ROWS`] holding every keyword.
/// In `Contains` mode a keyword may also span cells of the joined row text.
pub fn detect_header_row(grid: &SheetGrid, keywords: &[String], mode: KeywordMatch) -> Option<usize> {
    grid.rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| {
            let cells = row.iter().map(CellValue::display).collect::<Vec<_>>();
            let joined = cells
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            keywords.iter().all(|keyword| {
                cells.iter().any(|cell| mode.matches(cell, keyword))
                    || (mode == KeywordMatch::Contains && mode.matches(&joined, keyword))
            })
        })
}

/// What to do when no row matches the header keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderFallback {
    #[default]
    Error,
    FirstRow,
}

/// Header row of `grid`, applying `fallback` when detection fails.
pub fn locate_header(
    grid: &SheetGrid,
    keywords: &[String],
    mode: KeywordMatch,
    fallback: HeaderFallback,
    source_name: &str,
) -> Result<usize> {
    match (detect_header_row(grid, keywords, mode), fallback) {
        (Some(row), _) => {
            tracing::info!("✅ Header for {} detected at row {}", source_name, row + 1);
            Ok(row)
        }
        (None, HeaderFallback::FirstRow) => {
            tracing::warn!(
                "⚠️ Could not detect header row in {} ('{}'); using the first row",
                source_name,
                grid.name
            );
            Ok(0)
        }
        (None, HeaderFallback::Error) => Err(CheckError::HeaderNotFound {
            source_name: source_name.to_string(),
            keywords: keywords.to_vec(),
        }),
    }
}

/// A sheet split into header names and the data rows beneath them.
#[derive(Debug, Clone)]
pub struct Table {
    pub sheet_name: String,
    pub header_row: usize,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone)]
pub struct TableRow {
    /// 1-based row number as shown in a spreadsheet application.
    pub row_number: usize,
    pub cells: Vec<CellValue>,
}

impl TableRow {
    pub fn get(&self, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(col).unwrap_or(&EMPTY)
    }

    pub fn text(&self, col: Option<usize>) -> String {
        col.map(|c| self.get(c).display().trim().to_string())
            .unwrap_or_default()
    }
}

impl Table {
    pub fn from_grid(grid: &SheetGrid, header_row: usize) -> Self {
        let width = grid.rows.iter().map(Vec::len).max().unwrap_or(0);

        let headers = (0..width)
            .map(|col| {
                let name = grid
                    .cell(header_row, col)
                    .display()
                    .replace(['\r', '\n'], " ")
                    .trim()
                    .to_string();
                if name.is_empty() {
                    format!("Unnamed: {}", col)
                } else {
                    name
                }
            })
            .collect();

        let rows = grid
            .rows
            .iter()
            .enumerate()
            .skip(header_row + 1)
            .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
            .map(|(index, cells)| TableRow {
                row_number: index + 1,
                cells: cells.clone(),
            })
            .collect();

        Self {
            sheet_name: grid.name.clone(),
            header_row,
            headers,
            rows,
        }
    }

    pub fn find_column(&self, name: &str, mode: KeywordMatch) -> Option<usize> {
        find_column(&self.headers, name, mode)
    }
}

pub fn find_column(headers: &[String], name: &str, mode: KeywordMatch) -> Option<usize> {
    headers.iter().position(|h| mode.matches(h, name))
}

pub fn is_unnamed(header: &str) -> bool {
    header.trim().is_empty() || header.starts_with("Unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::new(
            "Sheet1",
            rows.iter()
                .map(|r| r.iter().map(|c| CellValue::from(*c)).collect())
                .collect(),
        )
    }

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detects_header_below_title_rows() {
        let g = grid(&[
            &["ECLY SHIPMENT LEVEL REPORT", ""],
            &["Generated 2025-10-01", ""],
            &["Shipment ID", "All References", "Supplier Name"],
            &["S1", "PO#107166", "ACME"],
        ]);
        let row = detect_header_row(&g, &keywords(&["All References", "Supplier Name"]), KeywordMatch::Contains);
        assert_eq!(row, Some(2));
    }

    #[test]
    fn test_contains_mode_matches_joined_row_text() {
        let g = grid(&[
            &["Supplier", "Name", "Ref"],
            &["Supplier Name", "All References", ""],
        ]);
        let keys = keywords(&["supplier name", "ref"]);
        assert_eq!(detect_header_row(&g, &keys, KeywordMatch::Contains), Some(0));
        assert_eq!(detect_header_row(&g, &keywords(&["supplier name"]), KeywordMatch::Exact), Some(1));
    }

    #[test]
    fn test_exact_mode_requires_whole_cell() {
        let g = grid(&[&["Order # (client)", "Supplier"], &["Order #", "Supplier"]]);
        let row = detect_header_row(&g, &keywords(&["Order #", "Supplier"]), KeywordMatch::Exact);
        assert_eq!(row, Some(1));
    }

    #[test]
    fn test_header_not_found_beyond_scan_window() {
        let mut rows: Vec<&[&str]> = vec![&["x"][..]; HEADER_SCAN_ROWS];
        rows.push(&["Order #", "Supplier"]);
        let g = grid(&rows);
        assert_eq!(
            detect_header_row(&g, &keywords(&["Order #", "Supplier"]), KeywordMatch::Contains),
            None
        );
    }

    #[test]
    fn test_locate_header_fallback() {
        let g = grid(&[&["PO", "ETA"], &["107166", "2025-10-20"]]);
        let keys = keywords(&["Order #"]);

        assert_eq!(
            locate_header(&g, &keys, KeywordMatch::Contains, HeaderFallback::FirstRow, "report").unwrap(),
            0
        );
        assert!(matches!(
            locate_header(&g, &keys, KeywordMatch::Contains, HeaderFallback::Error, "report"),
            Err(CheckError::HeaderNotFound { .. })
        ));
    }

    #[test]
    fn test_table_names_blank_headers_and_skips_empty_rows() {
        let g = grid(&[
            &["BC PO", "Container", "", "ETA"],
            &["107166", "ABCU1234567", "20GP", "2025-10-20"],
            &["", "", "", ""],
            &["107167", "", "", "2025-10-21"],
        ]);
        let table = Table::from_grid(&g, 0);

        assert_eq!(table.headers, vec!["BC PO", "Container", "Unnamed: 2", "ETA"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].row_number, 4);
        assert_eq!(table.rows[0].text(Some(2)), "20GP");
        assert_eq!(table.rows[0].text(None), "");
    }

    #[test]
    fn test_find_column_modes() {
        let headers = keywords(&["Vessel Name (Last Leg)", "Estimated Arrival"]);
        assert_eq!(find_column(&headers, "estimated arrival", KeywordMatch::Exact), Some(1));
        assert_eq!(find_column(&headers, "Vessel", KeywordMatch::Exact), None);
        assert_eq!(find_column(&headers, "Vessel", KeywordMatch::Contains), Some(0));
    }
}
