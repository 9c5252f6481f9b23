use crate::domain::model::{CellValue, SheetGrid};
use crate::rules::eta::excel_serial_to_datetime;
use crate::utils::error::{CheckError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use regex::Regex;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

static MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\.(\d{4})").expect("valid month.year pattern"));

/// Every sheet of one uploaded file, in workbook order.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub source_name: String,
    pub sheets: Vec<SheetGrid>,
}

impl Workbook {
    /// Reads a workbook from disk, choosing the parser by file extension.
    pub fn open<P: AsRef<Path>>(path: P, source_name: &str) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let bytes = std::fs::read(path)?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

        if extension == "csv" {
            let sheet_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Sheet1");
            Self::from_csv_bytes(source_name, sheet_name, &bytes)
        } else if EXCEL_EXTENSIONS.contains(&extension.as_str()) {
            Self::from_excel_bytes(source_name, bytes)
        } else {
            Err(CheckError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            })
        }
    }

    pub fn from_csv_bytes(source_name: &str, sheet_name: &str, bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|field| CellValue::from(field.trim_start_matches('\u{feff}')))
                .collect::<Vec<_>>();
            rows.push(row);
        }

        Ok(Self {
            source_name: source_name.to_string(),
            sheets: vec![SheetGrid::new(sheet_name, rows)],
        })
    }

    pub fn from_excel_bytes(source_name: &str, bytes: Vec<u8>) -> Result<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let mut sheets = Vec::new();

        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            // data may not begin at A1
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let mut rows = vec![Vec::new(); start_row as usize];

            for row in range.rows() {
                let mut cells = vec![CellValue::Empty; start_col as usize];
                cells.extend(row.iter().map(convert_cell));
                rows.push(cells);
            }
            sheets.push(SheetGrid::new(name, rows));
        }

        Ok(Self {
            source_name: source_name.to_string(),
            sheets,
        })
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn first_sheet(&self) -> Result<&SheetGrid> {
        self.sheets.first().ok_or_else(|| CheckError::EmptyWorkbook {
            source_name: self.source_name.clone(),
        })
    }

    pub fn sheet(&self, name: &str) -> Result<&SheetGrid> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CheckError::SheetNotFound {
                source_name: self.source_name.clone(),
                sheet: name.to_string(),
            })
    }

    /// The monthly sheet with the newest `MM.YYYY` name, else the last sheet.
    pub fn latest_sheet(&self) -> Result<&SheetGrid> {
        let names = self.sheet_names();
        let index = select_latest_sheet(&names).ok_or_else(|| CheckError::EmptyWorkbook {
            source_name: self.source_name.clone(),
        })?;
        Ok(&self.sheets[index])
    }

    /// Pinned sheet when given, otherwise `fallback`.
    pub fn sheet_or<'a>(
        &'a self,
        pinned: Option<&str>,
        fallback: impl FnOnce(&'a Self) -> Result<&'a SheetGrid>,
    ) -> Result<&'a SheetGrid> {
        match pinned {
            Some(name) => self.sheet(name),
            None => fallback(self),
        }
    }
}

/// Parses the `MM.YYYY` token of a sheet name as (year, month).
pub fn sheet_month(name: &str) -> Option<(i32, u32)> {
    MONTH_YEAR.captures_iter(name).find_map(|caps| {
        let month: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[2].parse().ok()?;
        (1..=12).contains(&month).then_some((year, month))
    })
}

/// Index of the newest dated sheet; ties keep the first, undated workbooks
/// fall back to the last sheet.
pub fn select_latest_sheet(names: &[&str]) -> Option<usize> {
    let mut latest: Option<(usize, (i32, u32))> = None;
    for (index, name) in names.iter().enumerate() {
        if let Some(month) = sheet_month(name) {
            match latest {
                Some((_, best)) if month <= best => {}
                _ => latest = Some((index, month)),
            }
        }
    }

    match latest {
        Some((index, _)) => Some(index),
        None => names.len().checked_sub(1),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}
