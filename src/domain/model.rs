use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single spreadsheet cell as read from xlsx or csv.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form of the cell. Integral numbers drop their decimal part so a
    /// PO stored as `107166.0` still reads as `107166`.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

/// Row-major grid of one sheet. Indices are absolute sheet positions.
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// The four compared shipment fields, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Eta,
    Container,
    #[serde(alias = "vessel")]
    ArrivalVessel,
    #[serde(alias = "voyage")]
    ArrivalVoyage,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Eta,
        Field::Container,
        Field::ArrivalVessel,
        Field::ArrivalVoyage,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Field::Eta => "ETA",
            Field::Container => "Container",
            Field::ArrivalVessel => "Arrival Vessel",
            Field::ArrivalVoyage => "Arrival Voyage",
        }
    }

    /// Voyage is supplementary; the other three are core fields.
    pub fn is_core(&self) -> bool {
        !matches!(self, Field::ArrivalVoyage)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One row of the forwarder's shipment report after column mapping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportRecord {
    pub row_number: usize,
    pub po_text: String,
    pub pos: Vec<String>,
    pub eta: Option<NaiveDate>,
    pub eta_raw: String,
    pub vessel: String,
    pub voyage: String,
    pub container: String,
    pub supplier: String,
}

/// One row of the import doc after keyword mapping and container consolidation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportRecord {
    pub row_number: usize,
    pub po_text: String,
    pub pos: Vec<String>,
    pub eta: Option<NaiveDate>,
    pub eta_raw: String,
    pub vessel: String,
    pub voyage: String,
    pub container: String,
    pub supplier: String,
}

#[derive(Debug, Clone, Default)]
pub struct ShipmentInput {
    pub report_sheet: String,
    pub import_sheet: String,
    pub report: Vec<ReportRecord>,
    pub import: Vec<ImportRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub field: Field,
    pub report_value: String,
    pub import_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoDifference {
    pub po: String,
    pub diffs: Vec<FieldDiff>,
}

impl PoDifference {
    pub fn get(&self, field: Field) -> Option<&FieldDiff> {
        self.diffs.iter().find(|d| d.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedPo {
    pub po: String,
    pub supplier: String,
    pub eta: String,
    pub vessel: String,
    pub container: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckStats {
    pub report_rows: usize,
    pub dropped_invalid_eta: usize,
    pub dropped_before_window: usize,
    pub dropped_without_po: usize,
    pub report_pos: usize,
    pub import_rows: usize,
    pub import_pos: usize,
    pub matched_pos: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub profile: String,
    pub report_sheet: String,
    pub import_sheet: String,
    pub differences: Vec<PoDifference>,
    pub unmatched: Vec<UnmatchedPo>,
    pub stats: CheckStats,
}

impl CheckReport {
    /// Differences regrouped per field, in field order.
    pub fn by_field(&self) -> Vec<(Field, Vec<(&str, &FieldDiff)>)> {
        Field::ALL
            .iter()
            .map(|field| {
                let rows = self
                    .differences
                    .iter()
                    .filter_map(|d| d.get(*field).map(|diff| (d.po.as_str(), diff)))
                    .collect::<Vec<_>>();
                (*field, rows)
            })
            .filter(|(_, rows)| !rows.is_empty())
            .collect()
    }
}

/// A PO/ETA pair read for the ETA discrepancy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtaRow {
    pub po: String,
    pub eta: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EtaInput {
    pub erp: Vec<EtaRow>,
    pub import: Vec<EtaRow>,
    pub import_sheets_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtaMismatch {
    pub po: String,
    pub erp_eta: NaiveDate,
    pub import_eta: NaiveDate,
    pub day_diff: i64,
    pub sheet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtaMissing {
    pub po: String,
    pub erp_eta: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EtaMetrics {
    pub erp_rows: usize,
    pub import_found: usize,
    pub mismatches: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EtaReport {
    pub tolerance_days: i64,
    pub mismatches: Vec<EtaMismatch>,
    pub missing: Vec<EtaMissing>,
    pub metrics: EtaMetrics,
}

/// One-line description used by the engine's phase logging.
pub trait Summary {
    fn summary(&self) -> String;
}

impl Summary for ShipmentInput {
    fn summary(&self) -> String {
        format!(
            "{} report rows from '{}', {} import doc rows from '{}'",
            self.report.len(),
            self.report_sheet,
            self.import.len(),
            self.import_sheet
        )
    }
}

impl Summary for CheckReport {
    fn summary(&self) -> String {
        format!(
            "{} matched POs, {} with differences, {} unmatched",
            self.stats.matched_pos,
            self.differences.len(),
            self.unmatched.len()
        )
    }
}

impl Summary for EtaInput {
    fn summary(&self) -> String {
        format!(
            "{} ERP rows, {} import PO entries from {} sheet(s)",
            self.erp.len(),
            self.import.len(),
            self.import_sheets_used.len()
        )
    }
}

impl Summary for EtaReport {
    fn summary(&self) -> String {
        format!(
            "{} mismatches, {} missing in import doc",
            self.metrics.mismatches, self.metrics.missing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display_drops_integral_fraction() {
        assert_eq!(CellValue::Number(107166.0).display(), "107166");
        assert_eq!(CellValue::Number(12.5).display(), "12.5");
        assert_eq!(CellValue::Empty.display(), "");
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(CellValue::from("   ").is_empty());
        assert!(!CellValue::from("x").is_empty());
    }

    #[test]
    fn test_by_field_groups_in_field_order() {
        let report = CheckReport {
            differences: vec![PoDifference {
                po: "107166".to_string(),
                diffs: vec![
                    FieldDiff {
                        field: Field::Eta,
                        report_value: "2025-10-20".to_string(),
                        import_value: "2025-10-22".to_string(),
                        note: None,
                    },
                    FieldDiff {
                        field: Field::ArrivalVessel,
                        report_value: "MAERSK A".to_string(),
                        import_value: "MSC B".to_string(),
                        note: None,
                    },
                ],
            }],
            ..Default::default()
        };

        let grouped = report.by_field();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, Field::Eta);
        assert_eq!(grouped[1].0, Field::ArrivalVessel);
        assert_eq!(grouped[1].1[0].0, "107166");
    }
}
