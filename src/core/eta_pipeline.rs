use crate::domain::model::{EtaInput, EtaMetrics, EtaMismatch, EtaMissing, EtaReport, EtaRow, SheetGrid};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::output::{self, bundle, csv_export, json, ReportFile};
use crate::rules::eta::parse_eta;
use crate::rules::po::PoRule;
use crate::sheet::header::{KeywordMatch, Table};
use crate::sheet::workbook::Workbook;
use crate::utils::error::{CheckError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

pub const ERP_SOURCE: &str = "ERP export";
pub const IMPORT_SOURCE: &str = "import doc";

const ERP_PO_COLUMN: &str = "No.";
const ERP_DATE_COLUMN: &str = "Arrival Date";
const IMPORT_PO_COLUMN: &str = "BC PO";
const IMPORT_ETA_COLUMN: &str = "Estimated Arrival";
const IMPORT_ETA_ALIASES: &[&str] = &["ETA Dates", "ETA Date"];

#[derive(Debug, Clone, Default)]
pub struct EtaSources {
    pub erp: String,
    pub import_doc: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EtaSettings {
    pub tolerance_days: i64,
    pub accept_eta_dates: bool,
}

pub struct EtaCheckPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    settings: EtaSettings,
    sources: EtaSources,
}

impl<S: Storage, C: ConfigProvider> EtaCheckPipeline<S, C> {
    pub fn new(storage: S, config: C, settings: EtaSettings, sources: EtaSources) -> Self {
        Self {
            storage,
            config,
            settings,
            sources,
        }
    }

    fn wants(&self, format: &str) -> bool {
        let formats = self.config.output_formats();
        (formats.is_empty() && format == "csv") || formats.iter().any(|f| f == format)
    }
}

/// ERP rows keyed by the `PO123456` token of `No.`; rows without one are dropped.
pub fn read_erp_rows(workbook: &Workbook) -> Result<Vec<EtaRow>> {
    let grid = workbook.first_sheet()?;
    let table = Table::from_grid(grid, 0);

    let po_col = table.find_column(ERP_PO_COLUMN, KeywordMatch::Exact);
    let date_col = table.find_column(ERP_DATE_COLUMN, KeywordMatch::Exact);
    let (Some(po_col), Some(date_col)) = (po_col, date_col) else {
        let columns = [(ERP_PO_COLUMN, po_col), (ERP_DATE_COLUMN, date_col)]
            .into_iter()
            .filter(|(_, col)| col.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(CheckError::MissingColumns {
            source_name: workbook.source_name.clone(),
            columns,
        });
    };

    let mut dropped = 0;
    let rows = table
        .rows
        .iter()
        .filter_map(|row| {
            let Some(po) = PoRule::Prefixed.extract(&row.text(Some(po_col))).into_iter().next() else {
                dropped += 1;
                return None;
            };
            Some(EtaRow {
                po,
                eta: parse_eta(row.get(date_col), true),
                sheet: None,
            })
        })
        .collect::<Vec<_>>();

    if dropped > 0 {
        tracing::debug!("Dropped {} ERP rows without a PO number", dropped);
    }
    Ok(rows)
}

fn import_eta_column(table: &Table, accept_eta_dates: bool) -> Option<usize> {
    table
        .find_column(IMPORT_ETA_COLUMN, KeywordMatch::Exact)
        .or_else(|| {
            accept_eta_dates
                .then(|| {
                    IMPORT_ETA_ALIASES
                        .iter()
                        .find_map(|alias| table.find_column(alias, KeywordMatch::Exact))
                })
                .flatten()
        })
}

fn read_import_sheet(grid: &SheetGrid, accept_eta_dates: bool) -> Option<Vec<EtaRow>> {
    let table = Table::from_grid(grid, 0);
    let po_col = table.find_column(IMPORT_PO_COLUMN, KeywordMatch::Exact);
    let (Some(po_col), Some(eta_col)) = (po_col, import_eta_column(&table, accept_eta_dates)) else {
        tracing::debug!("Sheet '{}' has no BC PO / ETA columns, skipped", grid.name);
        return None;
    };

    let rows = table
        .rows
        .iter()
        .flat_map(|row| {
            let eta = parse_eta(row.get(eta_col), true);
            PoRule::SlashList
                .extract(&row.text(Some(po_col)))
                .into_iter()
                .map(move |po| EtaRow {
                    po,
                    eta,
                    sheet: Some(grid.name.clone()),
                })
        })
        .collect();
    Some(rows)
}

/// PO entries from every qualifying sheet, later occurrences replacing earlier ones.
pub fn read_import_rows(workbook: &Workbook, accept_eta_dates: bool) -> Result<(Vec<EtaRow>, Vec<String>)> {
    let mut sheets_used = Vec::new();
    let mut rows = Vec::new();

    for grid in &workbook.sheets {
        if let Some(sheet_rows) = read_import_sheet(grid, accept_eta_dates) {
            tracing::info!("📄 Sheet '{}': {} PO entries", grid.name, sheet_rows.len());
            sheets_used.push(grid.name.clone());
            rows.extend(sheet_rows);
        }
    }

    if rows.is_empty() {
        return Err(CheckError::NoUsableSheets {
            source_name: workbook.source_name.clone(),
            message: format!(
                "no sheet has '{}' and '{}' columns with six-digit PO numbers",
                IMPORT_PO_COLUMN, IMPORT_ETA_COLUMN
            ),
        });
    }

    let mut position: HashMap<String, usize> = HashMap::new();
    let mut latest: Vec<EtaRow> = Vec::new();
    for row in rows {
        match position.get(&row.po) {
            Some(&index) => latest[index] = row,
            None => {
                position.insert(row.po.clone(), latest.len());
                latest.push(row);
            }
        }
    }

    Ok((latest, sheets_used))
}

/// Left join of ERP rows onto the import doc, both result lists sorted by PO.
pub fn compare_etas(input: &EtaInput, tolerance_days: i64) -> EtaReport {
    let import: HashMap<&str, &EtaRow> = input.import.iter().map(|row| (row.po.as_str(), row)).collect();

    let mut mismatches = Vec::new();
    let mut missing = Vec::new();
    let mut import_found = 0;

    for erp in &input.erp {
        let found = import.get(erp.po.as_str()).and_then(|row| row.eta.map(|eta| (eta, *row)));
        let Some((import_eta, import_row)) = found else {
            missing.push(EtaMissing {
                po: erp.po.clone(),
                erp_eta: erp.eta,
            });
            continue;
        };
        import_found += 1;

        if let Some(erp_eta) = erp.eta {
            let day_diff = day_diff(erp_eta, import_eta);
            if day_diff.abs() > tolerance_days {
                tracing::debug!("PO {}: {:+} days", erp.po, day_diff);
                mismatches.push(EtaMismatch {
                    po: erp.po.clone(),
                    erp_eta,
                    import_eta,
                    day_diff,
                    sheet: import_row.sheet.clone().unwrap_or_default(),
                });
            }
        }
    }

    mismatches.sort_by(|a, b| a.po.cmp(&b.po));
    missing.sort_by(|a, b| a.po.cmp(&b.po));

    EtaReport {
        tolerance_days,
        metrics: EtaMetrics {
            erp_rows: input.erp.len(),
            import_found,
            mismatches: mismatches.len(),
            missing: missing.len(),
        },
        mismatches,
        missing,
    }
}

fn day_diff(erp: NaiveDate, import: NaiveDate) -> i64 {
    (import - erp).num_days()
}

impl<S: Storage, C: ConfigProvider> Pipeline for EtaCheckPipeline<S, C> {
    type Extracted = EtaInput;
    type Output = EtaReport;

    fn extract(&self) -> Result<EtaInput> {
        let erp_book = Workbook::open(&self.sources.erp, ERP_SOURCE)?;
        let erp = read_erp_rows(&erp_book)?;
        tracing::info!("✅ {} ERP rows with a PO", erp.len());

        let import_book = Workbook::open(&self.sources.import_doc, IMPORT_SOURCE)?;
        let (import, import_sheets_used) = read_import_rows(&import_book, self.settings.accept_eta_dates)?;

        Ok(EtaInput {
            erp,
            import,
            import_sheets_used,
        })
    }

    fn transform(&self, data: EtaInput) -> Result<EtaReport> {
        Ok(compare_etas(&data, self.settings.tolerance_days))
    }

    fn load(&self, report: &EtaReport) -> Result<Vec<String>> {
        let mut files: Vec<ReportFile> = Vec::new();

        if self.wants("csv") {
            files.extend(csv_export::eta_mismatches(report)?);
            files.extend(csv_export::missing_in_import_doc(report)?);
        }
        if self.wants("json") {
            files.push(json::json_report(json::ETA_CHECK_JSON, report)?);
        }

        let archive = self.config.bundle().then_some(bundle::ETA_CHECK_ARCHIVE);
        output::write_reports(&self.storage, &files, archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{write_csv, MockConfig, MockStorage};
    use crate::domain::model::CellValue;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(po: &str, eta: Option<&str>, sheet: Option<&str>) -> EtaRow {
        EtaRow {
            po: po.to_string(),
            eta: eta.map(date),
            sheet: sheet.map(str::to_string),
        }
    }

    fn grid(name: &str, rows: &[&[&str]]) -> SheetGrid {
        SheetGrid::new(
            name,
            rows.iter()
                .map(|r| r.iter().map(|c| CellValue::from(*c)).collect())
                .collect(),
        )
    }

    fn workbook(sheets: Vec<SheetGrid>) -> Workbook {
        Workbook {
            source_name: IMPORT_SOURCE.to_string(),
            sheets,
        }
    }

    #[test]
    fn test_erp_rows_need_prefixed_po() {
        let book = workbook(vec![grid(
            "BC",
            &[
                &["No.", "Vendor", "Arrival Date"],
                &["PO108214", "ACME", "20/02/2026"],
                &["SO500001", "ACME", "21/02/2026"],
                &["PO108215", "ACME", "soon"],
            ],
        )]);

        let rows = read_erp_rows(&book).unwrap();
        assert_eq!(rows, vec![row("108214", Some("2026-02-20"), None), row("108215", None, None)]);
    }

    #[test]
    fn test_erp_missing_columns_are_listed() {
        let book = workbook(vec![grid("BC", &[&["No.", "ETA"], &["PO108214", "2026-02-20"]])]);
        match read_erp_rows(&book) {
            Err(CheckError::MissingColumns { columns, .. }) => assert_eq!(columns, vec!["Arrival Date"]),
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_import_rows_last_occurrence_wins() {
        let book = workbook(vec![
            grid("Notes", &[&["anything"], &["here"]]),
            grid(
                "01.2026",
                &[
                    &["BC PO", "Estimated Arrival"],
                    &["108214/108215", "10/01/2026"],
                    &["108216(100001)", "11/01/2026"],
                ],
            ),
            grid("02.2026", &[&["bc po", "estimated arrival"], &["108214", "20/02/2026"]]),
        ]);

        let (rows, sheets) = read_import_rows(&book, false).unwrap();
        assert_eq!(sheets, vec!["01.2026", "02.2026"]);
        assert_eq!(
            rows,
            vec![
                row("108214", Some("2026-02-20"), Some("02.2026")),
                row("108215", Some("2026-01-10"), Some("01.2026")),
                row("108216", Some("2026-01-11"), Some("01.2026")),
            ]
        );
    }

    #[test]
    fn test_eta_dates_alias_only_when_accepted() {
        let book = workbook(vec![grid("03.2026", &[&["BC PO", "ETA Dates"], &["108300", "01/03/2026"]])]);

        assert!(matches!(
            read_import_rows(&book, false),
            Err(CheckError::NoUsableSheets { .. })
        ));
        let (rows, _) = read_import_rows(&book, true).unwrap();
        assert_eq!(rows, vec![row("108300", Some("2026-03-01"), Some("03.2026"))]);
    }

    #[test]
    fn test_compare_etas_tolerance_and_missing() {
        let input = EtaInput {
            erp: vec![
                row("108216", Some("2026-02-20"), None),
                row("108214", Some("2026-02-20"), None),
                row("108215", Some("2026-02-20"), None),
                row("108217", Some("2026-02-20"), None),
                row("108218", None, None),
            ],
            import: vec![
                row("108214", Some("2026-02-23"), Some("02.2026")),
                row("108215", Some("2026-02-21"), Some("02.2026")),
                row("108216", None, Some("02.2026")),
                row("108218", Some("2026-02-01"), Some("02.2026")),
            ],
            import_sheets_used: vec!["02.2026".to_string()],
        };

        let report = compare_etas(&input, 1);

        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].po, "108214");
        assert_eq!(report.mismatches[0].day_diff, 3);
        assert_eq!(report.mismatches[0].sheet, "02.2026");
        let missing = report.missing.iter().map(|m| m.po.as_str()).collect::<Vec<_>>();
        assert_eq!(missing, vec!["108216", "108217"]);
        assert_eq!(
            report.metrics,
            EtaMetrics {
                erp_rows: 5,
                import_found: 3,
                mismatches: 1,
                missing: 2,
            }
        );
    }

    #[test]
    fn test_negative_day_diff_when_import_is_earlier() {
        let input = EtaInput {
            erp: vec![row("108214", Some("2026-02-20"), None)],
            import: vec![row("108214", Some("2026-02-18"), Some("02.2026"))],
            ..Default::default()
        };
        assert_eq!(compare_etas(&input, 0).mismatches[0].day_diff, -2);
    }

    #[test]
    fn test_pipeline_writes_eta_reports() {
        let dir = TempDir::new().unwrap();
        let erp = write_csv(
            dir.path(),
            "erp.csv",
            &[
                &["No.", "Arrival Date"],
                &["PO108214", "20/02/2026"],
                &["PO108299", "20/02/2026"],
            ],
        );
        let import_doc = write_csv(
            dir.path(),
            "02.2026.csv",
            &[&["BC PO", "Estimated Arrival"], &["108214", "23/02/2026"]],
        );
        let storage = MockStorage::new();
        let pipeline = EtaCheckPipeline::new(
            storage.clone(),
            MockConfig::new("2026-02-01"),
            EtaSettings::default(),
            EtaSources { erp, import_doc },
        );

        let input = pipeline.extract().unwrap();
        assert_eq!(input.import_sheets_used, vec!["02.2026"]);
        let report = pipeline.transform(input).unwrap();
        let written = pipeline.load(&report).unwrap();

        assert_eq!(
            written,
            vec!["test_output/eta_mismatches.csv", "test_output/missing_in_import_doc.csv"]
        );
        assert_eq!(
            storage.get_text("eta_mismatches.csv").unwrap(),
            "PO,ERP ETA,Import ETA,Day Diff,Sheet\n108214,2026-02-20,2026-02-23,3,02.2026\n"
        );
        assert_eq!(
            storage.get_text("missing_in_import_doc.csv").unwrap(),
            "PO,ERP ETA\n108299,2026-02-20\n"
        );
    }
}
