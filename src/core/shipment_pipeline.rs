use crate::config::profile_config::ProfileConfig;
use crate::domain::model::{CheckReport, ImportRecord, ReportRecord, ShipmentInput};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::output::{self, bundle, csv_export, json, ReportFile};
use crate::rules::matching::{reconcile, MatchSettings};
use crate::sheet::columns::{map_import_columns, map_report_columns, read_import_records, read_report_records};
use crate::sheet::header::{locate_header, Table};
use crate::sheet::workbook::Workbook;
use crate::utils::error::Result;

pub const REPORT_SOURCE: &str = "shipment report";
pub const IMPORT_SOURCE: &str = "import doc";

/// Input files and optional sheet pins for one shipment check.
#[derive(Debug, Clone, Default)]
pub struct ShipmentSources {
    pub report: String,
    pub import_doc: String,
    pub report_sheet: Option<String>,
    pub import_sheet: Option<String>,
}

pub struct ShipmentCheckPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    profile: ProfileConfig,
    sources: ShipmentSources,
}

impl<S: Storage, C: ConfigProvider> ShipmentCheckPipeline<S, C> {
    pub fn new(storage: S, config: C, profile: ProfileConfig, sources: ShipmentSources) -> Self {
        Self {
            storage,
            config,
            profile,
            sources,
        }
    }

    fn read_report(&self) -> Result<(String, Vec<ReportRecord>)> {
        let section = &self.profile.report;
        let workbook = Workbook::open(&self.sources.report, REPORT_SOURCE)?;
        let grid = workbook.sheet_or(self.sources.report_sheet.as_deref(), Workbook::first_sheet)?;
        tracing::info!("📄 Report sheet: '{}'", grid.name);

        let header_row = locate_header(
            grid,
            &section.header_keywords,
            section.header_match,
            section.header_fallback,
            REPORT_SOURCE,
        )?;
        let table = Table::from_grid(grid, header_row);
        let mapping = map_report_columns(
            &table,
            &section.columns,
            section.column_match,
            &self.profile.compare.fields,
            REPORT_SOURCE,
        )?;

        let records = read_report_records(&table, &mapping, section.po_rule, section.day_first);
        Ok((grid.name.clone(), records))
    }

    fn read_import_doc(&self) -> Result<(String, Vec<ImportRecord>)> {
        let section = &self.profile.import_doc;
        let workbook = Workbook::open(&self.sources.import_doc, IMPORT_SOURCE)?;
        let grid = workbook.sheet_or(self.sources.import_sheet.as_deref(), Workbook::latest_sheet)?;
        tracing::info!("📄 Import doc sheet: '{}'", grid.name);

        let header_row = locate_header(
            grid,
            &section.header_keywords,
            section.header_match,
            section.header_fallback,
            IMPORT_SOURCE,
        )?;
        let table = Table::from_grid(grid, header_row);
        let mapping = map_import_columns(&table, &section.keywords, &self.profile.compare.fields, IMPORT_SOURCE)?;

        let records = read_import_records(&table, &mapping, section.po_rule, section.day_first);
        Ok((grid.name.clone(), records))
    }

    fn wants(&self, format: &str) -> bool {
        let formats = self.config.output_formats();
        // csv unless told otherwise
        (formats.is_empty() && format == "csv") || formats.iter().any(|f| f == format)
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for ShipmentCheckPipeline<S, C> {
    type Extracted = ShipmentInput;
    type Output = CheckReport;

    fn extract(&self) -> Result<ShipmentInput> {
        tracing::info!("🧾 Profile: {}", self.profile.name());
        let (report_sheet, report) = self.read_report()?;
        let (import_sheet, import) = self.read_import_doc()?;

        Ok(ShipmentInput {
            report_sheet,
            import_sheet,
            report,
            import,
        })
    }

    fn transform(&self, data: ShipmentInput) -> Result<CheckReport> {
        let settings = MatchSettings {
            fields: self.profile.compare.fields.clone(),
            compare: self.profile.compare.settings(),
            eta_lookback_days: self.profile.report.eta_lookback_days,
            as_of: self.config.as_of(),
        };
        tracing::debug!("Match settings: {:?}", settings);

        let mut report = reconcile(&data, &settings);
        report.profile = self.profile.name().to_string();

        let stats = &report.stats;
        if stats.dropped_invalid_eta > 0 {
            tracing::warn!("⚠️ Dropped {} report rows with an invalid ETA", stats.dropped_invalid_eta);
        }
        if stats.dropped_before_window > 0 {
            tracing::info!(
                "Skipped {} report rows with an ETA before the look-back window",
                stats.dropped_before_window
            );
        }
        Ok(report)
    }

    fn load(&self, report: &CheckReport) -> Result<Vec<String>> {
        let mut files: Vec<ReportFile> = Vec::new();

        if self.wants("csv") {
            files.extend(csv_export::matched_differences(report)?);
            files.extend(csv_export::unmatched_pos(report)?);
        }
        if self.wants("json") {
            files.push(json::json_report(json::SHIPCHECK_JSON, report)?);
        }

        let archive = self.config.bundle().then_some(bundle::SHIPCHECK_ARCHIVE);
        output::write_reports(&self.storage, &files, archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{write_csv, MockConfig, MockStorage};
    use crate::domain::model::Field;
    use crate::utils::error::CheckError;
    use tempfile::TempDir;

    const BURNARD_HEADER: &[&str] = &["Order #", "Supplier", "ETA", "Arrival Vessel", "Arrival Voyage", "Container"];

    fn import_doc(dir: &TempDir) -> String {
        write_csv(
            dir.path(),
            "10.2025.csv",
            &[
                &["IMPORT DOC OCTOBER", "", "", "", "", ""],
                &["BC PO", "Supplier", "ETA", "Vessel Name", "Voyage", "Container No."],
                &["107166", "ACME", "2025-10-22", "MSC ANNA", "12E", "ABCU1234567"],
                &["107167/107168", "ACME", "2025-10-25", "EVER GIVEN", "7W", "DEFU7654321"],
            ],
        )
    }

    fn pipeline(
        dir: &TempDir,
        report_rows: &[&[&str]],
        profile: ProfileConfig,
    ) -> (ShipmentCheckPipeline<MockStorage, MockConfig>, MockStorage) {
        let report = write_csv(dir.path(), "report.csv", report_rows);
        let storage = MockStorage::new();
        let sources = ShipmentSources {
            report,
            import_doc: import_doc(dir),
            ..Default::default()
        };
        let pipeline = ShipmentCheckPipeline::new(storage.clone(), MockConfig::new("2025-10-20"), profile, sources);
        (pipeline, storage)
    }

    #[test]
    fn test_extract_maps_both_sides() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(
            &dir,
            &[
                BURNARD_HEADER,
                &["107166", "ACME", "2025-10-20", "MSC ANNA", "12E", "ABCU1234567"],
            ],
            ProfileConfig::burnard(),
        );

        let input = pipeline.extract().unwrap();
        assert_eq!(input.report_sheet, "report");
        assert_eq!(input.import_sheet, "10.2025");
        assert_eq!(input.report.len(), 1);
        assert_eq!(input.import.len(), 2);
        assert_eq!(input.import[1].pos, vec!["107167", "107168"]);
        assert_eq!(input.import[0].container, "ABCU1234567");
    }

    #[test]
    fn test_burnard_run_writes_differences_and_unmatched() {
        let dir = TempDir::new().unwrap();
        let (pipeline, storage) = pipeline(
            &dir,
            &[
                BURNARD_HEADER,
                &["107166", "ACME", "2025-10-20", "MSC ANNA", "12E", "ABCU1234567"],
                &["107167", "ACME", "2025-10-25", "EVER GIVEN", "7W", "ZZZU0000001"],
                &["109999", "GLOBEX", "2025-10-30", "MSC ANNA", "12E", ""],
            ],
            ProfileConfig::burnard(),
        );

        let input = pipeline.extract().unwrap();
        let report = pipeline.transform(input).unwrap();

        assert_eq!(report.profile, "burnard");
        assert_eq!(report.differences.len(), 2);
        assert_eq!(report.differences[0].diffs[0].field, Field::Eta);
        assert_eq!(report.differences[1].diffs[0].field, Field::Container);
        assert_eq!(report.unmatched[0].po, "109999");

        let written = pipeline.load(&report).unwrap();
        assert_eq!(
            written,
            vec!["test_output/matched_differences.csv", "test_output/unmatched_po.csv"]
        );
        let unmatched = storage.get_text("unmatched_po.csv").unwrap();
        assert_eq!(
            unmatched,
            "Unmatched PO,Supplier,ETA,Arrival Vessel,Container\n109999,GLOBEX,2025-10-30,MSC ANNA,\n"
        );
    }

    #[test]
    fn test_missing_report_header_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(&dir, &[&["PO", "ETA"], &["107166", "2025-10-20"]], ProfileConfig::burnard());
        assert!(matches!(pipeline.extract(), Err(CheckError::HeaderNotFound { .. })));
    }

    #[test]
    fn test_bundle_and_json_output() {
        let dir = TempDir::new().unwrap();
        let report = write_csv(
            dir.path(),
            "report.csv",
            &[BURNARD_HEADER, &["109999", "GLOBEX", "2025-10-30", "MSC ANNA", "12E", ""]],
        );
        let storage = MockStorage::new();
        let mut config = MockConfig::new("2025-10-20");
        config.output_formats = vec!["csv".to_string(), "json".to_string()];
        config.bundle = true;
        let pipeline = ShipmentCheckPipeline::new(
            storage.clone(),
            config,
            ProfileConfig::burnard(),
            ShipmentSources {
                report,
                import_doc: import_doc(&dir),
                ..Default::default()
            },
        );

        let input = pipeline.extract().unwrap();
        let report = pipeline.transform(input).unwrap();
        let written = pipeline.load(&report).unwrap();

        assert_eq!(written, vec!["test_output/shipcheck_output.zip"]);
        assert_eq!(storage.file_names(), vec!["shipcheck_output.zip"]);

        let zip_data = storage.get_file("shipcheck_output.zip").unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let mut names = archive.file_names().map(str::to_string).collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["report.json", "unmatched_po.csv"]);
    }

    #[test]
    fn test_pinned_import_sheet_must_exist() {
        let dir = TempDir::new().unwrap();
        let report = write_csv(dir.path(), "report.csv", &[BURNARD_HEADER]);
        let pipeline = ShipmentCheckPipeline::new(
            MockStorage::new(),
            MockConfig::new("2025-10-20"),
            ProfileConfig::burnard(),
            ShipmentSources {
                report,
                import_doc: import_doc(&dir),
                import_sheet: Some("11.2025".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(pipeline.extract(), Err(CheckError::SheetNotFound { .. })));
    }
}
