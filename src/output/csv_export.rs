use crate::domain::model::{CheckReport, EtaReport, Field};
use crate::output::ReportFile;
use crate::rules::eta::{format_date, format_optional_date};
use crate::utils::error::{CheckError, Result};

pub const MATCHED_DIFFERENCES: &str = "matched_differences.csv";
pub const UNMATCHED_PO: &str = "unmatched_po.csv";
pub const ETA_MISMATCHES: &str = "eta_mismatches.csv";
pub const MISSING_IN_IMPORT_DOC: &str = "missing_in_import_doc.csv";

fn write_csv(name: &str, header: &[String], rows: &[Vec<String>]) -> Result<ReportFile> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| CheckError::ProcessingError {
            message: format!("{} could not be rendered: {}", name, e.error()),
        })?;
    Ok(ReportFile::new(name, data))
}

fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// One row per PO with an `_Excel_A`/`_Excel_B` pair for every field that
/// differs anywhere in the report. `None` when nothing differs.
pub fn matched_differences(report: &CheckReport) -> Result<Option<ReportFile>> {
    if report.differences.is_empty() {
        return Ok(None);
    }

    let fields = Field::ALL
        .into_iter()
        .filter(|field| report.differences.iter().any(|d| d.get(*field).is_some()))
        .collect::<Vec<_>>();
    let has_notes = report
        .differences
        .iter()
        .flat_map(|d| &d.diffs)
        .any(|diff| diff.note.is_some());

    let mut columns = vec!["PO".to_string()];
    for field in &fields {
        columns.push(format!("{}_Excel_A", field.display_name()));
        columns.push(format!("{}_Excel_B", field.display_name()));
    }
    if has_notes {
        columns.push("Note".to_string());
    }

    let rows = report
        .differences
        .iter()
        .map(|difference| {
            let mut row = vec![difference.po.clone()];
            for field in &fields {
                match difference.get(*field) {
                    Some(diff) => {
                        row.push(diff.report_value.clone());
                        row.push(diff.import_value.clone());
                    }
                    None => row.extend([String::new(), String::new()]),
                }
            }
            if has_notes {
                let notes = difference
                    .diffs
                    .iter()
                    .filter_map(|diff| diff.note.as_deref())
                    .collect::<Vec<_>>();
                row.push(notes.join("; "));
            }
            row
        })
        .collect::<Vec<_>>();

    write_csv(MATCHED_DIFFERENCES, &columns, &rows).map(Some)
}

pub fn unmatched_pos(report: &CheckReport) -> Result<Option<ReportFile>> {
    if report.unmatched.is_empty() {
        return Ok(None);
    }
    let rows = report
        .unmatched
        .iter()
        .map(|u| {
            vec![
                u.po.clone(),
                u.supplier.clone(),
                u.eta.clone(),
                u.vessel.clone(),
                u.container.clone(),
            ]
        })
        .collect::<Vec<_>>();
    write_csv(
        UNMATCHED_PO,
        &header(&["Unmatched PO", "Supplier", "ETA", "Arrival Vessel", "Container"]),
        &rows,
    )
    .map(Some)
}

pub fn eta_mismatches(report: &EtaReport) -> Result<Option<ReportFile>> {
    if report.mismatches.is_empty() {
        return Ok(None);
    }
    let rows = report
        .mismatches
        .iter()
        .map(|m| {
            vec![
                m.po.clone(),
                format_date(m.erp_eta),
                format_date(m.import_eta),
                m.day_diff.to_string(),
                m.sheet.clone(),
            ]
        })
        .collect::<Vec<_>>();
    write_csv(
        ETA_MISMATCHES,
        &header(&["PO", "ERP ETA", "Import ETA", "Day Diff", "Sheet"]),
        &rows,
    )
    .map(Some)
}

pub fn missing_in_import_doc(report: &EtaReport) -> Result<Option<ReportFile>> {
    if report.missing.is_empty() {
        return Ok(None);
    }
    let rows = report
        .missing
        .iter()
        .map(|m| vec![m.po.clone(), format_optional_date(m.erp_eta)])
        .collect::<Vec<_>>();
    write_csv(MISSING_IN_IMPORT_DOC, &header(&["PO", "ERP ETA"]), &rows).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EtaMismatch, EtaMissing, FieldDiff, PoDifference};
    use chrono::NaiveDate;

    fn diff(field: Field, a: &str, b: &str, note: Option<&str>) -> FieldDiff {
        FieldDiff {
            field,
            report_value: a.to_string(),
            import_value: b.to_string(),
            note: note.map(str::to_string),
        }
    }

    fn text(file: &ReportFile) -> String {
        String::from_utf8(file.data.clone()).unwrap()
    }

    #[test]
    fn test_matched_differences_only_has_differing_fields() {
        let report = CheckReport {
            differences: vec![
                PoDifference {
                    po: "107166".to_string(),
                    diffs: vec![diff(Field::Eta, "2025-10-20", "2025-10-22", None)],
                },
                PoDifference {
                    po: "107167".to_string(),
                    diffs: vec![diff(Field::ArrivalVessel, "MSC ANNA", "MSC ANNE", None)],
                },
            ],
            ..Default::default()
        };

        let file = matched_differences(&report).unwrap().unwrap();
        assert_eq!(file.name, MATCHED_DIFFERENCES);
        assert_eq!(
            text(&file),
            "PO,ETA_Excel_A,ETA_Excel_B,Arrival Vessel_Excel_A,Arrival Vessel_Excel_B\n\
             107166,2025-10-20,2025-10-22,,\n\
             107167,,,MSC ANNA,MSC ANNE\n"
        );
    }

    #[test]
    fn test_matched_differences_note_column() {
        let report = CheckReport {
            differences: vec![PoDifference {
                po: "107166".to_string(),
                diffs: vec![diff(
                    Field::Container,
                    "ABCU1234567(40HC)",
                    "ABCU1234567(20GP)",
                    Some("container type mismatch"),
                )],
            }],
            ..Default::default()
        };

        let file = matched_differences(&report).unwrap().unwrap();
        assert_eq!(
            text(&file),
            "PO,Container_Excel_A,Container_Excel_B,Note\n\
             107166,ABCU1234567(40HC),ABCU1234567(20GP),container type mismatch\n"
        );
    }

    #[test]
    fn test_empty_reports_produce_no_file() {
        assert!(matched_differences(&CheckReport::default()).unwrap().is_none());
        assert!(unmatched_pos(&CheckReport::default()).unwrap().is_none());
        assert!(eta_mismatches(&EtaReport::default()).unwrap().is_none());
        assert!(missing_in_import_doc(&EtaReport::default()).unwrap().is_none());
    }

    #[test]
    fn test_eta_check_files() {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let report = EtaReport {
            mismatches: vec![EtaMismatch {
                po: "108214".to_string(),
                erp_eta: date("2026-02-20"),
                import_eta: date("2026-02-17"),
                day_diff: -3,
                sheet: "02.2026".to_string(),
            }],
            missing: vec![
                EtaMissing {
                    po: "108215".to_string(),
                    erp_eta: Some(date("2026-02-21")),
                },
                EtaMissing {
                    po: "108216".to_string(),
                    erp_eta: None,
                },
            ],
            ..Default::default()
        };

        let mismatches = eta_mismatches(&report).unwrap().unwrap();
        assert_eq!(
            text(&mismatches),
            "PO,ERP ETA,Import ETA,Day Diff,Sheet\n108214,2026-02-20,2026-02-17,-3,02.2026\n"
        );

        let missing = missing_in_import_doc(&report).unwrap().unwrap();
        assert_eq!(text(&missing), "PO,ERP ETA\n108215,2026-02-21\n108216,\n");
    }
}
