use crate::domain::model::{
    CheckReport, CheckStats, Field, ImportRecord, PoDifference, ReportRecord, ShipmentInput, UnmatchedPo,
};
use crate::rules::compare::{compare_records, CompareSettings};
use crate::rules::eta::format_optional_date;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub fields: Vec<Field>,
    pub compare: CompareSettings,
    /// Report rows with an ETA older than `as_of` minus this many days are skipped.
    pub eta_lookback_days: Option<i64>,
    pub as_of: NaiveDate,
}

/// Report POs in first-seen order, each mapped to the last row that carried it.
fn index_report<'a>(
    records: &'a [ReportRecord],
    settings: &MatchSettings,
    stats: &mut CheckStats,
) -> Vec<(&'a str, &'a ReportRecord)> {
    let cutoff = settings
        .eta_lookback_days
        .map(|days| settings.as_of - Duration::days(days));

    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &ReportRecord> = HashMap::new();

    for record in records {
        stats.report_rows += 1;

        let Some(eta) = record.eta else {
            tracing::debug!("Row {}: ETA '{}' is not a date, skipped", record.row_number, record.eta_raw);
            stats.dropped_invalid_eta += 1;
            continue;
        };
        if let Some(cutoff) = cutoff {
            if eta < cutoff {
                tracing::debug!("Row {}: ETA {} before {}, skipped", record.row_number, eta, cutoff);
                stats.dropped_before_window += 1;
                continue;
            }
        }
        if record.pos.is_empty() {
            tracing::debug!("Row {}: no PO in '{}'", record.row_number, record.po_text);
            stats.dropped_without_po += 1;
            continue;
        }

        for po in &record.pos {
            if latest.insert(po.as_str(), record).is_none() {
                order.push(po.as_str());
            }
        }
    }

    stats.report_pos = order.len();
    order
        .into_iter()
        .filter_map(|po| latest.get(po).map(|record| (po, *record)))
        .collect()
}

/// First import doc row for every PO it mentions.
fn index_import(records: &[ImportRecord]) -> HashMap<&str, &ImportRecord> {
    let mut index = HashMap::new();
    for record in records {
        for po in &record.pos {
            index.entry(po.as_str()).or_insert(record);
        }
    }
    index
}

/// Joins both sides by PO and collects differences and unmatched POs.
pub fn reconcile(input: &ShipmentInput, settings: &MatchSettings) -> CheckReport {
    let mut stats = CheckStats {
        import_rows: input.import.len(),
        ..Default::default()
    };

    let report_index = index_report(&input.report, settings, &mut stats);
    let import_index = index_import(&input.import);
    stats.import_pos = import_index.len();

    let mut differences = Vec::new();
    let mut unmatched = Vec::new();

    for (po, report) in report_index {
        match import_index.get(po) {
            Some(import) => {
                stats.matched_pos += 1;
                let diffs = compare_records(report, import, &settings.fields, &settings.compare);
                if !diffs.is_empty() {
                    tracing::debug!("PO {}: {} difference(s)", po, diffs.len());
                    differences.push(PoDifference {
                        po: po.to_string(),
                        diffs,
                    });
                }
            }
            None => unmatched.push(UnmatchedPo {
                po: po.to_string(),
                supplier: report.supplier.clone(),
                eta: format_optional_date(report.eta),
                vessel: report.vessel.clone(),
                container: report.container.clone(),
            }),
        }
    }

    CheckReport {
        report_sheet: input.report_sheet.clone(),
        import_sheet: input.import_sheet.clone(),
        differences,
        unmatched,
        stats,
        ..Default::default()
    }
}
