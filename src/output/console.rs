use crate::domain::model::{CheckReport, EtaReport};
use crate::rules::eta::{format_date, format_optional_date};
use std::fmt::Write;

/// Differences grouped by field, then unmatched POs, then a summary line.
pub fn render_check_report(report: &CheckReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Shipment check ({}): report sheet '{}', import doc sheet '{}'",
        report.profile, report.report_sheet, report.import_sheet
    );

    let groups = report.by_field();
    if groups.is_empty() {
        let _ = writeln!(out, "\n✅ No differences between matched POs");
    }
    for (field, rows) in groups {
        let _ = writeln!(out, "\n{} ({})", field, rows.len());
        for (po, diff) in rows {
            let _ = write!(
                out,
                "  PO {}: Report = '{}', Import Doc = '{}'",
                po, diff.report_value, diff.import_value
            );
            match &diff.note {
                Some(note) => {
                    let _ = writeln!(out, " [{}]", note);
                }
                None => out.push('\n'),
            }
        }
    }

    if !report.unmatched.is_empty() {
        let _ = writeln!(out, "\nUnmatched POs ({})", report.unmatched.len());
        for unmatched in &report.unmatched {
            let _ = writeln!(
                out,
                "  PO {}: supplier '{}', ETA '{}', vessel '{}', container '{}'",
                unmatched.po, unmatched.supplier, unmatched.eta, unmatched.vessel, unmatched.container
            );
        }
    }

    let stats = &report.stats;
    let _ = writeln!(
        out,
        "\nSummary: {} report POs, {} matched, {} with differences, {} unmatched \
         ({} rows skipped: {} invalid ETA, {} before window, {} without PO)",
        stats.report_pos,
        stats.matched_pos,
        report.differences.len(),
        report.unmatched.len(),
        stats.dropped_invalid_eta + stats.dropped_before_window + stats.dropped_without_po,
        stats.dropped_invalid_eta,
        stats.dropped_before_window,
        stats.dropped_without_po
    );
    out
}

pub fn render_eta_report(report: &EtaReport) -> String {
    let mut out = String::new();
    let metrics = &report.metrics;
    let _ = writeln!(
        out,
        "ERP rows: {} | Import ETAs found: {} | Mismatches: {} | Missing: {} (tolerance ±{} days)",
        metrics.erp_rows, metrics.import_found, metrics.mismatches, metrics.missing, report.tolerance_days
    );

    if !report.mismatches.is_empty() {
        let _ = writeln!(out, "\nETA mismatches ({})", report.mismatches.len());
        for m in &report.mismatches {
            let _ = writeln!(
                out,
                "  PO {}: ERP = '{}', Import Doc = '{}' ({:+} days, sheet '{}')",
                m.po,
                format_date(m.erp_eta),
                format_date(m.import_eta),
                m.day_diff,
                m.sheet
            );
        }
    }

    if !report.missing.is_empty() {
        let _ = writeln!(out, "\nMissing in import doc ({})", report.missing.len());
        for m in &report.missing {
            let _ = writeln!(out, "  PO {}: ERP = '{}'", m.po, format_optional_date(m.erp_eta));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EtaMetrics, EtaMismatch, Field, FieldDiff, PoDifference};
    use chrono::NaiveDate;

    #[test]
    fn test_check_report_lines() {
        let report = CheckReport {
            profile: "tristar".to_string(),
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
                        field: Field::Container,
                        report_value: "ABCU1234567(40HC)".to_string(),
                        import_value: String::new(),
                        note: Some("new container number".to_string()),
                    },
                ],
            }],
            ..Default::default()
        };

        let text = render_check_report(&report);
        assert!(text.contains("ETA (1)\n  PO 107166: Report = '2025-10-20', Import Doc = '2025-10-22'\n"));
        assert!(text.contains("Import Doc = '' [new container number]"));
        assert!(text.contains("1 with differences, 0 unmatched"));
        assert!(text.find("ETA (1)") < text.find("Container (1)"));
    }

    #[test]
    fn test_clean_report_says_so() {
        let text = render_check_report(&CheckReport::default());
        assert!(text.contains("No differences"));
        assert!(!text.contains("Unmatched POs"));
    }

    #[test]
    fn test_eta_report_metrics_line() {
        let report = EtaReport {
            tolerance_days: 1,
            mismatches: vec![EtaMismatch {
                po: "108214".to_string(),
                erp_eta: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
                import_eta: NaiveDate::from_ymd_opt(2026, 2, 23).unwrap(),
                day_diff: 3,
                sheet: "02.2026".to_string(),
            }],
            missing: vec![],
            metrics: EtaMetrics {
                erp_rows: 4,
                import_found: 3,
                mismatches: 1,
                missing: 0,
            },
        };

        let text = render_eta_report(&report);
        assert!(text.starts_with("ERP rows: 4 | Import ETAs found: 3 | Mismatches: 1 | Missing: 0"));
        assert!(text.contains("PO 108214: ERP = '2026-02-20', Import Doc = '2026-02-23' (+3 days, sheet '02.2026')"));
        assert!(!text.contains("Missing in import doc"));
    }
}
