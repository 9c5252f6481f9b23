use crate::domain::model::{Field, FieldDiff, ImportRecord, ReportRecord};
use crate::rules::container::{compare_containers, ContainerRule};
use crate::rules::eta::format_date;
use crate::rules::vessel::{normalize_vessel, normalize_voyage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffPolicy {
    /// Voyage differences only surface alongside two or more core differences.
    #[default]
    CoreFirst,
    Independent,
}

impl DiffPolicy {
    /// Filters raw differences down to what gets reported, in field order.
    pub fn apply(&self, mut diffs: Vec<FieldDiff>) -> Vec<FieldDiff> {
        diffs.sort_by_key(|d| d.field);
        match self {
            DiffPolicy::Independent => diffs,
            DiffPolicy::CoreFirst => {
                let core = diffs.iter().filter(|d| d.field.is_core()).count();
                match core {
                    0 => Vec::new(),
                    1 => diffs.into_iter().filter(|d| d.field.is_core()).collect(),
                    _ => diffs,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    pub container_rule: ContainerRule,
    pub policy: DiffPolicy,
    pub eta_tolerance_days: i64,
}

/// Reported differences between a report row and its import doc row.
pub fn compare_records(
    report: &ReportRecord,
    import: &ImportRecord,
    fields: &[Field],
    settings: &CompareSettings,
) -> Vec<FieldDiff> {
    let diffs = fields
        .iter()
        .filter_map(|field| match field {
            Field::Eta => compare_eta(report, import, settings.eta_tolerance_days),
            Field::Container => {
                compare_containers(&report.container, &import.container, settings.container_rule)
            }
            Field::ArrivalVessel => compare_text(
                Field::ArrivalVessel,
                &report.vessel,
                &import.vessel,
                normalize_vessel,
            ),
            Field::ArrivalVoyage => compare_text(
                Field::ArrivalVoyage,
                &report.voyage,
                &import.voyage,
                normalize_voyage,
            ),
        })
        .collect();

    settings.policy.apply(diffs)
}

fn compare_eta(report: &ReportRecord, import: &ImportRecord, tolerance_days: i64) -> Option<FieldDiff> {
    let differs = match (report.eta, import.eta) {
        (Some(a), Some(b)) => (b - a).num_days().abs() > tolerance_days,
        (None, None) => false,
        _ => true,
    };

    differs.then(|| FieldDiff {
        field: Field::Eta,
        report_value: eta_display(report.eta, &report.eta_raw),
        import_value: eta_display(import.eta, &import.eta_raw),
        note: None,
    })
}

fn eta_display(date: Option<NaiveDate>, raw: &str) -> String {
    date.map(format_date).unwrap_or_else(|| raw.trim().to_string())
}

fn compare_text(field: Field, report: &str, import: &str, normalize: fn(&str) -> String) -> Option<FieldDiff> {
    (normalize(report) != normalize(import)).then(|| FieldDiff {
        field,
        report_value: report.trim().to_string(),
        import_value: import.trim().to_string(),
        note: None,
    })
}
