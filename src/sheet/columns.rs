//! Column mapping for both sides of the shipment check.
//!
//! The forwarder report has stable, profile-named columns. The import doc is
//! maintained by hand and renamed every few months, so its columns are found
//! by keyword, and its container numbers are spread over a run of unnamed
//! columns to the right of the first container header.

use crate::domain::model::{Field, ImportRecord, ReportRecord};
use crate::rules::eta::parse_eta;
use crate::rules::po::PoRule;
use crate::sheet::header::{find_column, is_unnamed, KeywordMatch, Table, TableRow};
use crate::utils::error::{CheckError, Result};
use serde::{Deserialize, Serialize};

/// Extra unnamed columns a container span may take after its header.
pub const CONTAINER_SPAN_MAX: usize = 5;

/// Report header names for each logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportColumns {
    pub po: String,
    pub eta: String,
    pub vessel: String,
    pub voyage: String,
    pub container: String,
    #[serde(default)]
    pub container_type: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMapping {
    pub po: usize,
    pub eta: usize,
    pub vessel: Option<usize>,
    pub voyage: Option<usize>,
    pub container: Option<usize>,
    pub container_type: Option<usize>,
    pub supplier: Option<usize>,
}

pub fn map_report_columns(
    table: &Table,
    columns: &ReportColumns,
    mode: KeywordMatch,
    fields: &[Field],
    source_name: &str,
) -> Result<ReportMapping> {
    let mut missing = Vec::new();
    let mut resolve = |name: &str, required: bool| {
        let found = find_column(&table.headers, name, mode);
        if found.is_none() && required {
            missing.push(name.to_string());
        }
        if let Some(col) = found {
            tracing::info!("'{}' → '{}'", table.headers[col], name);
        }
        found
    };

    let compares = |field: Field| fields.contains(&field);

    let po = resolve(&columns.po, true);
    let eta = resolve(&columns.eta, true);
    let vessel = resolve(&columns.vessel, compares(Field::ArrivalVessel));
    let voyage = resolve(&columns.voyage, compares(Field::ArrivalVoyage));
    let container = resolve(&columns.container, compares(Field::Container));
    let container_type = columns
        .container_type
        .as_deref()
        .and_then(|name| resolve(name, compares(Field::Container)));
    let supplier = columns.supplier.as_deref().and_then(|name| resolve(name, false));

    match (po, eta) {
        (Some(po), Some(eta)) if missing.is_empty() => Ok(ReportMapping {
            po,
            eta,
            vessel,
            voyage,
            container,
            container_type,
            supplier,
        }),
        _ => Err(CheckError::MissingColumns {
            source_name: source_name.to_string(),
            columns: missing,
        }),
    }
}

/// `NUMBER(TYPE)` from separate number and type cells.
pub fn compose_container(number: &str, kind: &str) -> String {
    match (number.trim(), kind.trim()) {
        ("", "") => String::new(),
        (number, "") => number.to_string(),
        ("", kind) => format!("({})", kind),
        (number, kind) => format!("{}({})", number, kind),
    }
}

pub fn read_report_records(
    table: &Table,
    mapping: &ReportMapping,
    po_rule: PoRule,
    day_first: bool,
) -> Vec<ReportRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            let po_text = row.text(Some(mapping.po));
            let eta_cell = row.get(mapping.eta);
            let container = match mapping.container_type {
                Some(type_col) => compose_container(&row.text(mapping.container), &row.text(Some(type_col))),
                None => row.text(mapping.container),
            };

            ReportRecord {
                row_number: row.row_number,
                pos: po_rule.extract(&po_text),
                po_text,
                eta: parse_eta(eta_cell, day_first),
                eta_raw: eta_cell.display().trim().to_string(),
                vessel: row.text(mapping.vessel),
                voyage: row.text(mapping.voyage),
                container,
                supplier: row.text(mapping.supplier),
            }
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Keyword lists for the import doc columns, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportKeywords {
    pub bc_po: Vec<String>,
    pub eta: Vec<String>,
    pub vessel: Vec<String>,
    pub voyage: Vec<String>,
    pub supplier: Vec<String>,
}

impl Default for ImportKeywords {
    fn default() -> Self {
        Self {
            bc_po: strings(&["bc po", "bcpo", "po lc"]),
            eta: strings(&["estimated arrival", "eta dates", "eta date", "eta"]),
            vessel: strings(&["vessel name", "arrival vessel", "vessel", "freight co"]),
            voyage: strings(&["voyage flight number", "arrival voyage", "voyage"]),
            supplier: strings(&["supplier"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMapping {
    pub po: usize,
    pub eta: usize,
    pub vessel: Option<usize>,
    pub voyage: Option<usize>,
    pub supplier: Option<usize>,
    pub container_span: Vec<usize>,
}

/// Lowercase, trimmed, `/` as a space, `.` and `#` removed.
pub fn clean_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace('/', " ")
        .replace(['.', '#'], "")
}

fn is_container_header(cleaned: &str) -> bool {
    cleaned.contains("container") || cleaned.split_whitespace().any(|word| word == "cont")
}

/// The first container header plus the unnamed columns directly after it.
pub fn container_span(headers: &[String]) -> Vec<usize> {
    let Some(start) = headers.iter().position(|h| is_container_header(&clean_header(h))) else {
        return Vec::new();
    };

    let mut span = vec![start];
    span.extend(
        headers
            .iter()
            .enumerate()
            .skip(start + 1)
            .take(CONTAINER_SPAN_MAX)
            .take_while(|(_, h)| is_unnamed(h))
            .map(|(col, _)| col),
    );
    span
}

pub fn map_import_columns(
    table: &Table,
    keywords: &ImportKeywords,
    fields: &[Field],
    source_name: &str,
) -> Result<ImportMapping> {
    let cleaned = table.headers.iter().map(|h| clean_header(h)).collect::<Vec<_>>();
    let mut taken = vec![false; cleaned.len()];

    let mut assign = |name: &str, keywords: &[String], require_bc_po: bool| -> Option<usize> {
        let found = keywords.iter().find_map(|keyword| {
            let keyword = clean_header(keyword);
            (0..cleaned.len()).find(|&col| {
                !taken[col]
                    && cleaned[col].contains(&keyword)
                    && (!require_bc_po || cleaned[col].contains("bc po"))
            })
        });
        if let Some(col) = found {
            taken[col] = true;
            tracing::info!("'{}' → '{}'", table.headers[col], name);
        }
        found
    };

    let po = assign("BC PO", &keywords.bc_po, true);
    let eta = assign("ETA", &keywords.eta, false);
    let vessel = assign("Arrival Vessel", &keywords.vessel, false);
    let voyage = assign("Arrival Voyage", &keywords.voyage, false);
    let supplier = assign("Supplier", &keywords.supplier, false);

    let container_span = container_span(&table.headers);
    if container_span.is_empty() {
        tracing::warn!("⚠️ No container column in {}; containers read as empty", source_name);
    } else {
        let names = container_span
            .iter()
            .map(|&col| table.headers[col].as_str())
            .collect::<Vec<_>>();
        tracing::info!("'{}' → 'Container (Consolidated)'", names.join(", "));
    }

    let mut missing = Vec::new();
    if po.is_none() {
        missing.push("BC PO".to_string());
    }
    if eta.is_none() {
        missing.push("ETA".to_string());
    }
    if vessel.is_none() && fields.contains(&Field::ArrivalVessel) {
        missing.push("Arrival Vessel".to_string());
    }
    if voyage.is_none() && fields.contains(&Field::ArrivalVoyage) {
        missing.push("Arrival Voyage".to_string());
    }

    match (po, eta) {
        (Some(po), Some(eta)) if missing.is_empty() => Ok(ImportMapping {
            po,
            eta,
            vessel,
            voyage,
            supplier,
            container_span,
        }),
        _ => Err(CheckError::MissingColumns {
            source_name: source_name.to_string(),
            columns: missing,
        }),
    }
}

fn consolidate_container(row: &TableRow, span: &[usize]) -> String {
    span.iter()
        .map(|&col| row.text(Some(col)))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn read_import_records(
    table: &Table,
    mapping: &ImportMapping,
    po_rule: PoRule,
    day_first: bool,
) -> Vec<ImportRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            let po_text = row.text(Some(mapping.po));
            let eta_cell = row.get(mapping.eta);
            ImportRecord {
                row_number: row.row_number,
                pos: po_rule.extract(&po_text),
                po_text,
                eta: parse_eta(eta_cell, day_first),
                eta_raw: eta_cell.display().trim().to_string(),
                vessel: row.text(mapping.vessel),
                voyage: row.text(mapping.voyage),
                container: consolidate_container(row, &mapping.container_span),
                supplier: row.text(mapping.supplier),
            }
        })
        .collect()
}
