use crate::output::ReportFile;
use crate::utils::error::Result;
use serde::Serialize;

pub const SHIPCHECK_JSON: &str = "report.json";
pub const ETA_CHECK_JSON: &str = "eta_report.json";

pub fn json_report<T: Serialize>(name: &str, value: &T) -> Result<ReportFile> {
    let json_data = serde_json::to_string_pretty(value)?;
    Ok(ReportFile::new(name, json_data.into_bytes()))
}
