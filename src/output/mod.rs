// Report rendering: CSV tables, JSON dumps, zip bundles and the console summary.

pub mod bundle;
pub mod console;
pub mod csv_export;
pub mod json;

use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// One rendered report, named as it lands in the output directory or archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl ReportFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Writes the files loose, or as one archive when `archive_name` is given.
/// Returns the locations written.
pub fn write_reports<S: Storage>(
    storage: &S,
    files: &[ReportFile],
    archive_name: Option<&str>,
) -> Result<Vec<String>> {
    if files.is_empty() {
        tracing::info!("✨ Nothing to write, no discrepancies found");
        return Ok(Vec::new());
    }

    match archive_name {
        Some(archive) => {
            let zip_data = bundle::bundle_files(files)?;
            tracing::debug!("Writing ZIP file ({} bytes) with {} reports", zip_data.len(), files.len());
            storage.write_file(archive, &zip_data)?;
            Ok(vec![storage.describe(archive)])
        }
        None => files
            .iter()
            .map(|file| {
                storage.write_file(&file.name, &file.data)?;
                Ok(storage.describe(&file.name))
            })
            .collect(),
    }
}
