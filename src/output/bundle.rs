use crate::output::ReportFile;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const SHIPCHECK_ARCHIVE: &str = "shipcheck_output.zip";
pub const ETA_CHECK_ARCHIVE: &str = "eta_check_output.zip";

/// Packs the reports into an in-memory zip archive.
pub fn bundle_files(files: &[ReportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_bundle_contains_every_file() {
        let files = vec![
            ReportFile::new("matched_differences.csv", b"PO\n107166\n".to_vec()),
            ReportFile::new("report.json", b"{}".to_vec()),
        ];

        let data = bundle_files(&files).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();

        let names = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["matched_differences.csv", "report.json"]);

        let mut content = String::new();
        archive
            .by_name("matched_differences.csv")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "PO\n107166\n");
    }
}
