use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{CheckError, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn get_text(&self, path: &str) -> Option<String> {
        self.get_file(path).map(|data| String::from_utf8(data).unwrap())
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names = self.files.lock().unwrap().keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}

impl Storage for MockStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.get_file(path).ok_or_else(|| {
            CheckError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            ))
        })
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.files.lock().unwrap().insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn describe(&self, path: &str) -> String {
        format!("test_output/{}", path)
    }
}

pub struct MockConfig {
    pub output_formats: Vec<String>,
    pub bundle: bool,
    pub as_of: NaiveDate,
}

impl MockConfig {
    pub fn new(as_of: &str) -> Self {
        Self {
            output_formats: vec!["csv".to_string()],
            bundle: false,
            as_of: NaiveDate::parse_from_str(as_of, "%Y-%m-%d").unwrap(),
        }
    }
}

impl ConfigProvider for MockConfig {
    fn output_path(&self) -> &str {
        "test_output"
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn bundle(&self) -> bool {
        self.bundle
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of
    }
}

/// Writes `rows` as a CSV file named `name` inside `dir`.
pub fn write_csv(dir: &std::path::Path, name: &str, rows: &[&[&str]]) -> String {
    let path = dir.join(name);
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path).unwrap();
    for row in rows {
        writer.write_record(*row).unwrap();
    }
    writer.flush().unwrap();
    path.to_string_lossy().to_string()
}
