use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage rooted at a local output directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// Storage rooted at the configured output path.
    pub fn for_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.output_path().to_string())
    }

    fn full_path(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.full_path(path))?;
        Ok(data)
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    fn describe(&self, path: &str) -> String {
        self.full_path(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::MockConfig;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("nested/output");
        let storage = LocalStorage::new(base.to_string_lossy().to_string());

        storage.write_file("unmatched_po.csv", b"Unmatched PO\n107166\n").unwrap();

        assert!(base.join("unmatched_po.csv").is_file());
        assert_eq!(storage.read_file("unmatched_po.csv").unwrap(), b"Unmatched PO\n107166\n");
        assert!(storage.describe("unmatched_po.csv").ends_with("unmatched_po.csv"));
    }

    #[test]
    fn test_for_config_uses_output_path() {
        let storage = LocalStorage::for_config(&MockConfig::new("2025-10-20"));
        assert_eq!(storage.describe("unmatched_po.csv"), "test_output/unmatched_po.csv");
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        assert!(matches!(
            storage.read_file("nope.csv"),
            Err(crate::utils::error::CheckError::IoError(_))
        ));
    }
}
