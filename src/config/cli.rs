use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AnalyticsError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage
            .write_file("reports/2013/pageviews.csv", b"document_id,pageviews\n")
            .await
            .unwrap();

        let data = fs::read(temp_dir.path().join("reports/2013/pageviews.csv")).unwrap();
        assert_eq!(data, b"document_id,pageviews\n");
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_report() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("pageviews.csv", b"old").await.unwrap();
        storage.write_file("pageviews.csv", b"new").await.unwrap();

        assert_eq!(fs::read(temp_dir.path().join("pageviews.csv")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_write_under_a_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("blocker"), b"").unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let result = storage.write_file("blocker/pageviews.csv", b"data").await;
        assert!(matches!(result, Err(AnalyticsError::IoError(_))));
    }
}
