use crate::core::Storage;
use crate::utils::error::Result;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

/// Files under a local root directory.
///
/// Writes go to a temp file in the target directory and are renamed into
/// place, so a concurrent reader sees either the old or the new file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// 建立必要的目錄
    pub async fn ensure_dirs(&self, dirs: &[String]) -> Result<()> {
        for dir in dirs {
            fs::create_dir_all(self.resolve(dir)).await?;
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.resolve(path)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file_name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_path = full_path.with_file_name(format!(
            ".{}.{}.tmp",
            file_name,
            uuid::Uuid::new_v4().simple()
        ));

        if let Err(e) = fs::write(&tmp_path, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &full_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        match fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.read_file("data/none.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("data/tours.json", b"[]").await.unwrap();
        storage.write_file("data/tours.json", b"[{}]").await.unwrap();

        assert_eq!(
            storage.read_file("data/tours.json").await.unwrap().unwrap(),
            b"[{}]".to_vec()
        );

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("data"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["tours.json".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_file_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("public/uploads/a.png", b"png").await.unwrap();
        storage.remove_file("public/uploads/a.png").await.unwrap();
        assert!(!dir.path().join("public/uploads/a.png").exists());

        storage.remove_file("public/uploads/a.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .ensure_dirs(&["data".to_string(), "public/uploads".to_string()])
            .await
            .unwrap();
        assert!(dir.path().join("public/uploads").is_dir());
    }
}
