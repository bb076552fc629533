use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

use crate::domain::DomainError;

/// Абстракция над хранилищем загруженных файлов
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<(), DomainError>;
    async fn delete(&self, filename: &str) -> Result<(), DomainError>;
}

/// Blob store backed by a directory on the local filesystem.
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DomainError::InternalError(format!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl BlobStore for DiskStore {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<(), DomainError> {
        let path = self.dir.join(filename);
        debug!("Writing {} bytes to {}", data.len(), path.display());
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| DomainError::InternalError(format!("Failed to store file: {}", e)))
    }

    async fn delete(&self, filename: &str) -> Result<(), DomainError> {
        let path = self.dir.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Already gone counts as deleted
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::InternalError(format!(
                "Failed to delete file: {}",
                e
            ))),
        }
    }
}

/// Builds a stored filename from the client's original one: millisecond
/// timestamp plus a short random suffix, keeping only the extension.
pub fn unique_filename(original: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    let timestamp = Utc::now().timestamp_millis();

    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", timestamp, suffix, ext.to_lowercase()),
        None => format!("{}-{}", timestamp, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_filenames_keep_a_lowercased_extension() {
        let name = unique_filename("Holiday Photo.PNG");
        assert!(name.ends_with(".png"), "got {}", name);
        assert!(!name.contains(' '));
    }

    #[test]
    fn generated_filenames_differ_between_calls() {
        assert_ne!(unique_filename("a.jpg"), unique_filename("a.jpg"));
    }

    #[test]
    fn extensionless_names_get_no_trailing_dot() {
        let name = unique_filename("rawblob");
        assert!(!name.contains('.'), "got {}", name);
    }

    #[actix_rt::test]
    async fn disk_store_saves_and_deletes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DiskStore::new(tmp.path().join("uploads")).await.unwrap();

        store.save("pic.png", b"binary").await.unwrap();
        let on_disk = tokio::fs::read(store.dir().join("pic.png")).await.unwrap();
        assert_eq!(on_disk, b"binary");

        store.delete("pic.png").await.unwrap();
        assert!(!store.dir().join("pic.png").exists());
    }

    #[actix_rt::test]
    async fn deleting_a_missing_file_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DiskStore::new(tmp.path()).await.unwrap();
        assert!(store.delete("never-existed.png").await.is_ok());
    }
}
