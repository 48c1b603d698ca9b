//! Native-file backend: the snapshot is one file on local disk.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::dialogs::{read_picked, write_file, write_picked};
use super::{suggested_export_name, HostDialogs, StorageAdapter, StorageIdentity, StorageMode};
use crate::error::{StorageError, StorageResult};

/// Keeps the database in a single file.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-write leaves the previous snapshot intact.
#[derive(Clone)]
pub struct NativeFileAdapter {
    path: PathBuf,
    dialogs: Arc<dyn HostDialogs>,
}

impl std::fmt::Debug for NativeFileAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFileAdapter")
            .field("path", &self.path)
            .finish()
    }
}

impl NativeFileAdapter {
    pub fn new(path: impl Into<PathBuf>, dialogs: Arc<dyn HostDialogs>) -> Self {
        NativeFileAdapter {
            path: path.into(),
            dialogs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StorageAdapter for NativeFileAdapter {
    async fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                debug!(path = %self.path.display(), bytes = bytes.len(), "Read database file");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    async fn write(&self, bytes: &[u8]) -> StorageResult<()> {
        let temp = self.temp_path();
        write_file(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        info!(path = %self.path.display(), bytes = bytes.len(), "Database file written");
        Ok(())
    }

    async fn pick_and_read(&self) -> StorageResult<Option<Vec<u8>>> {
        read_picked(self.dialogs.as_ref()).await
    }

    async fn pick_and_write(&self, bytes: &[u8]) -> StorageResult<Option<String>> {
        let name = suggested_export_name(Utc::now().date_naive());
        write_picked(self.dialogs.as_ref(), &name, bytes).await
    }

    fn identity(&self) -> StorageIdentity {
        StorageIdentity {
            mode: StorageMode::NativeFile,
            location: self.path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NoDialogs;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = NativeFileAdapter::new(dir.path().join("bizbooks.db"), Arc::new(NoDialogs));
        assert_eq!(adapter.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_then_read_and_no_temp_left() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bizbooks.db");
        let adapter = NativeFileAdapter::new(&path, Arc::new(NoDialogs));

        adapter.write(b"first").await.unwrap();
        adapter.write(b"second").await.unwrap();

        assert_eq!(adapter.read().await.unwrap().as_deref(), Some(&b"second"[..]));
        assert!(!adapter.temp_path().exists());
        assert_eq!(adapter.identity().location, path.display().to_string());
    }

    #[tokio::test]
    async fn test_unreadable_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let adapter = NativeFileAdapter::new(dir.path(), Arc::new(NoDialogs));
        assert!(adapter.read().await.is_err());
    }
}
