//! Host file pickers used for user-driven import and export.
//!
//! The desktop shell answers with a native dialog, the CLI with paths given
//! on the command line, tests with [`PresetDialogs`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{StorageError, StorageResult};

/// File-picking capability of the host.
#[async_trait]
pub trait HostDialogs: Send + Sync {
    /// Asks for a database file to open. `None` when cancelled.
    async fn pick_open(&self) -> Option<PathBuf>;

    /// Asks where to save an export. `None` when cancelled.
    async fn pick_save(&self, suggested_name: &str) -> Option<PathBuf>;
}

/// A host without dialogs: every pick is cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDialogs;

#[async_trait]
impl HostDialogs for NoDialogs {
    async fn pick_open(&self) -> Option<PathBuf> {
        None
    }

    async fn pick_save(&self, _suggested_name: &str) -> Option<PathBuf> {
        None
    }
}

/// Answers picks with fixed paths.
///
/// A save target that is an existing directory receives the suggested name.
#[derive(Debug, Clone, Default)]
pub struct PresetDialogs {
    pub open: Option<PathBuf>,
    pub save: Option<PathBuf>,
}

impl PresetDialogs {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        PresetDialogs {
            open: Some(path.into()),
            save: None,
        }
    }

    pub fn save(path: impl Into<PathBuf>) -> Self {
        PresetDialogs {
            open: None,
            save: Some(path.into()),
        }
    }
}

#[async_trait]
impl HostDialogs for PresetDialogs {
    async fn pick_open(&self) -> Option<PathBuf> {
        self.open.clone()
    }

    async fn pick_save(&self, suggested_name: &str) -> Option<PathBuf> {
        let target = self.save.clone()?;
        if tokio::fs::metadata(&target).await.map(|m| m.is_dir()).unwrap_or(false) {
            Some(target.join(suggested_name))
        } else {
            Some(target)
        }
    }
}

/// Reads the file the user picked.
pub(crate) async fn read_picked(dialogs: &dyn HostDialogs) -> StorageResult<Option<Vec<u8>>> {
    let Some(path) = dialogs.pick_open().await else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| StorageError::io(&path, e))?;

    info!(path = %path.display(), bytes = bytes.len(), "Read picked file");
    Ok(Some(bytes))
}

/// Writes `bytes` where the user picked and returns that path.
pub(crate) async fn write_picked(
    dialogs: &dyn HostDialogs,
    suggested_name: &str,
    bytes: &[u8],
) -> StorageResult<Option<String>> {
    let Some(path) = dialogs.pick_save(suggested_name).await else {
        return Ok(None);
    };
    write_file(&path, bytes).await?;

    info!(path = %path.display(), bytes = bytes.len(), "Wrote export");
    Ok(Some(path.display().to_string()))
}

/// Writes a file, creating parent directories as needed.
pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| StorageError::io(path, e))
}
