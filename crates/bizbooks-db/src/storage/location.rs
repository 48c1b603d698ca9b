//! Where the native-file database lives.
//!
//! ```text
//! 1. development dir  (next to the sources, dev builds only)  ─┐
//! 2. executable dir   (next to the installed binary)          ─┼─ first writable wins
//! 3. app-data dir     (per-user, always the fallback)         ─┘
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Candidate directories, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCandidates {
    pub dev_dir: Option<PathBuf>,
    pub exe_dir: Option<PathBuf>,
    pub app_data_dir: PathBuf,
}

/// Picks the database path from `candidates`.
///
/// The app-data path is returned when no earlier candidate is writable,
/// even if it is not writable either; the first save reports that failure.
pub fn resolve_native_location(candidates: &LocationCandidates, file_name: &str) -> PathBuf {
    let ordered = [candidates.dev_dir.as_deref(), candidates.exe_dir.as_deref()];

    for dir in ordered.into_iter().flatten() {
        if is_writable(dir) {
            let path = dir.join(file_name);
            info!(path = %path.display(), "Resolved database location");
            return path;
        }
        debug!(dir = %dir.display(), "Candidate directory not writable");
    }

    let path = candidates.app_data_dir.join(file_name);
    info!(path = %path.display(), "Using app-data database location");
    path
}

/// True when a file can be created in `dir` (creating `dir` if needed).
fn is_writable(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    tempfile::Builder::new()
        .prefix(".bizbooks-probe")
        .tempfile_in(dir)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_dir_wins_when_writable() {
        let dev = tempfile::tempdir().unwrap();
        let exe = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();

        let candidates = LocationCandidates {
            dev_dir: Some(dev.path().to_path_buf()),
            exe_dir: Some(exe.path().to_path_buf()),
            app_data_dir: data.path().to_path_buf(),
        };

        assert_eq!(
            resolve_native_location(&candidates, "bizbooks.db"),
            dev.path().join("bizbooks.db")
        );
    }

    #[test]
    fn test_unwritable_candidates_fall_through() {
        let scratch = tempfile::tempdir().unwrap();
        let blocker = scratch.path().join("blocker");
        std::fs::write(&blocker, b"file, not a dir").unwrap();
        let exe = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();

        let candidates = LocationCandidates {
            // A path under a regular file can never be created.
            dev_dir: Some(blocker.join("dev")),
            exe_dir: Some(exe.path().to_path_buf()),
            app_data_dir: data.path().to_path_buf(),
        };
        assert_eq!(
            resolve_native_location(&candidates, "bizbooks.db"),
            exe.path().join("bizbooks.db")
        );

        let candidates = LocationCandidates {
            dev_dir: None,
            exe_dir: Some(blocker.join("exe")),
            app_data_dir: data.path().to_path_buf(),
        };
        assert_eq!(
            resolve_native_location(&candidates, "bizbooks.db"),
            data.path().join("bizbooks.db")
        );
    }
}
