use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{LeaseLensError, Result};
use crate::record::AnalysisRecord;

use super::{decode, prepend, RecordStore, HISTORY_SLOT};

/// History slot backed by a single JSON file.
///
/// Mutations hold an exclusive lock on a `.lock` sibling for the whole
/// read-modify-write, so concurrent writers (threads or processes) queue.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store using the default slot file name inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{HISTORY_SLOT}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slot(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LeaseLensError::Storage {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            }),
        }
    }

    /// Replace the slot via temp file + rename so readers never see a partial write.
    fn write_slot(&self, contents: &str) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| LeaseLensError::Storage {
            reason: format!("failed to write {}: {}", self.path.display(), e.error),
        })?;
        Ok(())
    }
}

impl RecordStore for FileStore {
    fn load(&self) -> Result<Vec<AnalysisRecord>> {
        match self.read_slot()? {
            Some(raw) => decode(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, record: AnalysisRecord) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        let id = record.id.clone();
        let current = self.read_slot()?;
        let updated = prepend(current.as_deref(), record)?;
        self.write_slot(&updated)?;
        tracing::debug!("appended analysis {} to {}", id, self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(LeaseLensError::Storage {
                    reason: format!("failed to remove {}: {}", self.path.display(), e),
                })
            }
        }
        tracing::debug!("cleared history at {}", self.path.display());
        Ok(())
    }
}

/// Advisory file lock using flock(2) on a .lock file.
struct FileLock {
    _file: fs::File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let lock_path = path.with_extension("lock");
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        flock_exclusive(&file)?;
        Ok(Self { _file: file })
    }
}

// Dropping the FileLock closes the file, which releases the lock.

#[cfg(unix)]
fn flock_exclusive(file: &fs::File) -> Result<()> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let ret = unsafe { libc::flock(fd, libc::LOCK_EX) };
    if ret != 0 {
        return Err(LeaseLensError::Io(std::io::Error::last_os_error()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn flock_exclusive(_file: &fs::File) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_record(id: &str) -> AnalysisRecord {
        AnalysisRecord {
            id: id.into(),
            file_name: format!("{id}.pdf"),
            file_size: 1024,
            analyzed_at: "2024-01-01T10:00:00.000Z".into(),
            summary: "summary".into(),
            red_flags: 1,
            analysis: Some("text".into()),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::in_dir(tmp.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::in_dir(tmp.path());

        store.append(make_record("a")).unwrap();
        store.append(make_record("b")).unwrap();

        let loaded = store.load().unwrap();
        let ids: Vec<_> = loaded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_clear_removes_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::in_dir(tmp.path());

        store.append(make_record("a")).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());

        // Clearing an absent slot is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_failed_append_leaves_slot_unchanged() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::in_dir(tmp.path());

        store.append(make_record("a")).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(store.append(make_record("a")).is_err());
        let after = fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
    }
}
