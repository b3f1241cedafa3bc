//! Durable single-slot storage for the running timer.
//!
//! Presence of a record means "running", absence means "idle". The file
//! store shares that slot across processes: a `start` in one CLI invocation
//! is observed by a `stop` in a later one.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::{CoreError, Result};
use crate::timer::TimerState;

/// Default file name, resolved against the working directory.
pub const STATE_FILE_NAME: &str = ".notion_timer_state.json";

/// Storage for at most one `TimerState`.
pub trait StateStore {
    /// Current state, or `None` when idle. Never returns a partial record.
    fn read(&self) -> Result<Option<TimerState>>;

    /// Persist `state`. Fails with `AlreadyRunning` if a state exists.
    fn write(&self, state: &TimerState) -> Result<()>;

    /// Remove the stored state. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<()>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `STATE_FILE_NAME` in the current directory.
    pub fn in_working_dir() -> Self {
        Self::new(STATE_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, message: impl Into<String>) -> CoreError {
        let err = CoreError::CorruptState {
            path: self.path.clone(),
            message: message.into(),
        };
        tracing::warn!(path = %self.path.display(), "{err}");
        err
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl StateStore for FileStateStore {
    fn read(&self) -> Result<Option<TimerState>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(self.corrupt("content is not valid UTF-8"))
            }
            Err(e) => return Err(e.into()),
        };

        let state: TimerState =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;
        state
            .validate()
            .map_err(|e| self.corrupt(e.to_string()))?;
        Ok(Some(state))
    }

    fn write(&self, state: &TimerState) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        // Fully written temp file, then a no-clobber link into place: an
        // existing timer is never overwritten and readers never see a torn file.
        let mut tmp = NamedTempFile::new_in(&dir)?;
        let json = serde_json::to_string_pretty(state)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(&self.path) {
            Ok(_) => {
                tracing::debug!(path = %self.path.display(), "timer state written");
                Ok(())
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                match self.read() {
                    Ok(Some(existing)) => Err(CoreError::AlreadyRunning {
                        project: existing.project,
                        task: existing.task,
                        started_at: existing.started_at,
                    }),
                    // Cleared between the failed link and the re-read; report as a clash anyway.
                    Ok(None) => Err(CoreError::AlreadyRunning {
                        project: state.project.clone(),
                        task: state.task.clone(),
                        started_at: state.started_at,
                    }),
                    Err(err) => Err(err),
                }
            }
            Err(e) => Err(e.error.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "timer state cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store with the same contract as the file store.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slot: Mutex<Option<TimerState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<TimerState>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self) -> Result<Option<TimerState>> {
        Ok(self.lock().clone())
    }

    fn write(&self, state: &TimerState) -> Result<()> {
        let mut slot = self.lock();
        if let Some(existing) = slot.as_ref() {
            return Err(CoreError::AlreadyRunning {
                project: existing.project.clone(),
                task: existing.task.clone(),
                started_at: existing.started_at,
            });
        }
        *slot = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use tempfile::TempDir;

    fn sample(project: &str) -> TimerState {
        TimerState::new(
            project,
            "整理本周亮点",
            DateTime::parse_from_rfc3339("2024-05-06T09:00:00+08:00").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn read_missing_file_is_idle() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join(STATE_FILE_NAME));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn write_then_read_returns_same_state() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join(STATE_FILE_NAME));
        store.write(&sample("写周报")).unwrap();

        assert_eq!(store.read().unwrap(), Some(sample("写周报")));
        // Survives a fresh handle, as a later process would open it.
        let reopened = FileStateStore::new(dir.path().join(STATE_FILE_NAME));
        assert_eq!(reopened.read().unwrap(), Some(sample("写周报")));
    }

    #[test]
    fn file_is_human_readable_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);
        FileStateStore::new(&path).write(&sample("写周报")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"project\": \"写周报\""));
        assert!(content.contains("\"start\": \"2024-05-06T09:00:00+08:00\""));
    }

    #[test]
    fn second_write_fails_and_keeps_first_state() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join(STATE_FILE_NAME));
        store.write(&sample("first")).unwrap();

        let err = store.write(&sample("second")).unwrap_err();
        match err {
            CoreError::AlreadyRunning { project, .. } => assert_eq!(project, "first"),
            other => panic!("expected AlreadyRunning, got {other:?}"),
        }
        assert_eq!(store.read().unwrap(), Some(sample("first")));
    }

    #[test]
    fn write_leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join(STATE_FILE_NAME));
        store.write(&sample("first")).unwrap();
        let _ = store.write(&sample("second"));

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join("nested/dir").join(STATE_FILE_NAME));
        store.write(&sample("p")).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.path().join(STATE_FILE_NAME));
        store.clear().unwrap();
        store.write(&sample("p")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn malformed_content_is_corrupt_not_idle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATE_FILE_NAME);
        let store = FileStateStore::new(&path);

        for content in [
            "",
            "{not json",
            r#"{"project": "p", "task": "t"}"#,
            r#"{"project": "p", "task": "t", "start": "yesterday"}"#,
            r#"{"project": " ", "task": "t", "start": "2024-05-06T09:00:00+08:00"}"#,
        ] {
            fs::write(&path, content).unwrap();
            assert!(
                matches!(store.read(), Err(CoreError::CorruptState { .. })),
                "content {content:?} should be corrupt"
            );
        }
    }

    #[test]
    fn memory_store_enforces_single_slot() {
        let store = MemoryStateStore::new();
        assert!(store.read().unwrap().is_none());
        store.write(&sample("first")).unwrap();
        assert!(matches!(
            store.write(&sample("second")),
            Err(CoreError::AlreadyRunning { .. })
        ));
        assert_eq!(store.read().unwrap(), Some(sample("first")));
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
    }
}
